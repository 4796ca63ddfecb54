use core::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::metadata::{ArticleMetadata, FormatError, split_metadata};

/// A parsed blog article
///
/// Two articles are the same article when their ids match, whatever the rest of
/// their fields say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    id: String,
    #[serde(flatten)]
    metadata: ArticleMetadata,
    content: String,
}

impl Article {
    /// Create a new article from already parsed parts
    #[must_use]
    pub fn new(id: impl Into<String>, metadata: ArticleMetadata, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata,
            content: content.into(),
        }
    }

    /// Parse a raw article file, `id` usually being the file name without extension
    ///
    /// # Errors
    /// Returns `FormatError::MissingId` if `id` is empty
    /// Returns `FormatError::MissingOpener` or `FormatError::MissingCloser` if the metadata block is malformed
    /// Returns `FormatError::EmptyContent` if nothing follows the metadata block
    pub fn parse(raw: &str, id: impl Into<String>) -> Result<Self, FormatError> {
        let id = id.into();
        if id.is_empty() {
            return Err(FormatError::MissingId);
        }

        let (metadata, rest) = split_metadata(raw)?;
        let content = rest.trim();
        if content.is_empty() {
            return Err(FormatError::EmptyContent);
        }

        Ok(Self::new(id, metadata, content))
    }

    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }

    #[must_use]
    pub const fn metadata(&self) -> &ArticleMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.metadata.title()
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.metadata.author()
    }

    #[must_use]
    pub const fn published(&self) -> OffsetDateTime {
        self.metadata.published()
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.metadata.tags()
    }

    /// The HTML body of the article
    #[must_use]
    pub const fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Ordering that puts the most recently published article first
    #[must_use]
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.published().cmp(&a.published())
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use time::macros::datetime;

    use super::*;

    const ID: &str = "this-is-a-file";

    fn parse(raw: &str) -> Result<Article, FormatError> {
        Article::parse(raw, ID)
    }

    #[test]
    fn parses_title_only_article() {
        let article = parse("<!--\nTitle: Valid Article\n-->\nHello World!").unwrap();

        assert_eq!(article.id(), ID);
        assert_eq!(article.title(), Some("Valid Article"));
        assert_eq!(article.author(), None);
        assert_eq!(article.published(), OffsetDateTime::UNIX_EPOCH);
        assert!(article.tags().is_empty());
        assert_eq!(article.content(), "Hello World!");
    }

    #[test]
    fn trims_content_around_html_body() {
        let raw = "<!--\nPublished: 2015-02-26 15:00\nAuthor: Foo Bar\nTitle: Great Article\nTags: tag-1 another-tag 3rd-tag-here\n-->\n\n\n<h2>Hello World</h2>\n<p>This is a test.</p>\n\n<p>The End!</p>\n\n";
        let article = parse(raw).unwrap();

        assert_eq!(article.published(), datetime!(2015-02-26 15:00 UTC));
        assert_eq!(
            article.content(),
            "<h2>Hello World</h2>\n<p>This is a test.</p>\n\n<p>The End!</p>"
        );
    }

    #[test]
    fn last_duplicate_key_wins() {
        let raw = "<!--\nAuthor: Foo Bar\nTitle: Great Article\nTags: NOTHING\nTags: a b\nAuthor: Foo Bar the second\n-->\nTest Article";
        let article = parse(raw).unwrap();

        assert_eq!(article.author(), Some("Foo Bar the second"));
        assert_eq!(article.tags(), ["a", "b"]);
    }

    #[test]
    fn tolerates_weirdly_formatted_metadata() {
        let raw = "<!--\n\n   Published  :    2015-02-26 15:00\n lastedited: 2015-03-13 14:30\nAuthor:             Foo Bar\n\n\n        title: Great Article         \nTags:    tag-1    another-tag     3rd-tag-here\n\nAuthor: Foo Bar the second\n\n-->\nTest Article";
        let article = parse(raw).unwrap();

        assert_eq!(article.published(), datetime!(2015-02-26 15:00 UTC));
        assert_eq!(
            article.metadata().last_edited(),
            Some(datetime!(2015-03-13 14:30 UTC))
        );
        assert_eq!(article.author(), Some("Foo Bar the second"));
        assert_eq!(article.title(), Some("Great Article"));
        assert_eq!(article.tags(), ["tag-1", "another-tag", "3rd-tag-here"]);
        assert_eq!(article.content(), "Test Article");
    }

    #[test]
    fn ignores_unknown_metadata() {
        let raw = "<!--\nYear: 2015\nMonth: December\nAuthor: foo Bar\nShowComments: False\n-->\nTest Article";
        let article = parse(raw).unwrap();

        assert_eq!(article.author(), Some("foo Bar"));
        assert_eq!(article.title(), None);
        assert_eq!(article.content(), "Test Article");
    }

    #[test]
    fn rejects_malformed_articles() {
        assert_eq!(parse(""), Err(FormatError::MissingOpener));
        assert_eq!(parse("Hello World"), Err(FormatError::MissingOpener));
        assert_eq!(
            parse("Author: Foo Bar\n-->\nTest Article"),
            Err(FormatError::MissingOpener)
        );
        assert_eq!(
            parse("<!--\nAuthor: Foo Bar\n\nTest Article"),
            Err(FormatError::MissingCloser)
        );
        assert_eq!(
            parse("<!--\nTitle: No Content\nAuthor: Foo Bar\n-->"),
            Err(FormatError::EmptyContent)
        );
        assert_eq!(
            parse("<!--\nTitle: No Content\n-->\n  \n\t\n"),
            Err(FormatError::EmptyContent)
        );
        assert_eq!(
            Article::parse("<!--\n-->\nx", ""),
            Err(FormatError::MissingId)
        );
    }

    #[test]
    fn equality_only_looks_at_id() {
        let first = parse("<!--\nTitle: One\n-->\nfirst").unwrap();
        let second = parse("<!--\nTitle: Two\n-->\nsecond").unwrap();
        let other = Article::parse("<!--\nTitle: One\n-->\nfirst", "other").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);

        let set: HashSet<_> = [first, second, other].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn newest_first_orders_by_publish_date() {
        let old = Article::parse("<!--\nPublished: 2014-01-01\n-->\nold", "old").unwrap();
        let new = Article::parse("<!--\nPublished: 2016-01-01\n-->\nnew", "new").unwrap();

        let mut articles = vec![old, new];
        articles.sort_by(Article::newest_first);
        assert_eq!(articles[0].id(), "new");
    }

    #[test]
    fn serializes_with_flattened_metadata() {
        let article = parse("<!--\nTitle: T\nPublished: 2015-02-26 15:00\n-->\nbody").unwrap();
        let json = serde_json::to_value(&article).unwrap();

        assert_eq!(json["id"], ID);
        assert_eq!(json["title"], "T");
        assert_eq!(json["published"], "2015-02-26T15:00:00Z");
        assert_eq!(json["content"], "body");
    }
}
