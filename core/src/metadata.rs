//! Article metadata and the parser for the metadata block.
//!
//! Every article file starts with an HTML comment carrying `Key: Value` lines:
//! ```plain
//! <!--
//! Title: Great Article
//! Author: Foo Bar
//! Published: 2015-02-26 15:00
//! LastEdited: 2015-03-13 14:30
//! Tags: tag-1 another-tag 3rd-tag-here
//! -->
//! <p>The body of the article</p>
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime,
    format_description::well_known::{Iso8601, Rfc3339},
    macros::format_description,
};

/// Line that opens the metadata block.
pub const METADATA_OPENER: &str = "<!--";
/// Line that closes the metadata block.
pub const METADATA_CLOSER: &str = "-->";

/// Errors raised when a raw article cannot be turned into an [`crate::Article`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The caller did not supply an id
    #[error("An article needs a non-empty id")]
    MissingId,
    /// The first line is not the metadata opener
    #[error("The first line has to be exactly `<!--`")]
    MissingOpener,
    /// The metadata block is never closed
    #[error("Couldn't find the closing `-->` of the metadata block")]
    MissingCloser,
    /// Nothing but whitespace follows the metadata block
    #[error("There is no content after the metadata block")]
    EmptyContent,
}

/// Metadata of an article, as declared in its metadata block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    published: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    last_edited: Option<OffsetDateTime>,
    #[serde(default)]
    tags: Vec<String>,
}

impl Default for ArticleMetadata {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            published: OffsetDateTime::UNIX_EPOCH,
            last_edited: None,
            tags: Vec::new(),
        }
    }
}

impl ArticleMetadata {
    /// Get the title of the article
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set the title of the article
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Get the author of the article
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Set the author of the article
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = Some(author.into());
    }

    /// Get the publish time, the Unix epoch when none was declared
    #[must_use]
    pub const fn published(&self) -> OffsetDateTime {
        self.published
    }

    /// Set the publish time of the article
    pub const fn set_published(&mut self, published: OffsetDateTime) {
        self.published = published;
    }

    /// Get the time of the last edit, if declared
    #[must_use]
    pub const fn last_edited(&self) -> Option<OffsetDateTime> {
        self.last_edited
    }

    /// Get the tags of the article
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replace the tags of the article
    pub fn set_tags(&mut self, tags: impl IntoIterator<Item = impl Into<String>>) {
        self.tags = tags.into_iter().map(Into::into).collect();
    }

    /// Check whether the article carries the given tag
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "title" => self.title = Some(value.to_string()),
            "author" => self.author = Some(value.to_string()),
            "published" => {
                if let Some(published) = parse_timestamp(value) {
                    self.published = published;
                }
            }
            "lastedited" => {
                if let Some(last_edited) = parse_timestamp(value) {
                    self.last_edited = Some(last_edited);
                }
            }
            "tags" => {
                self.tags = value.split_whitespace().map(str::to_string).collect();
            }
            _ => {}
        }
    }
}

/// Split a raw article into its metadata and the untrimmed remainder
///
/// # Errors
/// Returns `FormatError::MissingOpener` if the first line is not exactly `<!--`
/// Returns `FormatError::MissingCloser` if no line is exactly `-->`
pub fn split_metadata(raw: &str) -> Result<(ArticleMetadata, &str), FormatError> {
    let mut cursor = LineCursor::new(raw);

    if cursor.next_line() != Some(METADATA_OPENER) {
        return Err(FormatError::MissingOpener);
    }

    let mut metadata = ArticleMetadata::default();
    loop {
        let line = cursor.next_line().ok_or(FormatError::MissingCloser)?;
        if line == METADATA_CLOSER {
            break;
        }
        // lines without a colon carry nothing
        if let Some((key, value)) = line.split_once(':') {
            metadata.apply(&key.trim().to_lowercase(), value.trim());
        }
    }

    Ok((metadata, cursor.rest))
}

// Accepts RFC 3339, ISO 8601 without offset and the plain `2015-02-26 15:00` style.
// Values without an offset are taken as UTC.
fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    if let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(timestamp);
    }

    PrimitiveDateTime::parse(value, &Iso8601::DEFAULT)
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(value, format_description!("[year]-[month]-[day] [hour]:[minute]"))
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                value,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            )
        })
        .map(PrimitiveDateTime::assume_utc)
        .or_else(|_| {
            Date::parse(value, format_description!("[year]-[month]-[day]"))
                .map(|date| date.midnight().assume_utc())
        })
        .ok()
}

struct LineCursor<'a> {
    rest: &'a str,
}

impl<'a> LineCursor<'a> {
    const fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let (line, rest) = match self.rest.find('\n') {
            Some(index) => (&self.rest[..index], &self.rest[index + 1..]),
            None => (self.rest, ""),
        };
        self.rest = rest;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }
}
