//! Articles stored as flat `<id>.html` files in a single directory.

use std::{
    collections::HashSet,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    time::Duration,
};

use futures::{StreamExt, TryStreamExt, stream};
use quill_core::Article;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{
    directory::{DirectoryReader, FsDirectoryReader},
    error::{Error, Result},
    repository::{ArticleRepository, Articles},
    utils::{file_stem, read_to_string},
};

/// Extension of article files, without the dot
pub const ARTICLE_EXTENSION: &str = "html";

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_CONCURRENT_READS: usize = 16;

/// Reads articles straight from the file system, parsing them on every call
#[derive(Debug, Clone)]
pub struct StaticFileRepository<D = FsDirectoryReader> {
    dir: PathBuf,
    reader: D,
    read_timeout: Duration,
    max_concurrent_reads: usize,
}

impl StaticFileRepository {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, FsDirectoryReader)
    }
}

impl<D: DirectoryReader> StaticFileRepository<D> {
    pub fn new(dir: impl Into<PathBuf>, reader: D) -> Self {
        Self {
            dir: dir.into(),
            reader,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
        }
    }

    #[must_use]
    pub const fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    #[must_use]
    pub fn with_max_concurrent_reads(mut self, max_concurrent_reads: usize) -> Self {
        self.max_concurrent_reads = max_concurrent_reads.max(1);
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn article_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{ARTICLE_EXTENSION}"))
    }
}

impl<D: DirectoryReader> ArticleRepository for StaticFileRepository<D> {
    async fn get(&self, id: &str) -> Result<Option<Article>> {
        if id.is_empty() {
            return Err(Error::InvalidArgument("article id must not be empty"));
        }
        // such an id can never name a file inside the article directory
        if id.contains(['/', '\\']) {
            return Ok(None);
        }

        let path = self.article_path(id);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Ok(None),
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        read_article(path, self.read_timeout).await.map(Some)
    }

    async fn all_sorted_by_date(&self) -> Result<Articles> {
        let files = self.reader.files(&self.dir, ARTICLE_EXTENSION).await?;
        if files.is_empty() {
            debug!("No article found in {}", self.dir.display());
            return Ok(Articles::from([]));
        }

        let read_timeout = self.read_timeout;
        let parsed: Vec<Article> = stream::iter(files)
            .map(move |path| read_article(path, read_timeout))
            .buffered(self.max_concurrent_reads)
            .try_collect()
            .await?;

        let mut seen = HashSet::new();
        let mut articles: Vec<Article> = parsed
            .into_iter()
            .filter(|article| {
                let fresh = seen.insert(article.id().to_string());
                if !fresh {
                    warn!("Skipping a second article with id `{}`", article.id());
                }
                fresh
            })
            .collect();
        articles.sort_by(Article::newest_first);

        info!("Loaded {} articles from {}", articles.len(), self.dir.display());
        Ok(articles.into())
    }
}

async fn read_article(path: PathBuf, read_timeout: Duration) -> Result<Article> {
    debug!("Parsing article {}", path.display());
    let raw = read_to_string(&path, read_timeout).await?;
    let Some(id) = file_stem(&path).map(str::to_owned) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("article file name {} is not valid UTF-8", path.display()),
        )
        .into());
    };
    Article::parse(&raw, id).map_err(|source| Error::Format { path, source })
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use quill_core::FormatError;
    use tempfile::TempDir;

    use super::*;

    fn article(published: &str, body: &str) -> String {
        format!("<!--\nTitle: {body}\nPublished: {published}\n-->\n<p>{body}</p>\n")
    }

    fn dir_with(files: &[(&str, String)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn empty_directory_yields_empty_collection() {
        let dir = dir_with(&[("readme.txt", "not an article".to_string())]);
        let repository = StaticFileRepository::open(dir.path());

        let articles = repository.all_sorted_by_date().await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn sorts_newest_first() {
        let dir = dir_with(&[
            ("a-middle.html", article("2015-06-01", "middle")),
            ("b-oldest.html", article("2014-01-01", "oldest")),
            ("c-newest.html", article("2016-01-01 10:00", "newest")),
        ]);
        let repository = StaticFileRepository::open(dir.path()).with_max_concurrent_reads(2);

        let articles = repository.all_sorted_by_date().await.unwrap();
        let ids: Vec<_> = articles.iter().map(Article::id).collect();
        assert_eq!(ids, ["c-newest", "a-middle", "b-oldest"]);
    }

    #[tokio::test]
    async fn equal_dates_keep_file_order() {
        let dir = dir_with(&[
            ("b.html", article("2015-01-01", "b")),
            ("a.html", article("2015-01-01", "a")),
        ]);
        let articles = StaticFileRepository::open(dir.path())
            .all_sorted_by_date()
            .await
            .unwrap();

        let ids: Vec<_> = articles.iter().map(Article::id).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn one_malformed_file_fails_the_whole_listing() {
        let dir = dir_with(&[
            ("good.html", article("2015-01-01", "good")),
            ("broken.html", "no metadata here".to_string()),
        ]);
        let err = StaticFileRepository::open(dir.path())
            .all_sorted_by_date()
            .await
            .unwrap_err();

        match err {
            Error::Format { path, source } => {
                assert!(path.ends_with("broken.html"));
                assert_eq!(source, FormatError::MissingOpener);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_directory_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let err = StaticFileRepository::open(dir.path().join("nope"))
            .all_sorted_by_date()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn get_reads_single_article() {
        let dir = dir_with(&[("hello-world.html", article("2015-01-01", "hello"))]);
        let repository = StaticFileRepository::open(dir.path());

        let found = repository.get("hello-world").await.unwrap().unwrap();
        assert_eq!(found.id(), "hello-world");
        assert_eq!(found.content(), "<p>hello</p>");

        assert!(repository.get("missing").await.unwrap().is_none());
        assert!(repository.get("../hello-world").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_rejects_empty_id() {
        let dir = tempfile::tempdir().unwrap();
        let err = StaticFileRepository::open(dir.path()).get("").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn get_matches_full_listing() {
        let dir = dir_with(&[
            ("one.html", article("2015-01-01", "one")),
            ("two.html", article("2015-02-01", "two")),
        ]);
        let repository = StaticFileRepository::open(dir.path());

        let all = repository.all_sorted_by_date().await.unwrap();
        for listed in all.iter() {
            let single = repository.get(listed.id()).await.unwrap().unwrap();
            assert_eq!(&single, listed);
            assert_eq!(single.content(), listed.content());
        }
    }

    #[tokio::test]
    async fn upper_case_extension_is_neither_listed_nor_found() {
        let dir = dir_with(&[
            ("quiet.html", article("2015-01-01", "quiet")),
            ("Shout.HTML", article("2015-02-01", "shout")),
        ]);
        let repository = StaticFileRepository::open(dir.path());

        let all = repository.all_sorted_by_date().await.unwrap();
        let ids: Vec<_> = all.iter().map(Article::id).collect();
        assert_eq!(ids, ["quiet"]);
        for listed in all.iter() {
            assert!(repository.get(listed.id()).await.unwrap().is_some());
        }
        assert!(repository.get("Shout").await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_file_name_is_invalid_data() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"bad\xFF.html");
        // some file systems refuse such names outright
        if write(dir.path().join(name), article("2015-01-01", "bad")).is_err() {
            return;
        }

        let err = StaticFileRepository::open(dir.path())
            .all_sorted_by_date()
            .await
            .unwrap_err();

        match err {
            Error::Io(err) => {
                assert_eq!(err.kind(), io::ErrorKind::InvalidData);
                assert!(err.to_string().contains("bad"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
