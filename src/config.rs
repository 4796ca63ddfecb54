//! Blog configuration, read from `Blog.toml`.
//!
//! ```toml
//! articles_dir = "articles"
//! read_timeout_secs = 10
//! max_concurrent_reads = 16
//!
//! [cache]
//! enabled = true
//! capacity = 10000
//! # default_ttl_secs = 3600  # unset: entries written without a ttl never expire
//! article_ttl_secs = 86400
//!
//! [trending]
//! max_pages = 255
//! max_articles = 10
//! ttl_secs = 86400
//! report = "analytics.json"
//! ```
//! Every field is optional. Relative paths are resolved against the directory holding
//! the file.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::{
    cache::{Cache, DEFAULT_CAPACITY, MemoryCache, NullCache},
    store::{DEFAULT_MAX_CONCURRENT_READS, DEFAULT_READ_TIMEOUT},
    trending::TrendingSettings,
};

pub const CONFIG_FILE: &str = "Blog.toml";

const DAY_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum FailToOpenConfig {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    articles_dir: PathBuf,
    read_timeout_secs: u64,
    max_concurrent_reads: usize,
    cache: CacheSettings,
    trending: TrendingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            articles_dir: PathBuf::from("articles"),
            read_timeout_secs: DEFAULT_READ_TIMEOUT.as_secs(),
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
            cache: CacheSettings::default(),
            trending: TrendingConfig::default(),
        }
    }
}

/// Whether to cache at all, and for how long
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: u64,
    /// Lifetime of entries written without their own ttl, `None` for forever
    pub default_ttl_secs: Option<u64>,
    pub article_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
            default_ttl_secs: None,
            article_ttl_secs: DAY_SECS,
        }
    }
}

impl CacheSettings {
    /// The one cache shared by the whole process
    #[must_use]
    pub fn build(&self) -> Arc<dyn Cache> {
        if self.enabled {
            Arc::new(MemoryCache::new(
                self.capacity,
                self.default_ttl_secs.map(Duration::from_secs),
            ))
        } else {
            Arc::new(NullCache)
        }
    }

    #[must_use]
    pub const fn article_ttl(&self) -> Duration {
        Duration::from_secs(self.article_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingConfig {
    pub max_pages: u8,
    pub max_articles: usize,
    pub ttl_secs: u64,
    /// JSON page view report; trending stays empty without one
    pub report: Option<PathBuf>,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        let settings = TrendingSettings::default();
        Self {
            max_pages: settings.max_pages,
            max_articles: settings.max_articles,
            ttl_secs: settings.ttl.as_secs(),
            report: None,
        }
    }
}

impl TrendingConfig {
    #[must_use]
    pub const fn settings(&self) -> TrendingSettings {
        TrendingSettings {
            max_pages: self.max_pages,
            max_articles: self.max_articles,
            ttl: Duration::from_secs(self.ttl_secs),
        }
    }
}

impl Config {
    /// Read a config file, resolving its relative paths against the file's directory
    ///
    /// # Errors
    /// Returns `FailToOpenConfig::Io` if the file cannot be read
    /// Returns `FailToOpenConfig::TomlParse` if the file is not a valid config
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, FailToOpenConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        self.articles_dir = base.join(&self.articles_dir);
        self.trending.report = self.trending.report.map(|report| base.join(report));
        self
    }

    #[must_use]
    pub fn with_articles_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.articles_dir = dir.into();
        self
    }

    #[must_use]
    pub fn articles_dir(&self) -> &Path {
        &self.articles_dir
    }

    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    #[must_use]
    pub const fn max_concurrent_reads(&self) -> usize {
        self.max_concurrent_reads
    }

    #[must_use]
    pub const fn cache(&self) -> &CacheSettings {
        &self.cache
    }

    #[must_use]
    pub const fn trending(&self) -> &TrendingConfig {
        &self.trending
    }

    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).expect("Failed to serialize config to TOML")
    }
}
