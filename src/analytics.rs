//! Page view statistics from a web analytics source.
//!
//! Querying a reporting API is not this crate's job; clients only need to hand back the
//! most viewed page paths, busiest first.

use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cache::{Cache, CacheExt},
    error::{Error, Result},
    store::DEFAULT_READ_TIMEOUT,
    utils::read_to_string,
};

pub const DEFAULT_ANALYTICS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A page path and how often it was viewed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub path: String,
    pub view_count: u64,
}

impl PageResult {
    pub fn new(path: impl Into<String>, view_count: u64) -> Self {
        Self {
            path: path.into(),
            view_count,
        }
    }
}

pub trait AnalyticsClient: Send + Sync {
    /// Up to `max_count` pages, ordered by descending view count
    fn trending_pages(&self, max_count: u8) -> impl Future<Output = Result<Vec<PageResult>>> + Send;
}

/// No analytics configured: nothing is trending
impl<A: AnalyticsClient> AnalyticsClient for Option<A> {
    async fn trending_pages(&self, max_count: u8) -> Result<Vec<PageResult>> {
        match self {
            Some(client) => client.trending_pages(max_count).await,
            None => Ok(Vec::new()),
        }
    }
}

impl<A: AnalyticsClient> AnalyticsClient for Arc<A> {
    fn trending_pages(&self, max_count: u8) -> impl Future<Output = Result<Vec<PageResult>>> + Send {
        (**self).trending_pages(max_count)
    }
}

/// Reads page views from a JSON report exported out of the analytics tool
///
/// The report is a list of `{"path": "/articles/foo", "view_count": 42}` objects in any
/// order.
#[derive(Debug, Clone)]
pub struct ReportFileAnalytics {
    path: PathBuf,
    read_timeout: Duration,
}

impl ReportFileAnalytics {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

impl AnalyticsClient for ReportFileAnalytics {
    async fn trending_pages(&self, max_count: u8) -> Result<Vec<PageResult>> {
        let report = read_to_string(&self.path, self.read_timeout).await?;
        let mut pages: Vec<PageResult> = serde_json::from_str(&report).map_err(|err| {
            Error::Analytics(format!("invalid report {}: {err}", self.path.display()))
        })?;
        pages.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        pages.truncate(usize::from(max_count));
        debug!("Read {} trending pages from {}", pages.len(), self.path.display());
        Ok(pages)
    }
}

/// Keeps analytics results around so the source is queried at most once per `ttl`
#[derive(Debug, Clone)]
pub struct CachedAnalyticsClient<A> {
    inner: A,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl<A: AnalyticsClient> CachedAnalyticsClient<A> {
    pub fn new(inner: A, cache: Arc<dyn Cache>) -> Self {
        Self {
            inner,
            cache,
            ttl: DEFAULT_ANALYTICS_TTL,
        }
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl<A: AnalyticsClient> AnalyticsClient for CachedAnalyticsClient<A> {
    async fn trending_pages(&self, max_count: u8) -> Result<Vec<PageResult>> {
        let key = format!("AnalyticsTrendingPages:{max_count}");
        if let Some(pages) = self.cache.get::<Vec<PageResult>>(&key) {
            return Ok(pages);
        }

        // concurrent misses may both query the source, which is harmless
        let pages = self.inner.trending_pages(max_count).await?;
        self.cache.set(&key, pages.clone(), Some(self.ttl));
        Ok(pages)
    }
}
