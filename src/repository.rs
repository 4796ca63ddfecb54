use std::{future::Future, sync::Arc, time::Duration};

use quill_core::Article;
use tracing::debug;

use crate::{
    cache::{Cache, CacheExt},
    error::{Error, Result},
};

/// All articles, most recently published first
pub type Articles = Arc<[Article]>;

pub const ALL_ARTICLES_KEY: &str = "Articles:All-Sorted-By-Date";

pub const DEFAULT_ARTICLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub trait ArticleRepository: Send + Sync {
    /// `Ok(None)` when no article has this id
    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Article>>> + Send;

    fn all_sorted_by_date(&self) -> impl Future<Output = Result<Articles>> + Send;
}

impl<R: ArticleRepository> ArticleRepository for Arc<R> {
    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Article>>> + Send {
        (**self).get(id)
    }

    fn all_sorted_by_date(&self) -> impl Future<Output = Result<Articles>> + Send {
        (**self).all_sorted_by_date()
    }
}

fn article_key(id: &str) -> String {
    format!("Article:{id}")
}

/// Read-through cache in front of another repository
///
/// Only found articles are cached, so an article added later is picked up on the
/// next lookup. Two cold callers may both reach the inner repository; the last one
/// to finish leaves its result in the cache.
#[derive(Debug, Clone)]
pub struct CachedArticleRepository<R> {
    inner: R,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl<R: ArticleRepository> CachedArticleRepository<R> {
    pub fn new(inner: R, cache: Arc<dyn Cache>) -> Self {
        Self {
            inner,
            cache,
            ttl: DEFAULT_ARTICLE_TTL,
        }
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub const fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: ArticleRepository> ArticleRepository for CachedArticleRepository<R> {
    async fn get(&self, id: &str) -> Result<Option<Article>> {
        if id.is_empty() {
            return Err(Error::InvalidArgument("article id must not be empty"));
        }

        let key = article_key(id);
        if let Some(article) = self.cache.get::<Article>(&key) {
            debug!("Serving article `{id}` from cache");
            return Ok(Some(article));
        }

        let article = self.inner.get(id).await?;
        if let Some(article) = &article {
            self.cache.set(&key, article.clone(), Some(self.ttl));
        }
        Ok(article)
    }

    async fn all_sorted_by_date(&self) -> Result<Articles> {
        if let Some(articles) = self.cache.get::<Articles>(ALL_ARTICLES_KEY) {
            debug!("Serving {} articles from cache", articles.len());
            return Ok(articles);
        }

        let articles = self.inner.all_sorted_by_date().await?;
        self.cache
            .set(ALL_ARTICLES_KEY, articles.clone(), Some(self.ttl));
        Ok(articles)
    }
}
