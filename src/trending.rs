use std::{collections::HashSet, sync::Arc, time::Duration};

use quill_core::Article;
use tracing::{debug, info};

use crate::{
    analytics::AnalyticsClient,
    cache::{Cache, CacheExt},
    error::Result,
    repository::{ArticleRepository, Articles},
};

pub const TRENDING_KEY: &str = "TrendingArticles";

/// Limits of the trending resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendingSettings {
    /// How many of the most viewed pages to ask the analytics source for
    pub max_pages: u8,
    /// How many articles end up in the trending list
    pub max_articles: usize,
    pub ttl: Duration,
}

impl Default for TrendingSettings {
    fn default() -> Self {
        Self {
            max_pages: u8::MAX,
            max_articles: 10,
            ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Maps the most viewed page paths back to articles
///
/// A page belongs to the first article, in publish order, whose id appears in the
/// page path, ignoring case. This is a heuristic: a short id that happens to occur in
/// an unrelated path matches too.
#[derive(Debug)]
pub struct TrendingResolver<R, A> {
    repository: Arc<R>,
    analytics: A,
    cache: Arc<dyn Cache>,
    settings: TrendingSettings,
}

impl<R: ArticleRepository, A: AnalyticsClient> TrendingResolver<R, A> {
    pub fn new(repository: Arc<R>, analytics: A, cache: Arc<dyn Cache>) -> Self {
        Self {
            repository,
            analytics,
            cache,
            settings: TrendingSettings::default(),
        }
    }

    #[must_use]
    pub const fn with_settings(mut self, settings: TrendingSettings) -> Self {
        self.settings = settings;
        self
    }

    pub const fn analytics(&self) -> &A {
        &self.analytics
    }

    pub async fn trending(&self) -> Result<Articles> {
        if let Some(trending) = self.cache.get::<Articles>(TRENDING_KEY) {
            debug!("Serving {} trending articles from cache", trending.len());
            return Ok(trending);
        }

        let pages = self.analytics.trending_pages(self.settings.max_pages).await?;
        let articles = self.repository.all_sorted_by_date().await?;
        let trending: Articles = match_articles(
            pages.iter().map(|page| page.path.as_str()),
            &articles,
            self.settings.max_articles,
        )
        .into();

        info!(
            "Resolved {} trending articles from {} pages",
            trending.len(),
            pages.len()
        );
        self.cache
            .set(TRENDING_KEY, trending.clone(), Some(self.settings.ttl));
        Ok(trending)
    }
}

fn match_articles<'a>(
    paths: impl IntoIterator<Item = &'a str>,
    articles: &[Article],
    limit: usize,
) -> Vec<Article> {
    let lowered_ids: Vec<String> = articles.iter().map(|a| a.id().to_lowercase()).collect();
    let mut picked = HashSet::new();
    let mut trending = Vec::new();

    for path in paths {
        if trending.len() >= limit {
            break;
        }
        let path = path.to_lowercase();
        let Some(index) = lowered_ids.iter().position(|id| path.contains(id.as_str())) else {
            continue;
        };
        if picked.insert(index) {
            trending.push(articles[index].clone());
        }
    }

    trending
}
