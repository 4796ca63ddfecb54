use std::sync::Arc;

use quill_core::{Article, PagedCollection};

use crate::{
    analytics::AnalyticsClient,
    error::{Error, Result},
    repository::{ArticleRepository, Articles},
    trending::TrendingResolver,
};

/// Everything the presentation layer asks about articles
///
/// All listings are views over the one cached "all articles by date" collection.
#[derive(Debug)]
pub struct ArticleService<R, A> {
    repository: Arc<R>,
    trending: TrendingResolver<R, A>,
}

impl<R: ArticleRepository, A: AnalyticsClient> ArticleService<R, A> {
    pub const fn new(repository: Arc<R>, trending: TrendingResolver<R, A>) -> Self {
        Self {
            repository,
            trending,
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Article>> {
        self.repository.get(id).await
    }

    /// Articles carrying exactly this tag, newest first
    pub async fn get_by_tag(&self, tag: &str) -> Result<Vec<Article>> {
        if tag.is_empty() {
            return Err(Error::InvalidArgument("tag must not be empty"));
        }
        let articles = self.repository.all_sorted_by_date().await?;
        Ok(articles
            .iter()
            .filter(|article| article.metadata().has_tag(tag))
            .cloned()
            .collect())
    }

    pub async fn get_all(&self) -> Result<Articles> {
        self.repository.all_sorted_by_date().await
    }

    /// Page `page` (1-indexed) of `page_size` articles
    pub async fn get_by_page(&self, page_size: usize, page: usize) -> Result<PagedCollection<Article>> {
        if page_size == 0 {
            return Err(Error::InvalidArgument("page size must be positive"));
        }
        if page == 0 {
            return Err(Error::InvalidArgument("pages are numbered from 1"));
        }
        let articles = self.repository.all_sorted_by_date().await?;
        PagedCollection::paginate(&articles[..], page_size, page)
            .ok_or(Error::InvalidArgument("page size and number must be positive"))
    }

    pub async fn get_most_recent(&self, max_count: usize) -> Result<Vec<Article>> {
        let articles = self.repository.all_sorted_by_date().await?;
        Ok(articles.iter().take(max_count).cloned().collect())
    }

    pub async fn get_trending(&self) -> Result<Articles> {
        self.trending.trending().await
    }
}
