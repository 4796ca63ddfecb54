use std::sync::Arc;

use tracing::debug;

use crate::{
    analytics::{CachedAnalyticsClient, ReportFileAnalytics},
    config::Config,
    repository::CachedArticleRepository,
    service::ArticleService,
    store::StaticFileRepository,
    trending::TrendingResolver,
};

pub type BlogRepository = CachedArticleRepository<StaticFileRepository>;

/// `None` when no analytics report is configured
pub type BlogAnalytics = Option<CachedAnalyticsClient<ReportFileAnalytics>>;

pub type Blog = ArticleService<BlogRepository, BlogAnalytics>;

impl Blog {
    /// Wire store, cache, analytics and trending together as configured
    ///
    /// One cache is created here and shared by every layer.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let cache = config.cache().build();

        let store = StaticFileRepository::open(config.articles_dir())
            .with_read_timeout(config.read_timeout())
            .with_max_concurrent_reads(config.max_concurrent_reads());
        let repository = Arc::new(
            CachedArticleRepository::new(store, cache.clone())
                .with_ttl(config.cache().article_ttl()),
        );

        let trending = config.trending();
        let settings = trending.settings();
        let analytics = trending.report.as_ref().map(|report| {
            CachedAnalyticsClient::new(
                ReportFileAnalytics::new(report).with_read_timeout(config.read_timeout()),
                cache.clone(),
            )
            .with_ttl(settings.ttl)
        });

        debug!(
            "Serving articles from {} (cache {}, analytics {})",
            config.articles_dir().display(),
            if config.cache().enabled { "on" } else { "off" },
            if analytics.is_some() { "on" } else { "off" },
        );

        let resolver = TrendingResolver::new(repository.clone(), analytics, cache)
            .with_settings(settings);
        Self::new(repository, resolver)
    }
}
