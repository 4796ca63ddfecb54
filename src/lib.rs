pub mod analytics;
pub mod blog;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod repository;
pub mod service;
pub mod store;
pub mod trending;

pub(crate) mod utils;

pub use blog::Blog;
pub use error::{Error, Result};
pub use quill_core::{Article, ArticleMetadata, FormatError, PagedCollection};
