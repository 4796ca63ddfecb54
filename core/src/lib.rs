//! Core types of `quill`: articles, their metadata block, and paging.
//!
//! This crate does no I/O. Reading article files and caching them lives in `quill`.

pub mod article;
pub mod metadata;
pub mod paging;

pub use article::Article;
pub use metadata::{ArticleMetadata, FormatError};
pub use paging::PagedCollection;
