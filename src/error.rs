use std::path::PathBuf;

use quill_core::FormatError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("Cannot parse the file `{}` to an article: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Analytics error: {0}")]
    Analytics(String),
}
