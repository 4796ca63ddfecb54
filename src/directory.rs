use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
};

use futures::TryStreamExt;
use tokio::fs;
use tokio_stream::wrappers::ReadDirStream;

/// Lists the files of a directory
pub trait DirectoryReader: Send + Sync {
    /// Files directly inside `dir` whose extension is exactly `extension`, sorted by path
    fn files(
        &self,
        dir: &Path,
        extension: &str,
    ) -> impl Future<Output = io::Result<Vec<PathBuf>>> + Send;
}

/// [`DirectoryReader`] backed by the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectoryReader;

impl DirectoryReader for FsDirectoryReader {
    async fn files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        let entries = ReadDirStream::new(fs::read_dir(dir).await?);
        let mut files: Vec<PathBuf> = entries
            .try_filter_map(|entry| async move {
                let is_file = entry.file_type().await?.is_file();
                let path = entry.path();
                let matches = path
                    .extension()
                    .is_some_and(|ext| ext == extension);
                Ok((is_file && matches).then_some(path))
            })
            .try_collect()
            .await?;
        files.sort();
        Ok(files)
    }
}
