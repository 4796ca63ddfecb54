use std::{io, path::Path, time::Duration};

use tokio::{fs, time::timeout};

/// Read a whole file, giving up once `limit` elapses
pub async fn read_to_string(path: impl AsRef<Path>, limit: Duration) -> io::Result<String> {
    let path = path.as_ref();
    timeout(limit, fs::read_to_string(path))
        .await
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::TimedOut,
                format!("reading {} took longer than {limit:?}", path.display()),
            )
        })?
}

/// File stem as UTF-8, if the file has one
pub fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}
