//! Filesystem naming and creation helpers shared by both ends of a transfer
// (c) 2025 the mftp developers

use std::path::Path;

use tokio::fs::{File, OpenOptions};

/// The file-name part of a path, as text. Directory components are stripped;
/// paths with no file-name part (`/`, `..`) yield `None`.
pub(crate) fn basename(path: &str) -> Option<&str> {
    Path::new(path).file_name().and_then(|n| n.to_str())
}

/// Opens `dest` for writing, failing if it already exists. Mode 0o666
/// before umask, matching conventional non-executable creation.
pub(crate) async fn exclusive_create(dest: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    let _ = options.write(true).create_new(true);
    #[cfg(unix)]
    let _ = options.mode(0o666);
    options.open(dest).await
}
