//! Local filesystem store for visit photos.
//!
//! Paths handed in are relative to the configured storage root and are
//! produced by `atelier_core::visit_photo::storage_path`.

use std::path::{Path, PathBuf};

/// Absolute location of a stored object.
pub fn resolve(root: &Path, relative: &str) -> PathBuf {
    root.join(relative)
}

/// Write an object, creating parent directories as needed.
pub async fn write_object(root: &Path, relative: &str, data: &[u8]) -> std::io::Result<()> {
    let path = resolve(root, relative);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, data).await
}

pub async fn read_object(root: &Path, relative: &str) -> std::io::Result<Vec<u8>> {
    tokio::fs::read(resolve(root, relative)).await
}

/// Remove an object. A missing file is not an error.
pub async fn remove_object(root: &Path, relative: &str) -> std::io::Result<()> {
    match tokio::fs::remove_file(resolve(root, relative)).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Remove a directory and everything below it. A missing directory is not an error.
pub async fn remove_tree(root: &Path, relative: &str) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(resolve(root, relative)).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
