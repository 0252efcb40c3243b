// ABOUTME: FileSystem backed by the local disk.
// ABOUTME: Uses the glob crate for pattern matching and tokio::fs for I/O.

use super::error::TransferError;
use super::fs::{BoxedReader, BoxedWriter, DirEntry, EntryKind, FileSystem};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFs {
    async fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, TransferError> {
        let paths = glob::glob(pattern).map_err(|e| TransferError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        // Unreadable entries are skipped, same as unlistable remote dirs
        let mut matches: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
        matches.sort();
        Ok(matches)
    }

    async fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        let meta = tokio::fs::metadata(path).await?;
        Ok(if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        })
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut dir = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            // Symlinks are never walked into; opening one to a directory fails
            let is_dir = entry.file_type().await?.is_dir();
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: if is_dir { EntryKind::Dir } else { EntryKind::File },
            });
        }
        Ok(entries)
    }

    async fn open_read(&self, path: &Path) -> io::Result<BoxedReader> {
        let file = tokio::fs::File::open(path).await?;
        if file.metadata().await?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            ));
        }
        Ok(Box::new(file))
    }

    async fn create(&self, path: &Path) -> io::Result<BoxedWriter> {
        Ok(Box::new(tokio::fs::File::create(path).await?))
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder.create(path).await
    }
}
