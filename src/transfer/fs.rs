// ABOUTME: Filesystem abstraction shared by local and remote transfer endpoints.
// ABOUTME: The copy engine only talks to this trait, in either direction.

use super::error::TransferError;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWrite};

/// Directory or anything else. Symlinks count as files and are copied by
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

/// One child of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// The operations a transfer needs from one side of the copy.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// All paths matching `pattern`, sorted. No match is an empty list.
    async fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, TransferError>;

    async fn stat(&self, path: &Path) -> io::Result<EntryKind>;

    /// Children of `path`, excluding `.` and `..`.
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    async fn open_read(&self, path: &Path) -> io::Result<BoxedReader>;

    /// Create or truncate `path` for writing.
    async fn create(&self, path: &Path) -> io::Result<BoxedWriter>;

    /// Create `path` and any missing parents.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Release the filesystem's session, if it has one.
    async fn close(&self) -> io::Result<()> {
        Ok(())
    }
}
