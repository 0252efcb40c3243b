// ABOUTME: FileSystem backed by a remote SFTP session.
// ABOUTME: Maps SFTP status codes onto io::ErrorKind so callers can match on them.

use super::error::TransferError;
use super::fs::{BoxedReader, BoxedWriter, DirEntry, EntryKind, FileSystem};
use super::pattern::expand_glob;
use async_trait::async_trait;
use russh_sftp::client::SftpSession;
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::protocol::{FileAttributes, OpenFlags, StatusCode};
use std::io;
use std::path::{Path, PathBuf};

const MODE_TYPE_MASK: u32 = 0o170000;
const MODE_DIR: u32 = 0o040000;

pub struct SftpFs {
    session: SftpSession,
}

impl SftpFs {
    pub fn new(session: SftpSession) -> Self {
        Self { session }
    }
}

impl std::fmt::Debug for SftpFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftpFs").finish_non_exhaustive()
    }
}

fn remote_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn kind_of(attrs: &FileAttributes) -> EntryKind {
    match attrs.permissions {
        Some(mode) if mode & MODE_TYPE_MASK == MODE_DIR => EntryKind::Dir,
        _ => EntryKind::File,
    }
}

fn to_io(err: SftpError) -> io::Error {
    let kind = match &err {
        SftpError::Status(status) => match status.status_code {
            StatusCode::NoSuchFile => io::ErrorKind::NotFound,
            StatusCode::PermissionDenied => io::ErrorKind::PermissionDenied,
            StatusCode::Eof => io::ErrorKind::UnexpectedEof,
            StatusCode::NoConnection | StatusCode::ConnectionLost => {
                io::ErrorKind::ConnectionAborted
            }
            StatusCode::OpUnsupported => io::ErrorKind::Unsupported,
            _ => io::ErrorKind::Other,
        },
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, err.to_string())
}

#[async_trait]
impl FileSystem for SftpFs {
    async fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, TransferError> {
        expand_glob(self, pattern).await
    }

    async fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        let attrs = self
            .session
            .metadata(remote_path(path))
            .await
            .map_err(to_io)?;
        Ok(kind_of(&attrs))
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let listing = self
            .session
            .read_dir(remote_path(path))
            .await
            .map_err(to_io)?;

        Ok(listing
            .into_iter()
            .filter(|e| e.file_name() != "." && e.file_name() != "..")
            .map(|e| DirEntry {
                kind: kind_of(&e.metadata()),
                name: e.file_name(),
            })
            .collect())
    }

    async fn open_read(&self, path: &Path) -> io::Result<BoxedReader> {
        let file = self
            .session
            .open(remote_path(path))
            .await
            .map_err(to_io)?;
        Ok(Box::new(Box::pin(file)))
    }

    async fn create(&self, path: &Path) -> io::Result<BoxedWriter> {
        let file = self
            .session
            .open_with_flags(
                remote_path(path),
                OpenFlags::CREATE | OpenFlags::WRITE | OpenFlags::TRUNCATE,
            )
            .await
            .map_err(to_io)?;
        Ok(Box::new(Box::pin(file)))
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            match self.stat(&current).await {
                Ok(EntryKind::Dir) => continue,
                Ok(EntryKind::File) => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("{} exists and is not a directory", current.display()),
                    ));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }

            if let Err(e) = self.session.create_dir(remote_path(&current)).await {
                // Lost a race with another creator
                if self.stat(&current).await.ok() != Some(EntryKind::Dir) {
                    return Err(to_io(e));
                }
            }
        }
        Ok(())
    }

    async fn close(&self) -> io::Result<()> {
        self.session.close().await.map_err(to_io)
    }
}
