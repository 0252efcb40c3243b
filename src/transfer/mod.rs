// ABOUTME: Recursive file transfer between the local disk and a remote host over SFTP.
// ABOUTME: Both directions run the same copy engine over the FileSystem trait.

mod error;
mod fs;
mod local;
mod pattern;
mod sftp;
mod walk;

pub use error::TransferError;
pub use fs::{BoxedReader, BoxedWriter, DirEntry, EntryKind, FileSystem};
pub use local::LocalFs;
pub use pattern::{expand_glob, has_magic};
pub use sftp::SftpFs;
pub use walk::{
    TransferEntry, TransferSummary, TreeWalker, copy_file, copy_matches, trim_trailing_slash,
};

use crate::error::Error;
use crate::ssh::{Connector, SessionTarget, Transport, connect};
use std::path::Path;

/// Which way a transfer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Download,
    Upload,
}

/// Download everything `remote_src` matches into `local_dst`.
pub async fn get<C>(
    connector: &C,
    target: &SessionTarget,
    remote_src: &str,
    local_dst: &Path,
) -> Result<TransferSummary, Error>
where
    C: Connector,
{
    transfer(connector, target, Direction::Download, remote_src, local_dst).await
}

/// Upload everything `local_src` matches into `remote_dst`.
pub async fn put<C>(
    connector: &C,
    target: &SessionTarget,
    local_src: &str,
    remote_dst: &Path,
) -> Result<TransferSummary, Error>
where
    C: Connector,
{
    transfer(connector, target, Direction::Upload, local_src, remote_dst).await
}

async fn transfer<C>(
    connector: &C,
    target: &SessionTarget,
    direction: Direction,
    src: &str,
    dst: &Path,
) -> Result<TransferSummary, Error>
where
    C: Connector,
{
    let connection = connect(connector, target).await?;
    let result = transfer_on(connection.transport(), direction, src, dst).await;
    connection.close().await;
    Ok(result?)
}

/// Run one transfer over an established transport.
///
/// The SFTP session is closed before returning, whatever the outcome.
pub async fn transfer_on<T>(
    transport: &T,
    direction: Direction,
    src: &str,
    dst: &Path,
) -> Result<TransferSummary, TransferError>
where
    T: Transport + ?Sized,
{
    let remote = transport.open_sftp().await?;
    let local = LocalFs::new();

    tracing::debug!("{:?} {} -> {}", direction, src, dst.display());
    let result = match direction {
        Direction::Download => copy_matches(remote.as_ref(), src, &local, dst).await,
        Direction::Upload => copy_matches(&local, src, remote.as_ref(), dst).await,
    };

    if let Err(e) = remote.close().await {
        tracing::warn!("failed to close SFTP session: {}", e);
    }
    result
}
