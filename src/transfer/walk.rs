// ABOUTME: Tree walking and the copy engine shared by downloads and uploads.
// ABOUTME: Mirrors matched roots under a destination, parents before children.

use super::error::TransferError;
use super::fs::{EntryKind, FileSystem};
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const CHUNK_SIZE: usize = 64 * 1024;

/// One item found while walking a matched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEntry {
    /// Full path on the source side.
    pub source: PathBuf,
    pub kind: EntryKind,
    /// Path relative to the matched root's parent, so the root's own name
    /// is the first component.
    pub relative: PathBuf,
}

/// What a finished transfer copied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// Depth-first, pre-order walk of a directory tree.
///
/// A directory is yielded before anything beneath it. Children are visited
/// in name order.
pub struct TreeWalker<'a, F: ?Sized> {
    fs: &'a F,
    base: PathBuf,
    pending: Vec<(PathBuf, EntryKind)>,
}

impl<'a, F> TreeWalker<'a, F>
where
    F: FileSystem + ?Sized,
{
    /// Walk the directory `root`.
    pub fn new(fs: &'a F, root: &Path) -> Self {
        Self {
            fs,
            base: root.parent().map(Path::to_path_buf).unwrap_or_default(),
            pending: vec![(root.to_path_buf(), EntryKind::Dir)],
        }
    }

    /// The next entry, or `None` when the tree is exhausted.
    pub async fn next_entry(&mut self) -> Result<Option<TransferEntry>, TransferError> {
        let Some((source, kind)) = self.pending.pop() else {
            return Ok(None);
        };

        if kind == EntryKind::Dir {
            let mut children =
                self.fs
                    .read_dir(&source)
                    .await
                    .map_err(|e| TransferError::ReadDir {
                        path: source.clone(),
                        source: e,
                    })?;
            // Reverse order so popping yields ascending names
            children.sort_by(|a, b| b.name.cmp(&a.name));
            self.pending.extend(
                children
                    .into_iter()
                    .map(|child| (source.join(&child.name), child.kind)),
            );
        }

        let relative = relative_to(&source, &self.base);
        Ok(Some(TransferEntry {
            source,
            kind,
            relative,
        }))
    }
}

/// `path` relative to `base`, reduced to plain name components.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// Strip trailing slashes, keeping a lone `/`.
pub fn trim_trailing_slash(pattern: &str) -> &str {
    let trimmed = pattern.trim_end_matches('/');
    if trimmed.is_empty() && pattern.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

/// Copy everything `pattern` matches on `src` into `dst_root` on `dst`.
///
/// A matched directory is recreated under `dst_root` with its own name; a
/// matched file lands at `dst_root/<basename>`. The first failure aborts the
/// copy, and whatever was already written stays in place.
pub async fn copy_matches<S, D>(
    src: &S,
    pattern: &str,
    dst: &D,
    dst_root: &Path,
) -> Result<TransferSummary, TransferError>
where
    S: FileSystem + ?Sized,
    D: FileSystem + ?Sized,
{
    let pattern = trim_trailing_slash(pattern);
    let matches = src.glob(pattern).await?;
    if matches.is_empty() {
        return Err(TransferError::NotFound {
            pattern: pattern.to_string(),
        });
    }

    let mut summary = TransferSummary::default();
    for root in matches {
        let kind = src
            .stat(&root)
            .await
            .map_err(|e| TransferError::Stat {
                path: root.clone(),
                source: e,
            })?;

        match kind {
            EntryKind::Dir => copy_tree(src, &root, dst, dst_root, &mut summary).await?,
            EntryKind::File => {
                let name = root.file_name().unwrap_or(root.as_os_str());
                summary.bytes += copy_file(src, &root, dst, &dst_root.join(name)).await?;
                summary.files += 1;
            }
        }
    }

    tracing::debug!(
        "copied {} file(s), {} dir(s), {} bytes from {}",
        summary.files,
        summary.directories,
        summary.bytes,
        pattern
    );
    Ok(summary)
}

async fn copy_tree<S, D>(
    src: &S,
    root: &Path,
    dst: &D,
    dst_root: &Path,
    summary: &mut TransferSummary,
) -> Result<(), TransferError>
where
    S: FileSystem + ?Sized,
    D: FileSystem + ?Sized,
{
    let mut walker = TreeWalker::new(src, root);
    while let Some(entry) = walker.next_entry().await? {
        let target = dst_root.join(&entry.relative);
        match entry.kind {
            EntryKind::Dir => {
                dst.create_dir_all(&target)
                    .await
                    .map_err(|e| TransferError::Mkdir {
                        path: target.clone(),
                        source: e,
                    })?;
                summary.directories += 1;
            }
            EntryKind::File => {
                summary.bytes += copy_file(src, &entry.source, dst, &target).await?;
                summary.files += 1;
            }
        }
    }
    Ok(())
}

/// Copy one file's full content, overwriting `to`.
pub async fn copy_file<S, D>(src: &S, from: &Path, dst: &D, to: &Path) -> Result<u64, TransferError>
where
    S: FileSystem + ?Sized,
    D: FileSystem + ?Sized,
{
    tracing::debug!("copying {:?} -> {:?}", from, to);

    let mut reader = src.open_read(from).await.map_err(|e| TransferError::Open {
        path: from.to_path_buf(),
        source: e,
    })?;
    let mut writer = dst.create(to).await.map_err(|e| TransferError::Create {
        path: to.to_path_buf(),
        source: e,
    })?;

    let write_err = |e| TransferError::Write {
        path: to.to_path_buf(),
        source: e,
    };

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut copied = 0u64;
    loop {
        let n = reader.read(&mut buf).await.map_err(|e| TransferError::Read {
            path: from.to_path_buf(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await.map_err(write_err)?;
        copied += n as u64;
    }

    writer.shutdown().await.map_err(write_err)?;
    Ok(copied)
}
