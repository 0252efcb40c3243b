// ABOUTME: In-memory FileSystem standing in for a remote SFTP server.
// ABOUTME: Supports failure injection on the Nth file creation.

use async_trait::async_trait;
use parking_lot::Mutex;
use skiff::transfer::{
    BoxedReader, BoxedWriter, DirEntry, EntryKind, FileSystem, TransferError, expand_glob,
};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    creates: usize,
    fail_create_on: Option<usize>,
    unreadable: Vec<PathBuf>,
    closes: usize,
}

/// Shared handle; clones see the same tree.
#[derive(Debug, Clone)]
pub struct MemoryFs {
    state: Arc<Mutex<State>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut state = State::default();
        state.nodes.insert(PathBuf::from("/"), Node::Dir);
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Add a directory and its parents.
    pub fn add_dir(&self, path: &str) -> &Self {
        let mut state = self.state.lock();
        for ancestor in Path::new(path).ancestors() {
            if !ancestor.as_os_str().is_empty() {
                state.nodes.insert(ancestor.to_path_buf(), Node::Dir);
            }
        }
        self
    }

    /// Add a file, creating its parent directories.
    pub fn add_file(&self, path: &str, content: &[u8]) -> &Self {
        if let Some(parent) = Path::new(path).parent() {
            self.add_dir(&parent.to_string_lossy());
        }
        self.state
            .lock()
            .nodes
            .insert(PathBuf::from(path), Node::File(content.to_vec()));
        self
    }

    /// The `n`th call to `create` (1-based) fails with PermissionDenied.
    pub fn fail_create_on(&self, n: usize) -> &Self {
        self.state.lock().fail_create_on = Some(n);
        self
    }

    /// Listing this directory fails with PermissionDenied.
    pub fn deny_listing(&self, path: &str) -> &Self {
        self.state.lock().unreadable.push(PathBuf::from(path));
        self
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        match self.state.lock().nodes.get(Path::new(path)) {
            Some(Node::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: &str) -> bool {
        matches!(self.state.lock().nodes.get(Path::new(path)), Some(Node::Dir))
    }

    /// Every path in the tree, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.state.lock().nodes.keys().cloned().collect()
    }

    /// Paths of all files under `dir`.
    pub fn files_under(&self, dir: &str) -> Vec<PathBuf> {
        self.state
            .lock()
            .nodes
            .iter()
            .filter(|(path, node)| path.starts_with(dir) && matches!(node, Node::File(_)))
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path.display()))
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>, TransferError> {
        expand_glob(self, pattern).await
    }

    async fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        match self.state.lock().nodes.get(path) {
            Some(Node::Dir) => Ok(EntryKind::Dir),
            Some(Node::File(_)) => Ok(EntryKind::File),
            None => Err(not_found(path)),
        }
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let state = self.state.lock();
        if state.unreadable.iter().any(|p| p == path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot list {}", path.display()),
            ));
        }
        match state.nodes.get(path) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("not a directory: {}", path.display()),
                ));
            }
            None => return Err(not_found(path)),
        }

        Ok(state
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .filter_map(|(child, node)| {
                let name = child.file_name()?.to_string_lossy().into_owned();
                let kind = match node {
                    Node::Dir => EntryKind::Dir,
                    Node::File(_) => EntryKind::File,
                };
                Some(DirEntry { name, kind })
            })
            .collect())
    }

    async fn open_read(&self, path: &Path) -> io::Result<BoxedReader> {
        match self.state.lock().nodes.get(path) {
            Some(Node::File(content)) => Ok(Box::new(io::Cursor::new(content.clone()))),
            Some(Node::Dir) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    async fn create(&self, path: &Path) -> io::Result<BoxedWriter> {
        let mut state = self.state.lock();
        state.creates += 1;
        if state.fail_create_on == Some(state.creates) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }

        let parent = path.parent().ok_or_else(|| not_found(path))?;
        if state.nodes.get(parent) != Some(&Node::Dir) {
            return Err(not_found(parent));
        }
        if state.nodes.get(path) == Some(&Node::Dir) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path.display()),
            ));
        }

        state.nodes.insert(path.to_path_buf(), Node::File(Vec::new()));
        Ok(Box::new(MemoryWriter {
            fs: self.clone(),
            path: path.to_path_buf(),
        }))
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.lock();
        let mut ancestors: Vec<&Path> = path
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        ancestors.reverse();

        for dir in ancestors {
            match state.nodes.get(dir) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("not a directory: {}", dir.display()),
                    ));
                }
                None => {
                    state.nodes.insert(dir.to_path_buf(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    async fn close(&self) -> io::Result<()> {
        self.state.lock().closes += 1;
        Ok(())
    }
}

/// Appends every write straight into the tree.
struct MemoryWriter {
    fs: MemoryFs,
    path: PathBuf,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut state = self.fs.state.lock();
        match state.nodes.get_mut(&self.path) {
            Some(Node::File(content)) => {
                content.extend_from_slice(buf);
                Poll::Ready(Ok(buf.len()))
            }
            _ => Poll::Ready(Err(not_found(&self.path))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
