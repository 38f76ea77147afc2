//! In-process storage platform
//!
//! Models the OPFS handle semantics without a browser: entry name rules,
//! not-found on lookups without `create`, file/directory type mismatches and
//! sync access locking. Every request is recorded in a journal so callers can
//! observe which platform operations ran and in what order.

use async_trait::async_trait;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{PlatformError, PlatformErrorKind};
use crate::platform::{AccessMode, DirectoryHandle, FileHandle, StorageRoot, SyncAccessHandle};

/// A platform request recorded by [`MemoryStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    GetRoot,
    GetDirectory { path: String, create: bool },
    GetFile { path: String, create: bool },
    CreateSyncAccess { path: String, mode: AccessMode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

#[derive(Default)]
struct DirNode {
    children: BTreeMap<String, Entry>,
}

#[derive(Clone)]
enum Entry {
    Directory(Arc<Mutex<DirNode>>),
    File(Arc<FileNode>),
}

#[derive(Default)]
struct FileNode {
    data: Mutex<Vec<u8>>,
    /// Mode and number of open sessions
    lock: Mutex<Option<(AccessMode, usize)>>,
}

type Journal = Arc<Mutex<Vec<StorageOp>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Largest offset a JS number represents exactly
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Convert a byte offset or size into an index, as the browser would accept it
fn to_index(value: u64) -> Result<usize, PlatformError> {
    if value > MAX_SAFE_INTEGER {
        return Err(PlatformError::new(
            PlatformErrorKind::Type,
            format!("offset {} exceeds JS MAX_SAFE_INTEGER", value),
        ));
    }
    usize::try_from(value).map_err(|_| {
        PlatformError::new(
            PlatformErrorKind::QuotaExceeded,
            format!("offset {} exceeds the address space", value),
        )
    })
}

fn validate_name(name: &str) -> Result<(), PlatformError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(PlatformError::new(
            PlatformErrorKind::Type,
            format!("Name '{}' is not allowed", name),
        ));
    }
    Ok(())
}

/// Shared in-memory storage tree
#[derive(Clone, Default)]
pub struct MemoryStorage {
    root: Arc<Mutex<DirNode>>,
    journal: Journal,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform requests recorded so far
    pub fn journal(&self) -> Vec<StorageOp> {
        lock(&self.journal).clone()
    }

    pub fn clear_journal(&self) {
        lock(&self.journal).clear();
    }

    /// Kind of the entry at a `/`-separated path, if any
    pub fn entry_kind(&self, path: &str) -> Option<EntryKind> {
        match self.lookup(path)? {
            Entry::Directory(_) => Some(EntryKind::Directory),
            Entry::File(_) => Some(EntryKind::File),
        }
    }

    /// Contents of the file at a `/`-separated path, if any
    pub fn file_contents(&self, path: &str) -> Option<Vec<u8>> {
        match self.lookup(path)? {
            Entry::File(node) => Some(lock(&node.data).clone()),
            Entry::Directory(_) => None,
        }
    }

    /// Names directly under a directory, sorted
    pub fn list(&self, path: &str) -> Option<Vec<String>> {
        let dir = if path.is_empty() {
            self.root.clone()
        } else {
            match self.lookup(path)? {
                Entry::Directory(dir) => dir,
                Entry::File(_) => return None,
            }
        };
        let names = lock(&dir).children.keys().cloned().collect();
        Some(names)
    }

    fn lookup(&self, path: &str) -> Option<Entry> {
        let mut current = Entry::Directory(self.root.clone());
        for segment in path.split('/') {
            let next = match &current {
                Entry::Directory(dir) => lock(dir).children.get(segment).cloned()?,
                Entry::File(_) => return None,
            };
            current = next;
        }
        Some(current)
    }
}

#[async_trait(?Send)]
impl StorageRoot for MemoryStorage {
    type Directory = MemoryDirectory;

    async fn root_directory(&self) -> Result<MemoryDirectory, PlatformError> {
        lock(&self.journal).push(StorageOp::GetRoot);
        Ok(MemoryDirectory {
            path: String::new(),
            node: self.root.clone(),
            journal: self.journal.clone(),
        })
    }
}

/// Directory handle into a [`MemoryStorage`] tree
#[derive(Clone)]
pub struct MemoryDirectory {
    path: String,
    node: Arc<Mutex<DirNode>>,
    journal: Journal,
}

impl fmt::Debug for MemoryDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDirectory")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl MemoryDirectory {
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait(?Send)]
impl DirectoryHandle for MemoryDirectory {
    type File = MemoryFile;

    fn name(&self) -> String {
        self.path.rsplit('/').next().unwrap_or_default().to_string()
    }

    async fn get_directory_handle(
        &self,
        name: &str,
        create: bool,
    ) -> Result<MemoryDirectory, PlatformError> {
        let path = child_path(&self.path, name);
        lock(&self.journal).push(StorageOp::GetDirectory {
            path: path.clone(),
            create,
        });
        validate_name(name)?;

        let mut dir = lock(&self.node);
        let node = match dir.children.get(name) {
            Some(Entry::Directory(node)) => node.clone(),
            Some(Entry::File(_)) => {
                return Err(PlatformError::new(
                    PlatformErrorKind::TypeMismatch,
                    format!("'{}' is a file", path),
                ));
            }
            None if create => {
                let node = Arc::new(Mutex::new(DirNode::default()));
                dir.children
                    .insert(name.to_string(), Entry::Directory(node.clone()));
                node
            }
            None => {
                return Err(PlatformError::not_found(format!(
                    "directory '{}' not found",
                    path
                )));
            }
        };

        Ok(MemoryDirectory {
            path,
            node,
            journal: self.journal.clone(),
        })
    }

    async fn get_file_handle(&self, name: &str, create: bool) -> Result<MemoryFile, PlatformError> {
        let path = child_path(&self.path, name);
        lock(&self.journal).push(StorageOp::GetFile {
            path: path.clone(),
            create,
        });
        validate_name(name)?;

        let mut dir = lock(&self.node);
        let node = match dir.children.get(name) {
            Some(Entry::File(node)) => node.clone(),
            Some(Entry::Directory(_)) => {
                return Err(PlatformError::new(
                    PlatformErrorKind::TypeMismatch,
                    format!("'{}' is a directory", path),
                ));
            }
            None if create => {
                let node = Arc::new(FileNode::default());
                dir.children
                    .insert(name.to_string(), Entry::File(node.clone()));
                node
            }
            None => {
                return Err(PlatformError::not_found(format!(
                    "file '{}' not found",
                    path
                )));
            }
        };

        Ok(MemoryFile {
            path,
            node,
            journal: self.journal.clone(),
        })
    }
}

/// File handle into a [`MemoryStorage`] tree
#[derive(Clone)]
pub struct MemoryFile {
    path: String,
    node: Arc<FileNode>,
    journal: Journal,
}

impl fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFile")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl MemoryFile {
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait(?Send)]
impl FileHandle for MemoryFile {
    type SyncAccess = MemorySyncAccess;

    fn name(&self) -> String {
        self.path.rsplit('/').next().unwrap_or_default().to_string()
    }

    async fn is_same_entry(&self, other: &MemoryFile) -> Result<bool, PlatformError> {
        Ok(Arc::ptr_eq(&self.node, &other.node))
    }

    async fn create_sync_access_handle(
        &self,
        mode: AccessMode,
    ) -> Result<MemorySyncAccess, PlatformError> {
        lock(&self.journal).push(StorageOp::CreateSyncAccess {
            path: self.path.clone(),
            mode,
        });

        let mut held = lock(&self.node.lock);
        match held.as_mut() {
            Some((held_mode, count)) if mode.is_compatible_with(*held_mode) => {
                *count += 1;
            }
            Some((held_mode, _)) => {
                return Err(PlatformError::new(
                    PlatformErrorKind::NoModificationAllowed,
                    format!(
                        "'{}' is locked by a {} session",
                        self.path, held_mode
                    ),
                ));
            }
            None => *held = Some((mode, 1)),
        }

        Ok(MemorySyncAccess {
            node: self.node.clone(),
            mode,
            closed: Cell::new(false),
        })
    }
}

/// Sync access session on a [`MemoryFile`]
///
/// Dropping an open session releases its lock, as garbage collection of the
/// browser object would.
pub struct MemorySyncAccess {
    node: Arc<FileNode>,
    mode: AccessMode,
    closed: Cell<bool>,
}

impl fmt::Debug for MemorySyncAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySyncAccess")
            .field("mode", &self.mode)
            .field("closed", &self.closed.get())
            .finish_non_exhaustive()
    }
}

impl MemorySyncAccess {
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    fn ensure_open(&self) -> Result<(), PlatformError> {
        if self.closed.get() {
            return Err(PlatformError::new(
                PlatformErrorKind::InvalidState,
                "sync access handle is closed",
            ));
        }
        Ok(())
    }

    fn ensure_writable(&self) -> Result<(), PlatformError> {
        self.ensure_open()?;
        if !self.mode.is_writable() {
            return Err(PlatformError::new(
                PlatformErrorKind::NoModificationAllowed,
                "sync access handle is read-only",
            ));
        }
        Ok(())
    }

    /// Grow the file to at least `len` bytes, zero-filled
    fn grow_to(data: &mut Vec<u8>, len: usize) -> Result<(), PlatformError> {
        if data.len() < len {
            data.try_reserve(len - data.len()).map_err(|_| {
                PlatformError::new(
                    PlatformErrorKind::QuotaExceeded,
                    format!("cannot grow file to {} bytes", len),
                )
            })?;
            data.resize(len, 0);
        }
        Ok(())
    }

    fn release(&self) {
        let mut held = lock(&self.node.lock);
        if let Some((_, count)) = held.as_mut() {
            *count -= 1;
            if *count == 0 {
                *held = None;
            }
        }
    }
}

impl SyncAccessHandle for MemorySyncAccess {
    fn read_at(&self, buf: &mut [u8], at: u64) -> Result<usize, PlatformError> {
        self.ensure_open()?;
        let start = to_index(at)?;
        let data = lock(&self.node.data);
        let start = start.min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write_at(&self, buf: &[u8], at: u64) -> Result<usize, PlatformError> {
        self.ensure_writable()?;
        let start = to_index(at)?;
        let end = start.checked_add(buf.len()).ok_or_else(|| {
            PlatformError::new(
                PlatformErrorKind::QuotaExceeded,
                format!("write of {} bytes at {} overflows", buf.len(), at),
            )
        })?;
        let mut data = lock(&self.node.data);
        Self::grow_to(&mut data, end)?;
        data[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn get_size(&self) -> Result<u64, PlatformError> {
        self.ensure_open()?;
        Ok(lock(&self.node.data).len() as u64)
    }

    fn truncate(&self, size: u64) -> Result<(), PlatformError> {
        self.ensure_writable()?;
        let size = to_index(size)?;
        let mut data = lock(&self.node.data);
        if size < data.len() {
            data.truncate(size);
        } else {
            Self::grow_to(&mut data, size)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), PlatformError> {
        self.ensure_writable()
    }

    fn close(&self) -> Result<(), PlatformError> {
        if !self.closed.replace(true) {
            self.release();
        }
        Ok(())
    }
}

impl Drop for MemorySyncAccess {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_without_create_is_not_found() {
        let storage = MemoryStorage::new();
        let root = storage.root_directory().await.unwrap();
        let err = root.get_file_handle("missing.db", false).await.unwrap_err();
        assert!(err.is_not_found());
        let err = root.get_directory_handle("nope", false).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(storage.entry_kind("missing.db"), None);
    }

    #[tokio::test]
    async fn test_invalid_names_are_type_errors() {
        let storage = MemoryStorage::new();
        let root = storage.root_directory().await.unwrap();
        for name in ["", ".", "..", "a/b", "a\\b"] {
            let err = root.get_directory_handle(name, true).await.unwrap_err();
            assert_eq!(err.kind, PlatformErrorKind::Type, "name {name:?}");
        }
        assert_eq!(storage.list(""), Some(vec![]));
    }

    #[tokio::test]
    async fn test_type_mismatch_between_files_and_directories() {
        let storage = MemoryStorage::new();
        let root = storage.root_directory().await.unwrap();
        root.get_file_handle("data", true).await.unwrap();
        let err = root.get_directory_handle("data", true).await.unwrap_err();
        assert_eq!(err.kind, PlatformErrorKind::TypeMismatch);

        root.get_directory_handle("dir", true).await.unwrap();
        let err = root.get_file_handle("dir", false).await.unwrap_err();
        assert_eq!(err.kind, PlatformErrorKind::TypeMismatch);
    }

    #[tokio::test]
    async fn test_readwrite_session_is_exclusive() {
        let storage = MemoryStorage::new();
        let root = storage.root_directory().await.unwrap();
        let file = root.get_file_handle("x.db", true).await.unwrap();

        let first = file
            .create_sync_access_handle(AccessMode::ReadWrite)
            .await
            .unwrap();
        let err = file
            .create_sync_access_handle(AccessMode::ReadWrite)
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind, PlatformErrorKind::NoModificationAllowed);

        first.close().unwrap();
        let second = file
            .create_sync_access_handle(AccessMode::ReadWrite)
            .await
            .unwrap();
        second.close().unwrap();
    }

    #[tokio::test]
    async fn test_shared_modes_coexist_and_drop_releases() {
        let storage = MemoryStorage::new();
        let root = storage.root_directory().await.unwrap();
        let file = root.get_file_handle("x.db", true).await.unwrap();

        let a = file
            .create_sync_access_handle(AccessMode::ReadWriteUnsafe)
            .await
            .unwrap();
        let b = file
            .create_sync_access_handle(AccessMode::ReadWriteUnsafe)
            .await
            .unwrap();
        assert!(
            file.create_sync_access_handle(AccessMode::ReadOnly)
                .await
                .is_err()
        );
        drop(a);
        b.close().unwrap();
        assert!(
            file.create_sync_access_handle(AccessMode::ReadOnly)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_sync_io() {
        let storage = MemoryStorage::new();
        let root = storage.root_directory().await.unwrap();
        let file = root.get_file_handle("io.bin", true).await.unwrap();
        let session = file
            .create_sync_access_handle(AccessMode::ReadWrite)
            .await
            .unwrap();

        assert_eq!(session.write_at(b"hello", 2).unwrap(), 5);
        assert_eq!(session.get_size().unwrap(), 7);
        let mut buf = [0u8; 16];
        let n = session.read_at(&mut buf, 0).unwrap();
        assert_eq!(&buf[..n], b"\0\0hello");
        assert_eq!(session.read_at(&mut buf, 100).unwrap(), 0);

        session.truncate(4).unwrap();
        session.flush().unwrap();
        session.close().unwrap();
        assert_eq!(storage.file_contents("io.bin").unwrap(), b"\0\0he");

        let err = session.get_size().unwrap_err();
        assert_eq!(err.kind, PlatformErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_out_of_range_offsets_are_errors() {
        let storage = MemoryStorage::new();
        let root = storage.root_directory().await.unwrap();
        let file = root.get_file_handle("big.bin", true).await.unwrap();
        let session = file
            .create_sync_access_handle(AccessMode::ReadWrite)
            .await
            .unwrap();
        session.write_at(b"abc", 0).unwrap();

        let err = session.write_at(b"x", u64::MAX).unwrap_err();
        assert_eq!(err.kind, PlatformErrorKind::Type);
        let err = session.truncate(u64::MAX).unwrap_err();
        assert_eq!(err.kind, PlatformErrorKind::Type);
        let mut buf = [0u8; 4];
        let err = session.read_at(&mut buf, u64::MAX).unwrap_err();
        assert_eq!(err.kind, PlatformErrorKind::Type);

        // Largest accepted offset still reads as end of file
        assert_eq!(session.read_at(&mut buf, MAX_SAFE_INTEGER).unwrap(), 0);
        assert_eq!(session.get_size().unwrap(), 3);
        assert_eq!(storage.file_contents("big.bin").unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_read_only_session_rejects_writes() {
        let storage = MemoryStorage::new();
        let root = storage.root_directory().await.unwrap();
        let file = root.get_file_handle("ro.bin", true).await.unwrap();
        let session = file
            .create_sync_access_handle(AccessMode::ReadOnly)
            .await
            .unwrap();
        let err = session.write_at(b"x", 0).unwrap_err();
        assert_eq!(err.kind, PlatformErrorKind::NoModificationAllowed);
    }
}
