//! Storage platform
//!
//! Traits modelling the OPFS handle API, plus the browser binding and an
//! in-process model of the same semantics.
//!
//! Futures returned by these traits are `!Send`: browser handles live on a
//! single JS thread.

pub mod memory;
pub mod modes;
#[cfg(target_arch = "wasm32")]
pub mod web;

use async_trait::async_trait;

use crate::error::PlatformError;

pub use modes::AccessMode;

/// Source of the origin's root directory
#[async_trait(?Send)]
pub trait StorageRoot {
    type Directory: DirectoryHandle;

    /// Request a fresh handle on the root directory
    async fn root_directory(&self) -> Result<Self::Directory, PlatformError>;
}

/// A directory node in the storage tree
#[async_trait(?Send)]
pub trait DirectoryHandle: Sized {
    type File: FileHandle;

    fn name(&self) -> String;

    /// Fetch a child directory, creating it when `create` is set
    async fn get_directory_handle(&self, name: &str, create: bool)
        -> Result<Self, PlatformError>;

    /// Fetch a child file, creating it when `create` is set
    async fn get_file_handle(&self, name: &str, create: bool)
        -> Result<Self::File, PlatformError>;
}

/// A file node in the storage tree
#[async_trait(?Send)]
pub trait FileHandle {
    type SyncAccess: SyncAccessHandle;

    fn name(&self) -> String;

    /// Whether both handles point at the same entry
    async fn is_same_entry(&self, other: &Self) -> Result<bool, PlatformError>;

    /// Open a synchronous access session in the given mode
    async fn create_sync_access_handle(
        &self,
        mode: AccessMode,
    ) -> Result<Self::SyncAccess, PlatformError>;
}

/// A live synchronous session on a file
///
/// The session holds the file's lock until `close` is called.
pub trait SyncAccessHandle {
    fn read_at(&self, buf: &mut [u8], at: u64) -> Result<usize, PlatformError>;
    fn write_at(&self, buf: &[u8], at: u64) -> Result<usize, PlatformError>;
    fn get_size(&self) -> Result<u64, PlatformError>;
    fn truncate(&self, size: u64) -> Result<(), PlatformError>;
    fn flush(&self) -> Result<(), PlatformError>;
    fn close(&self) -> Result<(), PlatformError>;
}

/// File handle type produced by a storage root
pub type FileOf<S> = <<S as StorageRoot>::Directory as DirectoryHandle>::File;

/// Sync access handle type produced by a storage root
pub type SyncAccessOf<S> = <FileOf<S> as FileHandle>::SyncAccess;
