//! Configured entry point pairing a storage root with its settings

use crate::config::OpfsConfig;
use crate::error::OpfsError;
use crate::platform::{FileOf, StorageRoot, SyncAccessOf};
use crate::resolve::operations::{open_sync_handle_with, resolve_file_handle_with};
use crate::resolve::options::SyncHandleOptions;

/// A storage root together with the configuration applied to every call
///
/// Holds no handles between calls.
#[derive(Debug, Clone)]
pub struct OpfsHelper<S> {
    storage: S,
    config: OpfsConfig,
}

impl<S: StorageRoot> OpfsHelper<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, OpfsConfig::default())
    }

    pub fn with_config(storage: S, config: OpfsConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &OpfsConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Resolve `path` to a file handle, creating directories and the file
    pub async fn file_handle(&self, path: &str) -> Result<FileOf<S>, OpfsError> {
        resolve_file_handle_with(&self.storage, path, &self.config).await
    }

    /// Open a sync access session described by `options`
    pub async fn sync_handle(
        &self,
        options: SyncHandleOptions<FileOf<S>>,
    ) -> Result<SyncAccessOf<S>, OpfsError> {
        open_sync_handle_with(&self.storage, options, &self.config).await
    }
}
