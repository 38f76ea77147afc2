//! OPFS helper
//!
//! Resolves virtual paths such as `opfs://db/main.db` into Origin Private File
//! System file handles, creating missing directories and files, and upgrades
//! file handles into synchronous access sessions.

#[cfg(target_arch = "wasm32")]
pub mod bindings;
pub mod config;
pub mod error;
pub mod path;
pub mod platform;
pub mod resolve;
pub mod utils;

pub use crate::config::OpfsConfig;
pub use error::{OpfsError, PlatformError, PlatformErrorKind};
pub use path::{OPFS_PREFIX, VirtualPath, parse_virtual_path};
pub use platform::AccessMode;
pub use resolve::{
    FileTarget, OpfsHelper, SyncHandleOptions, open_sync_handle, open_sync_handle_with,
    resolve_file_handle, resolve_file_handle_with,
};
