//! Resolve module
//!
//! Turns virtual paths into OPFS file handles and upgrades file handles into
//! synchronous access sessions.

mod helper;
mod operations;
mod options;

pub use helper::OpfsHelper;
pub use operations::{
    open_sync_handle, open_sync_handle_with, resolve_file_handle, resolve_file_handle_with,
};
pub use options::{FileTarget, SyncHandleOptions};
