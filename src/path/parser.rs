//! Virtual path parser

use crate::error::OpfsError;
use crate::path::results::VirtualPath;

/// Storage-origin marker accepted in front of virtual paths
pub const OPFS_PREFIX: &str = "opfs://";

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Whether a path carries the `opfs://` marker
pub fn is_opfs_path(path: &str) -> bool {
    path.starts_with(OPFS_PREFIX)
}

/// Drop the `opfs://` marker if present
pub fn strip_opfs_prefix(path: &str) -> &str {
    path.strip_prefix(OPFS_PREFIX).unwrap_or(path)
}

/// Split a virtual path into directories and a file name
///
/// `prefix` is stripped first when present. Segments are separated by `/` or
/// `\`. Directory segments are kept verbatim, empty ones included, and left
/// for the platform to accept or reject. An empty file name is an error.
pub fn parse_virtual_path(path: &str, prefix: &str) -> Result<VirtualPath, OpfsError> {
    let opfs_path = path.strip_prefix(prefix).unwrap_or(path);

    if !opfs_path.contains(is_separator) {
        if opfs_path.is_empty() {
            return Err(OpfsError::InvalidPath(path.to_string()));
        }
        return Ok(VirtualPath {
            directories: Vec::new(),
            file_name: opfs_path.to_string(),
        });
    }

    let mut directories: Vec<String> = opfs_path.split(is_separator).map(String::from).collect();
    let file_name = directories.pop().unwrap_or_default();
    if file_name.is_empty() {
        return Err(OpfsError::InvalidPath(path.to_string()));
    }

    Ok(VirtualPath {
        directories,
        file_name,
    })
}
