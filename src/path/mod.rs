//! Virtual path handling
//!
//! Splits `opfs://`-style virtual paths into the directory walk and the
//! terminal file name used by the resolver.

mod parser;
mod results;

pub use parser::{OPFS_PREFIX, is_opfs_path, parse_virtual_path, strip_opfs_prefix};
pub use results::VirtualPath;
