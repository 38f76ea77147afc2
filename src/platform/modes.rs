//! Sync access modes
//!
//! Locking modes accepted by `createSyncAccessHandle`.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::OpfsError;

/// Locking mode of a synchronous access session
///
/// `ReadWrite` takes an exclusive lock. `ReadOnly` and `ReadWriteUnsafe`
/// may be held by several sessions at once, as long as they share the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum AccessMode {
    #[serde(rename = "readwrite")]
    ReadWrite,
    #[serde(rename = "read-only")]
    ReadOnly,
    #[default]
    #[serde(rename = "readwrite-unsafe")]
    ReadWriteUnsafe,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadWrite => "readwrite",
            AccessMode::ReadOnly => "read-only",
            AccessMode::ReadWriteUnsafe => "readwrite-unsafe",
        }
    }

    /// Whether a new session in `self` may coexist with one held in `held`
    pub fn is_compatible_with(&self, held: AccessMode) -> bool {
        match (self, held) {
            (AccessMode::ReadWrite, _) | (_, AccessMode::ReadWrite) => false,
            (a, b) => *a == b,
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = OpfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "readwrite" => Ok(AccessMode::ReadWrite),
            "read-only" => Ok(AccessMode::ReadOnly),
            "readwrite-unsafe" => Ok(AccessMode::ReadWriteUnsafe),
            other => Err(OpfsError::InvalidArgument(format!(
                "unknown access mode '{}'",
                other
            ))),
        }
    }
}
