//! Sync handle request options

use crate::error::OpfsError;
use crate::platform::AccessMode;

/// Options accepted by the sync handle upgrade
///
/// At least one of `path` and `handle` must be set. When both are set the
/// handle wins and no path resolution happens. An empty `path` counts as
/// unset.
#[derive(Debug, Clone)]
pub struct SyncHandleOptions<F> {
    pub path: Option<String>,
    pub handle: Option<F>,
    pub mode: Option<AccessMode>,
}

/// The file a validated request targets
#[derive(Debug, Clone)]
pub enum FileTarget<F> {
    Path(String),
    Handle(F),
}

impl<F> Default for SyncHandleOptions<F> {
    fn default() -> Self {
        Self {
            path: None,
            handle: None,
            mode: None,
        }
    }
}

impl<F> SyncHandleOptions<F> {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_handle(handle: F) -> Self {
        Self {
            handle: Some(handle),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the mode from its web name, e.g. `"read-only"`
    pub fn with_mode_str(self, mode: &str) -> Result<Self, OpfsError> {
        Ok(self.with_mode(mode.parse()?))
    }

    /// Pick the target file and the effective access mode
    pub fn validate(self, default_mode: AccessMode) -> Result<(FileTarget<F>, AccessMode), OpfsError> {
        let mode = self.mode.unwrap_or(default_mode);
        let target = match (self.handle, self.path) {
            (Some(handle), _) => FileTarget::Handle(handle),
            (None, Some(path)) if !path.is_empty() => FileTarget::Path(path),
            _ => {
                return Err(OpfsError::InvalidArgument(
                    "either path or file handle must be provided".into(),
                ));
            }
        };
        Ok((target, mode))
    }
}
