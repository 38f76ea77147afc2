//! Error types
//!
//! Defines the platform pass-through error and the crate-level error returned
//! by path resolution and sync handle upgrades.

use std::fmt;

/// Kind of failure reported by the storage platform
///
/// Mirrors the DOMException names the OPFS API raises, so callers can branch
/// on a typed value instead of comparing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformErrorKind {
    NotFound,
    TypeMismatch,
    InvalidState,
    NoModificationAllowed,
    NotAllowed,
    Security,
    QuotaExceeded,
    /// A JS `TypeError`, raised for malformed entry names
    Type,
    Other(String),
}

impl PlatformErrorKind {
    /// Map a DOMException (or JS error) name to a kind
    pub fn from_dom_name(name: &str) -> Self {
        match name {
            "NotFoundError" => PlatformErrorKind::NotFound,
            "TypeMismatchError" => PlatformErrorKind::TypeMismatch,
            "InvalidStateError" => PlatformErrorKind::InvalidState,
            "NoModificationAllowedError" => PlatformErrorKind::NoModificationAllowed,
            "NotAllowedError" => PlatformErrorKind::NotAllowed,
            "SecurityError" => PlatformErrorKind::Security,
            "QuotaExceededError" => PlatformErrorKind::QuotaExceeded,
            "TypeError" => PlatformErrorKind::Type,
            other => PlatformErrorKind::Other(other.to_string()),
        }
    }

    /// The DOMException name for this kind
    pub fn dom_name(&self) -> &str {
        match self {
            PlatformErrorKind::NotFound => "NotFoundError",
            PlatformErrorKind::TypeMismatch => "TypeMismatchError",
            PlatformErrorKind::InvalidState => "InvalidStateError",
            PlatformErrorKind::NoModificationAllowed => "NoModificationAllowedError",
            PlatformErrorKind::NotAllowed => "NotAllowedError",
            PlatformErrorKind::Security => "SecurityError",
            PlatformErrorKind::QuotaExceeded => "QuotaExceededError",
            PlatformErrorKind::Type => "TypeError",
            PlatformErrorKind::Other(name) => name,
        }
    }
}

/// Failure surfaced by the host storage API
///
/// In the browser the thrown JS value is kept alongside, so it can be handed
/// back to script callers untouched.
#[derive(Debug, Clone)]
pub struct PlatformError {
    pub kind: PlatformErrorKind,
    pub message: String,
    #[cfg(target_arch = "wasm32")]
    js_value: Option<wasm_bindgen::JsValue>,
}

impl PlatformError {
    pub fn new(kind: PlatformErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            #[cfg(target_arch = "wasm32")]
            js_value: None,
        }
    }

    /// Attach the JS value the platform threw
    #[cfg(target_arch = "wasm32")]
    pub fn with_js_value(mut self, value: wasm_bindgen::JsValue) -> Self {
        self.js_value = Some(value);
        self
    }

    /// The JS value the platform threw, if this error came from script
    #[cfg(target_arch = "wasm32")]
    pub fn js_value(&self) -> Option<&wasm_bindgen::JsValue> {
        self.js_value.as_ref()
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorKind::NotFound, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == PlatformErrorKind::NotFound
    }
}

impl PartialEq for PlatformError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

impl Eq for PlatformError {}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.dom_name(), self.message)
    }
}

impl std::error::Error for PlatformError {}

/// Errors returned by handle resolution and sync handle upgrades
#[derive(Debug)]
pub enum OpfsError {
    /// The path decomposes to an empty file name
    InvalidPath(String),
    InvalidArgument(String),
    Platform(PlatformError),
}

impl fmt::Display for OpfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpfsError::InvalidPath(p) => write!(f, "Invalid path {}", p),
            OpfsError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            OpfsError::Platform(e) => write!(f, "Platform error: {}", e),
        }
    }
}

impl std::error::Error for OpfsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OpfsError::Platform(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PlatformError> for OpfsError {
    fn from(error: PlatformError) -> Self {
        OpfsError::Platform(error)
    }
}
