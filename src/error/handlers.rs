//! Error handlers
//!
//! JS-facing naming for crate errors.

use crate::error::types::OpfsError;

/// Name of the JS error a script caller observes for this error
pub fn error_to_dom_name(err: &OpfsError) -> &str {
    match err {
        OpfsError::InvalidPath(_) => "TypeError",
        OpfsError::InvalidArgument(_) => "TypeError",
        OpfsError::Platform(e) => e.kind.dom_name(),
    }
}

/// Platform failures raised by script are rethrown as the original value
#[cfg(target_arch = "wasm32")]
impl From<OpfsError> for wasm_bindgen::JsValue {
    fn from(err: OpfsError) -> Self {
        if let OpfsError::Platform(e) = &err {
            if let Some(value) = e.js_value() {
                return value.clone();
            }
        }
        let js_err = js_sys::Error::new(&err.to_string());
        js_err.set_name(error_to_dom_name(&err));
        js_err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PlatformError, PlatformErrorKind};

    #[test]
    fn test_error_to_dom_name() {
        assert_eq!(
            error_to_dom_name(&OpfsError::InvalidPath("x/".into())),
            "TypeError"
        );
        assert_eq!(
            error_to_dom_name(&OpfsError::InvalidArgument("none".into())),
            "TypeError"
        );
        let err = OpfsError::Platform(PlatformError::new(
            PlatformErrorKind::QuotaExceeded,
            "full",
        ));
        assert_eq!(error_to_dom_name(&err), "QuotaExceededError");
    }
}
