//! JavaScript exports
//!
//! Exposes handle resolution and sync access upgrade to scripts, taking and
//! returning native OPFS handle objects. Errors reject the returned promise
//! with an `Error` named after the failure (`TypeError`, `NotFoundError`, ...).

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use web_sys::{FileSystemFileHandle, FileSystemSyncAccessHandle};

use crate::error::OpfsError;
use crate::platform::web::{OpfsStorage, WebFile, platform_error_from_js};
use crate::resolve::{SyncHandleOptions, open_sync_handle, resolve_file_handle};
use crate::utils::logging::setup_logging;

fn read_field(options: &JsValue, key: &str) -> Result<Option<JsValue>, OpfsError> {
    let value = Reflect::get(options, &JsValue::from_str(key))
        .map_err(|e| OpfsError::Platform(platform_error_from_js(e)))?;
    if value.is_undefined() || value.is_null() {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

/// Read `{ path, handle, mode }` from a script object
fn options_from_js(options: &JsValue) -> Result<SyncHandleOptions<WebFile>, OpfsError> {
    if !options.is_object() {
        return Ok(SyncHandleOptions::default());
    }

    let path = read_field(options, "path")?.and_then(|v| v.as_string());
    let handle = match read_field(options, "handle")? {
        Some(value) => Some(WebFile(value.dyn_into::<FileSystemFileHandle>().map_err(
            |_| OpfsError::InvalidArgument("handle must be a FileSystemFileHandle".into()),
        )?)),
        None => None,
    };
    let mode = match read_field(options, "mode")?.and_then(|v| v.as_string()) {
        Some(mode) => Some(mode.parse()?),
        None => None,
    };

    Ok(SyncHandleOptions { path, handle, mode })
}

#[wasm_bindgen(js_name = setupLogging)]
pub fn setup_logging_js() {
    setup_logging();
}

/// Resolve `path` to a file handle, creating directories and the file
#[wasm_bindgen(js_name = getAsyncHandle)]
pub async fn get_async_handle(path: String) -> Result<FileSystemFileHandle, JsValue> {
    let file = resolve_file_handle(&OpfsStorage, &path).await?;
    Ok(file.0)
}

/// Open a sync access handle from `{ path?, handle?, mode? }`
#[wasm_bindgen(js_name = getSyncHandle)]
pub async fn get_sync_handle(options: JsValue) -> Result<FileSystemSyncAccessHandle, JsValue> {
    let options = options_from_js(&options)?;
    let session = open_sync_handle(&OpfsStorage, options).await?;
    Ok(session.0)
}
