//! Browser storage platform
//!
//! Binds the platform traits to the Origin Private File System through
//! `web-sys`. Sync access handles are only available in dedicated workers.

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    DomException, FileSystemDirectoryHandle, FileSystemFileHandle, FileSystemGetDirectoryOptions,
    FileSystemGetFileOptions, FileSystemReadWriteOptions, FileSystemSyncAccessHandle,
    StorageManager, WorkerGlobalScope,
};

use crate::error::{PlatformError, PlatformErrorKind};
use crate::platform::{AccessMode, DirectoryHandle, FileHandle, StorageRoot, SyncAccessHandle};

/// Largest integer a JS number represents exactly
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Convert a rejected promise or thrown value into a platform error
///
/// The thrown value itself travels with the error.
pub fn platform_error_from_js(value: JsValue) -> PlatformError {
    let error = if let Some(exception) = value.dyn_ref::<DomException>() {
        PlatformError::new(
            PlatformErrorKind::from_dom_name(&exception.name()),
            exception.message(),
        )
    } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        let name = String::from(error.name());
        PlatformError::new(
            PlatformErrorKind::from_dom_name(&name),
            String::from(error.message()),
        )
    } else {
        let message = value.as_string().unwrap_or_else(|| format!("{:?}", value));
        PlatformError::new(PlatformErrorKind::Other("Error".into()), message)
    };
    error.with_js_value(value)
}

async fn await_promise<T: JsCast>(promise: Promise) -> Result<T, PlatformError> {
    let value = JsFuture::from(promise)
        .await
        .map_err(platform_error_from_js)?;
    value.dyn_into::<T>().map_err(|value| {
        PlatformError::new(
            PlatformErrorKind::Type,
            format!("unexpected value from storage API: {:?}", value),
        )
    })
}

fn storage_manager() -> Result<StorageManager, PlatformError> {
    let global = js_sys::global();
    if let Some(window) = global.dyn_ref::<web_sys::Window>() {
        return Ok(window.navigator().storage());
    }
    if let Some(worker) = global.dyn_ref::<WorkerGlobalScope>() {
        return Ok(worker.navigator().storage());
    }
    Err(PlatformError::new(
        PlatformErrorKind::NotAllowed,
        "navigator.storage is unavailable in this global scope",
    ))
}

fn to_js_offset(value: u64) -> Result<f64, PlatformError> {
    if value > MAX_SAFE_INTEGER {
        return Err(PlatformError::new(
            PlatformErrorKind::Type,
            format!("offset {} exceeds JS MAX_SAFE_INTEGER", value),
        ));
    }
    Ok(value as f64)
}

/// The origin's private file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OpfsStorage;

#[async_trait(?Send)]
impl StorageRoot for OpfsStorage {
    type Directory = WebDirectory;

    async fn root_directory(&self) -> Result<WebDirectory, PlatformError> {
        let handle = await_promise::<FileSystemDirectoryHandle>(storage_manager()?.get_directory())
            .await?;
        Ok(WebDirectory(handle))
    }
}

#[derive(Debug, Clone)]
pub struct WebDirectory(pub FileSystemDirectoryHandle);

#[async_trait(?Send)]
impl DirectoryHandle for WebDirectory {
    type File = WebFile;

    fn name(&self) -> String {
        self.0.name()
    }

    async fn get_directory_handle(
        &self,
        name: &str,
        create: bool,
    ) -> Result<WebDirectory, PlatformError> {
        let options = FileSystemGetDirectoryOptions::new();
        options.set_create(create);
        let handle = await_promise::<FileSystemDirectoryHandle>(
            self.0.get_directory_handle_with_options(name, &options),
        )
        .await?;
        Ok(WebDirectory(handle))
    }

    async fn get_file_handle(&self, name: &str, create: bool) -> Result<WebFile, PlatformError> {
        let options = FileSystemGetFileOptions::new();
        options.set_create(create);
        let handle = await_promise::<FileSystemFileHandle>(
            self.0.get_file_handle_with_options(name, &options),
        )
        .await?;
        Ok(WebFile(handle))
    }
}

#[derive(Debug, Clone)]
pub struct WebFile(pub FileSystemFileHandle);

#[async_trait(?Send)]
impl FileHandle for WebFile {
    type SyncAccess = WebSyncAccess;

    fn name(&self) -> String {
        self.0.name()
    }

    async fn is_same_entry(&self, other: &WebFile) -> Result<bool, PlatformError> {
        let value = JsFuture::from(self.0.is_same_entry(&other.0))
            .await
            .map_err(platform_error_from_js)?;
        Ok(value.is_truthy())
    }

    async fn create_sync_access_handle(
        &self,
        mode: AccessMode,
    ) -> Result<WebSyncAccess, PlatformError> {
        // web-sys has no binding for the options argument yet
        let options = Object::new();
        Reflect::set(&options, &"mode".into(), &mode.as_str().into())
            .map_err(platform_error_from_js)?;
        let create = Reflect::get(&self.0, &"createSyncAccessHandle".into())
            .map_err(platform_error_from_js)?
            .dyn_into::<Function>()
            .map_err(|_| {
                PlatformError::new(
                    PlatformErrorKind::NotAllowed,
                    "createSyncAccessHandle is only available in dedicated workers",
                )
            })?;
        let promise = create
            .call1(&self.0, &options)
            .map_err(platform_error_from_js)?
            .dyn_into::<Promise>()
            .map_err(platform_error_from_js)?;
        let handle = await_promise::<FileSystemSyncAccessHandle>(promise).await?;
        Ok(WebSyncAccess(handle))
    }
}

#[derive(Debug, Clone)]
pub struct WebSyncAccess(pub FileSystemSyncAccessHandle);

impl WebSyncAccess {
    fn at(offset: u64) -> Result<FileSystemReadWriteOptions, PlatformError> {
        let options = FileSystemReadWriteOptions::new();
        options.set_at(to_js_offset(offset)?);
        Ok(options)
    }
}

impl SyncAccessHandle for WebSyncAccess {
    fn read_at(&self, buf: &mut [u8], at: u64) -> Result<usize, PlatformError> {
        let n = self
            .0
            .read_with_u8_array_and_options(buf, &Self::at(at)?)
            .map_err(platform_error_from_js)?;
        Ok(n as usize)
    }

    fn write_at(&self, buf: &[u8], at: u64) -> Result<usize, PlatformError> {
        let n = self
            .0
            .write_with_u8_array_and_options(buf, &Self::at(at)?)
            .map_err(platform_error_from_js)?;
        Ok(n as usize)
    }

    fn get_size(&self) -> Result<u64, PlatformError> {
        let size = self.0.get_size().map_err(platform_error_from_js)?;
        Ok(size as u64)
    }

    fn truncate(&self, size: u64) -> Result<(), PlatformError> {
        self.0
            .truncate_with_f64(to_js_offset(size)?)
            .map_err(platform_error_from_js)
    }

    fn flush(&self) -> Result<(), PlatformError> {
        self.0.flush().map_err(platform_error_from_js)
    }

    fn close(&self) -> Result<(), PlatformError> {
        self.0.close();
        Ok(())
    }
}
