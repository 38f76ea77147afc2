//! Handle resolution and sync access upgrade

use log::{debug, info};

use crate::config::OpfsConfig;
use crate::error::OpfsError;
use crate::path::parse_virtual_path;
use crate::platform::{DirectoryHandle, FileHandle, FileOf, StorageRoot, SyncAccessOf};
use crate::resolve::options::{FileTarget, SyncHandleOptions};

/// Resolve a virtual path to a file handle, creating what is missing
///
/// Directories are fetched or created left to right from the root. The file
/// is looked up without `create` first; only a not-found answer leads to its
/// creation; any other platform error is returned unchanged.
pub async fn resolve_file_handle_with<S: StorageRoot>(
    storage: &S,
    path: &str,
    config: &OpfsConfig,
) -> Result<FileOf<S>, OpfsError> {
    let virtual_path = parse_virtual_path(path, &config.path_prefix)?;

    let mut dir = storage.root_directory().await?;
    for folder in &virtual_path.directories {
        debug!("Entering directory '{}' for {}", folder, path);
        dir = dir.get_directory_handle(folder, true).await?;
    }

    match dir.get_file_handle(&virtual_path.file_name, false).await {
        Ok(handle) => Ok(handle),
        Err(e) if e.is_not_found() => {
            info!("File {} does not exist yet, creating", path);
            Ok(dir.get_file_handle(&virtual_path.file_name, true).await?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Open a sync access session for a path or an already-resolved handle
///
/// A supplied handle is used as is; otherwise the path is resolved first.
/// Platform errors, such as a conflicting session, are passed through.
pub async fn open_sync_handle_with<S: StorageRoot>(
    storage: &S,
    options: SyncHandleOptions<FileOf<S>>,
    config: &OpfsConfig,
) -> Result<SyncAccessOf<S>, OpfsError> {
    let (target, mode) = options.validate(config.default_access_mode)?;

    let handle = match target {
        FileTarget::Handle(handle) => handle,
        FileTarget::Path(path) => resolve_file_handle_with(storage, &path, config).await?,
    };

    debug!("Requesting {} sync access handle for {}", mode, handle.name());
    Ok(handle.create_sync_access_handle(mode).await?)
}

/// [`resolve_file_handle_with`] using the default configuration
pub async fn resolve_file_handle<S: StorageRoot>(
    storage: &S,
    path: &str,
) -> Result<FileOf<S>, OpfsError> {
    resolve_file_handle_with(storage, path, &OpfsConfig::default()).await
}

/// [`open_sync_handle_with`] using the default configuration
pub async fn open_sync_handle<S: StorageRoot>(
    storage: &S,
    options: SyncHandleOptions<FileOf<S>>,
) -> Result<SyncAccessOf<S>, OpfsError> {
    open_sync_handle_with(storage, options, &OpfsConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformErrorKind;
    use crate::platform::AccessMode;
    use crate::platform::SyncAccessHandle;
    use crate::platform::memory::{EntryKind, MemoryStorage, StorageOp};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[tokio::test]
    async fn test_nested_path_creates_directories_in_order() {
        init_logger();
        let storage = MemoryStorage::new();
        let file = resolve_file_handle(&storage, "a/b/c.txt").await.unwrap();
        assert_eq!(file.path(), "a/b/c.txt");
        assert_eq!(
            storage.journal(),
            vec![
                StorageOp::GetRoot,
                StorageOp::GetDirectory {
                    path: "a".into(),
                    create: true
                },
                StorageOp::GetDirectory {
                    path: "a/b".into(),
                    create: true
                },
                StorageOp::GetFile {
                    path: "a/b/c.txt".into(),
                    create: false
                },
                StorageOp::GetFile {
                    path: "a/b/c.txt".into(),
                    create: true
                },
            ]
        );
        assert_eq!(storage.entry_kind("a/b"), Some(EntryKind::Directory));
        assert_eq!(storage.entry_kind("a/b/c.txt"), Some(EntryKind::File));
    }

    #[tokio::test]
    async fn test_existing_file_is_not_recreated() {
        init_logger();
        let storage = MemoryStorage::new();
        let first = resolve_file_handle(&storage, "dir/x.db").await.unwrap();
        storage.clear_journal();

        let second = resolve_file_handle(&storage, "dir\\x.db").await.unwrap();
        assert!(first.is_same_entry(&second).await.unwrap());
        assert!(!storage.journal().contains(&StorageOp::GetFile {
            path: "dir/x.db".into(),
            create: true
        }));
        assert_eq!(storage.list("dir").unwrap(), vec!["x.db"]);
    }

    #[tokio::test]
    async fn test_invalid_path_touches_nothing() {
        let storage = MemoryStorage::new();
        let err = resolve_file_handle(&storage, "a/b/").await.unwrap_err();
        assert!(matches!(err, OpfsError::InvalidPath(ref p) if p == "a/b/"));
        assert!(storage.journal().is_empty());
        assert_eq!(storage.list("").unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_other_platform_errors_pass_through() {
        let storage = MemoryStorage::new();
        resolve_file_handle(&storage, "a/b/c.txt").await.unwrap();

        let err = resolve_file_handle(&storage, "a/b").await.unwrap_err();
        match err {
            OpfsError::Platform(e) => assert_eq!(e.kind, PlatformErrorKind::TypeMismatch),
            other => panic!("unexpected error: {other}"),
        }

        let err = resolve_file_handle(&storage, "a//c.txt").await.unwrap_err();
        match err {
            OpfsError::Platform(e) => assert_eq!(e.kind, PlatformErrorKind::Type),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_handle_upgrade_skips_resolution() {
        let storage = MemoryStorage::new();
        let file = resolve_file_handle(&storage, "x.db").await.unwrap();
        storage.clear_journal();

        let session = open_sync_handle(&storage, SyncHandleOptions::from_handle(file))
            .await
            .unwrap();
        assert_eq!(session.mode(), AccessMode::ReadWriteUnsafe);
        assert_eq!(
            storage.journal(),
            vec![StorageOp::CreateSyncAccess {
                path: "x.db".into(),
                mode: AccessMode::ReadWriteUnsafe
            }]
        );
    }

    #[tokio::test]
    async fn test_handle_wins_over_path() {
        let storage = MemoryStorage::new();
        let file = resolve_file_handle(&storage, "kept.db").await.unwrap();
        storage.clear_journal();

        let mut options = SyncHandleOptions::from_handle(file);
        options.path = Some("other/ignored.db".into());
        open_sync_handle(&storage, options).await.unwrap();

        let journal = storage.journal();
        assert!(!journal.contains(&StorageOp::GetRoot));
        assert_eq!(
            journal,
            vec![StorageOp::CreateSyncAccess {
                path: "kept.db".into(),
                mode: AccessMode::ReadWriteUnsafe
            }]
        );
        assert_eq!(storage.entry_kind("other"), None);
    }

    #[tokio::test]
    async fn test_missing_target_is_invalid_argument() {
        let storage = MemoryStorage::new();
        let err = open_sync_handle(&storage, SyncHandleOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OpfsError::InvalidArgument(_)));
        assert!(storage.journal().is_empty());
    }

    #[tokio::test]
    async fn test_requested_mode_is_honoured() {
        let storage = MemoryStorage::new();
        let session = open_sync_handle(
            &storage,
            SyncHandleOptions::from_path("opfs://db/main.db").with_mode(AccessMode::ReadWrite),
        )
        .await
        .unwrap();
        assert_eq!(session.mode(), AccessMode::ReadWrite);

        let err = open_sync_handle(&storage, SyncHandleOptions::from_path("db/main.db"))
            .await
            .unwrap_err();
        match err {
            OpfsError::Platform(e) => {
                assert_eq!(e.kind, PlatformErrorKind::NoModificationAllowed)
            }
            other => panic!("unexpected error: {other}"),
        }

        session.close().unwrap();
        assert!(
            open_sync_handle(&storage, SyncHandleOptions::from_path("db/main.db"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_configured_prefix_and_mode() {
        let storage = MemoryStorage::new();
        let config = OpfsConfig {
            path_prefix: "duckdb://".into(),
            default_access_mode: AccessMode::ReadOnly,
        };
        let session = open_sync_handle_with(
            &storage,
            SyncHandleOptions::from_path("duckdb://main.db"),
            &config,
        )
        .await
        .unwrap();
        assert_eq!(session.mode(), AccessMode::ReadOnly);
        assert_eq!(storage.entry_kind("main.db"), Some(EntryKind::File));
    }
}
