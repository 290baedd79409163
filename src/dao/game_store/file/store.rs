use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::fs;
use tracing::debug;

use crate::dao::{
    game_store::GameStore,
    storage::{StorageError, StorageResult},
};

use super::{
    config::FileStoreConfig,
    error::{FileDaoError, FileResult},
};

const RECORD_EXTENSION: &str = "json";
const FLAG_EXTENSION: &str = "flag";

/// [`GameStore`] writing one file per key inside a data directory.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so readers never observe a half-written record.
#[derive(Clone)]
pub struct FileGameStore {
    root: Arc<Path>,
}

impl FileGameStore {
    /// Open the store, creating the data directory when needed.
    pub async fn open(config: FileStoreConfig) -> FileResult<Self> {
        fs::create_dir_all(&config.root)
            .await
            .map_err(|source| FileDaoError::CreateDir {
                path: config.root.clone(),
                source,
            })?;

        debug!(root = %config.root.display(), "file store ready");
        Ok(Self {
            root: Arc::from(config.root),
        })
    }

    fn path_for(&self, key: &str, extension: &str) -> FileResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(FileDaoError::InvalidKey {
                key: key.to_string(),
            });
        }

        Ok(self.root.join(format!("{key}.{extension}")))
    }

    async fn read_optional(path: &Path) -> FileResult<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FileDaoError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    async fn write_atomic(path: &Path, bytes: &[u8]) -> FileResult<()> {
        let mut temporary = path.as_os_str().to_owned();
        temporary.push(".tmp");
        let temporary = PathBuf::from(temporary);

        fs::write(&temporary, bytes)
            .await
            .map_err(|source| FileDaoError::Write {
                path: temporary.clone(),
                source,
            })?;

        fs::rename(&temporary, path)
            .await
            .map_err(|source| FileDaoError::Rename {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl GameStore for FileGameStore {
    fn read_record(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>> {
        let path = self.path_for(key, RECORD_EXTENSION);
        Box::pin(async move {
            let path = path?;
            Self::read_optional(&path).await.map_err(StorageError::from)
        })
    }

    fn write_record(&self, key: &str, payload: Vec<u8>) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path_for(key, RECORD_EXTENSION);
        Box::pin(async move {
            let path = path?;
            Self::write_atomic(&path, &payload).await.map_err(StorageError::from)
        })
    }

    fn read_flag(&self, key: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let path = self.path_for(key, FLAG_EXTENSION);
        Box::pin(async move {
            let path = path?;
            let Some(bytes) = Self::read_optional(&path).await? else {
                return Ok(false);
            };
            serde_json::from_slice::<bool>(&bytes)
                .map_err(|source| StorageError::from(FileDaoError::DecodeFlag { path, source }))
        })
    }

    fn write_flag(&self, key: &str, value: bool) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path_for(key, FLAG_EXTENSION);
        Box::pin(async move {
            let path = path?;
            let bytes = if value { b"true".as_slice() } else { b"false".as_slice() };
            Self::write_atomic(&path, bytes).await.map_err(StorageError::from)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let root = self.root.clone();
        Box::pin(async move {
            fs::metadata(&root)
                .await
                .map(|_| ())
                .map_err(|source| {
                    StorageError::from(FileDaoError::Read {
                        path: root.to_path_buf(),
                        source,
                    })
                })
        })
    }
}
