use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SCORE_KEEPER_DATA_DIR";

/// Runtime configuration describing where saved games live on disk.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    pub root: PathBuf,
}

impl FileStoreConfig {
    /// Construct a configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use the directory named by [`DATA_DIR_ENV`] when set and non-empty,
    /// `fallback` otherwise.
    pub fn from_env_or(fallback: impl Into<PathBuf>) -> Self {
        let root = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| fallback.into());
        Self::new(root)
    }
}
