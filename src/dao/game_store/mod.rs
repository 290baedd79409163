#[cfg(feature = "file-store")]
pub mod file;
pub mod memory;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;

/// Durable key-value storage backing saved games.
///
/// Records are opaque bytes; flags are booleans stored separately. Missing
/// keys read as `None` / `false`.
pub trait GameStore: Send + Sync {
    fn read_record(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>>;
    fn write_record(&self, key: &str, payload: Vec<u8>) -> BoxFuture<'static, StorageResult<()>>;
    fn read_flag(&self, key: &str) -> BoxFuture<'static, StorageResult<bool>>;
    fn write_flag(&self, key: &str, value: bool) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
