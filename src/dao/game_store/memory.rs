//! In-process store used by tests and throwaway sessions.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{game_store::GameStore, storage::StorageResult};

/// [`GameStore`] kept entirely in memory. Clones share the same maps.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    records: Arc<DashMap<String, Vec<u8>>>,
    flags: Arc<DashMap<String, bool>>,
}

impl MemoryGameStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryGameStore {
    fn read_record(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>> {
        let value = self.records.get(key).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(value) })
    }

    fn write_record(&self, key: &str, payload: Vec<u8>) -> BoxFuture<'static, StorageResult<()>> {
        self.records.insert(key.to_string(), payload);
        Box::pin(async { Ok(()) })
    }

    fn read_flag(&self, key: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let value = self.flags.get(key).map(|entry| *entry.value()).unwrap_or(false);
        Box::pin(async move { Ok(value) })
    }

    fn write_flag(&self, key: &str, value: bool) -> BoxFuture<'static, StorageResult<()>> {
        self.flags.insert(key.to_string(), value);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
