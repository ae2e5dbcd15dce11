use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::CacheError;
use super::types::EnrichmentRecord;
use super::RecordStore;

/// In-memory store used in tests and when persistence is not configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, EnrichmentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert(&self, record: EnrichmentRecord) -> Result<(), CacheError> {
        self.records.write().insert(record.upc.clone(), record);
        Ok(())
    }

    async fn get(&self, upc: &str) -> Result<Option<EnrichmentRecord>, CacheError> {
        Ok(self.records.read().get(upc).cloned())
    }

    async fn get_all(&self) -> Result<Vec<EnrichmentRecord>, CacheError> {
        let mut records: Vec<EnrichmentRecord> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| a.upc.cmp(&b.upc));
        Ok(records)
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let mut records = self.records.write();
        let removed = records.len();
        records.clear();
        Ok(removed)
    }
}
