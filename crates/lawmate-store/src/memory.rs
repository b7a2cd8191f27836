use std::collections::HashMap;
use std::sync::Mutex;

use lawmate_core::AnalysisRecord;

use crate::{RecordStore, StoreError};

/// Process-local store. Used when no database is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, AnalysisRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, AnalysisRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Other("memory store lock poisoned".into()))
    }
}

impl RecordStore for MemoryStore {
    fn upsert(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        self.lock()?
            .insert(record.content_hash.clone(), record.clone());
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StoreError> {
        let mut records: Vec<AnalysisRecord> = self.lock()?.values().cloned().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.content_hash.cmp(&b.content_hash))
        });
        records.truncate(limit);
        Ok(records)
    }

    fn get(&self, content_hash: &str) -> Result<Option<AnalysisRecord>, StoreError> {
        Ok(self.lock()?.get(content_hash).cloned())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }
}
