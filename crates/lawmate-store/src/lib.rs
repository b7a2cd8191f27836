//! Storage layer: the `analyses` table, keyed by document content hash.

mod batch;
mod error;
mod memory;

pub use batch::records_from_batches;
pub use error::StoreError;
pub use memory::MemoryStore;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;

use lawmate_core::AnalysisRecord;

/// Persistent home for analysis records.
///
/// `upsert` must be a single atomic insert-or-replace keyed by
/// `content_hash`; storing the same hash twice leaves one row.
pub trait RecordStore: Send + Sync {
    fn upsert(&self, record: &AnalysisRecord) -> Result<(), StoreError>;

    /// The most recent `limit` records, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StoreError>;

    fn get(&self, content_hash: &str) -> Result<Option<AnalysisRecord>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}
