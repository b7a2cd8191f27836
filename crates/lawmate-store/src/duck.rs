//! DuckDB-backed analysis store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use arrow::record_batch::RecordBatch;
use duckdb::{Connection, params};
use lawmate_core::AnalysisRecord;
use lawmate_core::schema::analyses::TABLE;
use tracing::{debug, info};

use crate::batch::records_from_batches;
use crate::{RecordStore, StoreError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS analyses (
    content_hash VARCHAR PRIMARY KEY,
    is_legal INTEGER NOT NULL,
    confidence DOUBLE NOT NULL,
    summary VARCHAR,
    num_clauses INTEGER NOT NULL DEFAULT 0,
    clauses VARCHAR,
    schema_version VARCHAR,
    created_at TIMESTAMP NOT NULL DEFAULT current_timestamp
)";

/// Columns added after the first release. Applied in place on open.
const MIGRATIONS: &[&str] = &[
    "ALTER TABLE analyses ADD COLUMN IF NOT EXISTS num_clauses INTEGER DEFAULT 0",
    "ALTER TABLE analyses ADD COLUMN IF NOT EXISTS clauses VARCHAR",
    "ALTER TABLE analyses ADD COLUMN IF NOT EXISTS schema_version VARCHAR DEFAULT '1.0'",
];

const UPSERT: &str = "INSERT INTO analyses
    (content_hash, is_legal, confidence, summary, num_clauses, clauses, schema_version, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, epoch_ms(?::BIGINT))
    ON CONFLICT (content_hash) DO UPDATE SET
        is_legal = excluded.is_legal,
        confidence = excluded.confidence,
        summary = excluded.summary,
        num_clauses = excluded.num_clauses,
        clauses = excluded.clauses,
        schema_version = excluded.schema_version,
        created_at = excluded.created_at";

/// History projection, cast to [`lawmate_core::schema::analyses::history_schema`].
const SELECT_HISTORY: &str = "SELECT
    content_hash,
    CAST(is_legal AS INTEGER) AS is_legal,
    CAST(confidence AS DOUBLE) AS confidence,
    summary,
    CAST(coalesce(num_clauses, 0) AS BIGINT) AS num_clauses,
    clauses,
    schema_version,
    epoch_ms(created_at) AS created_at
    FROM analyses";

/// DuckDB store holding the `analyses` table.
///
/// Supports both in-memory (ephemeral) and persistent (file-backed) modes.
/// The schema is created, or brought up to date, on open.
pub struct DuckStore {
    conn: Mutex<Connection>,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let store = Self::init(Connection::open(path)?)?;
        info!(path = %path.display(), count = store.count()?, "opened analysis store");
        Ok(store)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Other("duckdb connection lock poisoned".into()))
    }

    /// Create the table if absent and add any columns an older table lacks.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute_batch(CREATE_TABLE)?;
        for sql in MIGRATIONS {
            conn.execute_batch(sql)?;
        }
        debug!(table = TABLE, "schema ready");
        Ok(())
    }

    /// The most recent `limit` rows as Arrow batches in history schema order.
    pub fn recent_batches(&self, limit: usize) -> Result<Vec<RecordBatch>, StoreError> {
        let sql = format!("{SELECT_HISTORY} ORDER BY created_at DESC, content_hash LIMIT ?");
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow(params![limit as i64])?.collect();
        Ok(batches)
    }

    /// Execute arbitrary SQL and return Arrow RecordBatches.
    pub fn query_arrow(&self, sql: &str) -> Result<Vec<RecordBatch>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        Ok(batches)
    }
}

impl RecordStore for DuckStore {
    fn upsert(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        let clauses = record.clauses_json()?;
        let conn = self.conn()?;
        conn.execute(
            UPSERT,
            params![
                record.content_hash,
                i32::from(record.is_legal),
                record.confidence,
                record.summary,
                record.num_clauses() as i32,
                clauses,
                record.schema_version,
                record.created_at.timestamp_millis(),
            ],
        )?;
        info!(
            hash = %record.content_hash,
            is_legal = record.is_legal,
            clauses = record.num_clauses(),
            "stored analysis"
        );
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, StoreError> {
        records_from_batches(&self.recent_batches(limit)?)
    }

    fn get(&self, content_hash: &str) -> Result<Option<AnalysisRecord>, StoreError> {
        let sql = format!("{SELECT_HISTORY} WHERE content_hash = ?");
        let batches: Vec<RecordBatch> = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_arrow([content_hash])?.collect()
        };
        Ok(records_from_batches(&batches)?.into_iter().next())
    }

    fn count(&self) -> Result<usize, StoreError> {
        let batches = self.query_arrow("SELECT count(*)::BIGINT AS cnt FROM analyses")?;
        let batch = batches.first().ok_or(StoreError::NoResults)?;
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<arrow::array::Int64Array>()
            .ok_or_else(|| StoreError::Other("count column not i64".into()))?;
        Ok(col.value(0) as usize)
    }
}
