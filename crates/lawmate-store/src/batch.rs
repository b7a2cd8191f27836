//! Decoding Arrow history batches into analysis records.

use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use lawmate_core::AnalysisRecord;

use crate::StoreError;

/// Rows written before the version column existed.
const LEGACY_SCHEMA_VERSION: &str = "1.0";

/// Decode history batches back into records.
pub fn records_from_batches(batches: &[RecordBatch]) -> Result<Vec<AnalysisRecord>, StoreError> {
    let mut records = Vec::new();
    for batch in batches {
        let col = |name: &str| {
            batch
                .column_by_name(name)
                .ok_or_else(|| StoreError::Other(format!("missing column {name}")))
        };
        let hash = col("content_hash")?;
        let is_legal = col("is_legal")?;
        let confidence = col("confidence")?;
        let summary = col("summary")?;
        let clauses = col("clauses")?;
        let version = col("schema_version")?;
        let created_at = col("created_at")?;

        for row in 0..batch.num_rows() {
            let content_hash = get_string(hash.as_ref(), row)
                .ok_or_else(|| StoreError::Other(format!("row {row}: null content_hash")))?;
            let millis = get_i64(created_at.as_ref(), row)
                .ok_or_else(|| StoreError::Other(format!("row {row}: null created_at")))?;
            let created_at = DateTime::<Utc>::from_timestamp_millis(millis)
                .ok_or_else(|| StoreError::Other(format!("row {row}: bad timestamp {millis}")))?;
            let clauses = match get_string(clauses.as_ref(), row) {
                Some(json) => AnalysisRecord::parse_clauses(&json)?,
                None => Vec::new(),
            };

            records.push(AnalysisRecord {
                content_hash,
                is_legal: get_i64(is_legal.as_ref(), row).unwrap_or(0) != 0,
                confidence: get_f64(confidence.as_ref(), row).unwrap_or(0.0),
                summary: get_string(summary.as_ref(), row).unwrap_or_default(),
                clauses,
                schema_version: get_string(version.as_ref(), row)
                    .unwrap_or_else(|| LEGACY_SCHEMA_VERSION.to_string()),
                created_at,
            });
        }
    }
    Ok(records)
}

fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}

fn get_i64(col: &dyn Array, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<Int64Array>()
        .map(|arr| arr.value(row))
        .or_else(|| {
            col.as_any()
                .downcast_ref::<Int32Array>()
                .map(|arr| i64::from(arr.value(row)))
        })
}

fn get_f64(col: &dyn Array, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<Float64Array>()
        .map(|arr| arr.value(row))
        .or_else(|| {
            col.as_any()
                .downcast_ref::<Float32Array>()
                .map(|arr| f64::from(arr.value(row)))
        })
}
