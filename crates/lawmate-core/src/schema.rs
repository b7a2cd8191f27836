/// Arrow schema definitions for stored analyses.
pub mod analyses {
    use arrow::datatypes::{DataType, Field, Schema};

    /// Table name used by every store backend.
    pub const TABLE: &str = "analyses";

    /// Column order of history reads. `created_at` is milliseconds since the
    /// Unix epoch (UTC) so it survives any backend's timestamp encoding.
    pub const HISTORY_COLUMNS: &[&str] = &[
        "content_hash",
        "is_legal",
        "confidence",
        "summary",
        "num_clauses",
        "clauses",
        "schema_version",
        "created_at",
    ];

    /// Schema of the record batches returned by history queries.
    pub fn history_schema() -> Schema {
        Schema::new(vec![
            Field::new("content_hash", DataType::Utf8, false),
            Field::new("is_legal", DataType::Int32, false),
            Field::new("confidence", DataType::Float64, false),
            Field::new("summary", DataType::Utf8, true),
            Field::new("num_clauses", DataType::Int64, false),
            Field::new("clauses", DataType::Utf8, true),
            Field::new("schema_version", DataType::Utf8, true),
            Field::new("created_at", DataType::Int64, false),
        ])
    }
}
