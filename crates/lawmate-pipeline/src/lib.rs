//! End-to-end document analysis: ingest, length gate, verification,
//! summary, clause extraction, and persistence.

mod analyzer;
mod error;

pub use analyzer::{Analysis, Analyzer, MIN_ANALYSIS_CHARS, PipelineConfig, SUMMARY_UNAVAILABLE};
pub use error::{AnalysisError, AnalysisWarning, Stage};
pub use tokio_util::sync::CancellationToken;
