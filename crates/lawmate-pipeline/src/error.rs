use std::fmt;

use lawmate_core::{IngestError, PatternFailure};
use serde::Serialize;
use thiserror::Error;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ingest,
    LengthCheck,
    Verify,
    Summarize,
    Extract,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::LengthCheck => "length_check",
            Self::Verify => "verify",
            Self::Summarize => "summarize",
            Self::Extract => "extract",
            Self::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons an analysis stops without a result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("could not extract text: {0}")]
    Extraction(#[from] IngestError),

    #[error("document too short for analysis ({chars} characters, need {min})")]
    ShortDocument { chars: usize, min: usize },

    #[error("analysis cancelled after {stage}")]
    Cancelled { stage: Stage },
}

/// Recovered problems. The analysis still completes and reports them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    #[error("verification degraded, document assumed legal: {reason}")]
    VerificationDegraded { reason: String },

    #[error("summary unavailable: {reason}")]
    SummaryDegraded { reason: String },

    #[error("clause category {category} skipped: {reason}")]
    PatternFailure { category: String, reason: String },

    #[error("analysis not saved: {reason}")]
    PersistenceWarning { reason: String },
}

impl From<PatternFailure> for AnalysisWarning {
    fn from(failure: PatternFailure) -> Self {
        Self::PatternFailure {
            category: failure.category,
            reason: failure.reason,
        }
    }
}
