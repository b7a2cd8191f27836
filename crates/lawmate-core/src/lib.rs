//! Core engine for Lawmate: pattern catalog, normaliser, scorers, clause
//! extraction, document ingest, and the persisted record types.

pub mod document;
pub mod extract;
pub mod normalize;
pub mod patterns;
pub mod record;
pub mod schema;
pub mod scoring;
pub mod signals;

pub use document::{Document, DocumentInput, DocumentKind, IngestError, content_hash};
pub use extract::{Extraction, MAX_CLAUSES, PatternFailure, extract_clauses};
pub use normalize::{MAX_NORMALIZED_CHARS, normalize, truncate_chars};
pub use patterns::{PatternCatalog, PatternEntry};
pub use record::{AnalysisRecord, Clause, SCHEMA_VERSION, VerificationBasis, VerificationResult};
pub use scoring::{StructureScore, keyword_confidence, keyword_score, structure_score};
pub use signals::DocumentSignals;
