//! Verdicts, clauses, and the persisted analysis record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version tag written with every record so older rows can be told apart.
pub const SCHEMA_VERSION: &str = "2.0";

/// A span of document text matched by one catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub text: String,
    pub category: String,
}

impl Clause {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Category rendered for people: `GOVERNING_LAW` → `Governing Law`.
    pub fn category_title(&self) -> String {
        self.category
            .split(['_', '-'])
            .filter(|w| !w.is_empty())
            .map(|w| {
                let lower = w.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Which branch of the verifier produced a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationBasis {
    /// Enough catalog and header matches; the classifier was not called.
    Structural,
    /// The classifier's own label and (possibly boosted) confidence.
    Classifier,
    /// Classifier was uncertain and the keyword count overrode it.
    KeywordTiebreak,
    /// Something failed and the fail-open fallback was returned.
    Degraded { reason: String },
}

impl VerificationBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Classifier => "classifier",
            Self::KeywordTiebreak => "keyword_tiebreak",
            Self::Degraded { .. } => "degraded",
        }
    }
}

/// Final legality verdict for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_legal: bool,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub basis: VerificationBasis,
}

impl VerificationResult {
    /// Confidence returned when verification could not complete.
    pub const FALLBACK_CONFIDENCE: f64 = 0.5;

    pub fn new(is_legal: bool, confidence: f64, basis: VerificationBasis) -> Self {
        Self {
            is_legal,
            confidence: confidence.clamp(0.0, 1.0),
            basis,
        }
    }

    /// The fail-open verdict: legal with medium confidence.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self::new(
            true,
            Self::FALLBACK_CONFIDENCE,
            VerificationBasis::Degraded {
                reason: reason.into(),
            },
        )
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.basis, VerificationBasis::Degraded { .. })
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match &self.basis {
            VerificationBasis::Degraded { reason } => Some(reason),
            _ => None,
        }
    }
}

/// One stored analysis, keyed by the SHA-256 of the input bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub content_hash: String,
    pub is_legal: bool,
    pub confidence: f64,
    pub summary: String,
    pub clauses: Vec<Clause>,
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Build a record stamped with the current time and [`SCHEMA_VERSION`].
    pub fn new(
        content_hash: impl Into<String>,
        verdict: &VerificationResult,
        summary: impl Into<String>,
        clauses: Vec<Clause>,
    ) -> Self {
        Self {
            content_hash: content_hash.into(),
            is_legal: verdict.is_legal,
            confidence: verdict.confidence,
            summary: summary.into(),
            clauses,
            schema_version: SCHEMA_VERSION.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Clauses as the JSON array stored in the `clauses` column.
    pub fn clauses_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.clauses)
    }

    /// Parse the `clauses` column back into clauses. Empty text means none.
    pub fn parse_clauses(json: &str) -> serde_json::Result<Vec<Clause>> {
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_title_formats_labels() {
        assert_eq!(Clause::new("x", "GOVERNING_LAW").category_title(), "Governing Law");
        assert_eq!(
            Clause::new("x", "NON-CIRCUMVENTION").category_title(),
            "Non Circumvention"
        );
        assert_eq!(Clause::new("x", "TAX").category_title(), "Tax");
    }

    #[test]
    fn fallback_is_legal_medium_and_degraded() {
        let v = VerificationResult::fallback("classifier offline");
        assert!(v.is_legal);
        assert_eq!(v.confidence, 0.5);
        assert!(v.is_degraded());
        assert_eq!(v.degraded_reason(), Some("classifier offline"));
        assert_eq!(v.basis.as_str(), "degraded");
    }

    #[test]
    fn confidence_is_clamped() {
        let v = VerificationResult::new(true, 1.3, VerificationBasis::Classifier);
        assert_eq!(v.confidence, 1.0);
        let v = VerificationResult::new(false, -0.2, VerificationBasis::Classifier);
        assert_eq!(v.confidence, 0.0);
    }

    #[test]
    fn record_copies_verdict_and_version() {
        let verdict = VerificationResult::new(true, 0.8, VerificationBasis::Structural);
        let record = AnalysisRecord::new(
            "abc",
            &verdict,
            "A short summary.",
            vec![Clause::new("shall pay", "OBLIGATION")],
        );
        assert!(record.is_legal);
        assert_eq!(record.confidence, 0.8);
        assert_eq!(record.schema_version, SCHEMA_VERSION);
        assert_eq!(record.num_clauses(), 1);
    }

    #[test]
    fn clauses_column_preserves_order() {
        let verdict = VerificationResult::new(true, 0.8, VerificationBasis::Structural);
        let record = AnalysisRecord::new(
            "abc",
            &verdict,
            "",
            vec![
                Clause::new("shall deliver", "OBLIGATION"),
                Clause::new("governed by the laws of Delaware", "GOVERNING_LAW"),
            ],
        );
        let json = record.clauses_json().unwrap();
        let parsed = AnalysisRecord::parse_clauses(&json).unwrap();
        assert_eq!(parsed, record.clauses);
    }

    #[test]
    fn empty_clauses_column_parses_to_nothing() {
        assert!(AnalysisRecord::parse_clauses("").unwrap().is_empty());
        assert!(AnalysisRecord::parse_clauses("[]").unwrap().is_empty());
    }
}
