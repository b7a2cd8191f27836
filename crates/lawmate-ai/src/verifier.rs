//! Hybrid legal-document verifier.
//!
//! Decides whether a document is a legal agreement in up to three steps:
//!
//! 1. **Structural fast path**: three or more catalog categories and section
//!    headers in the normalised text mean "legal" without a model call. The
//!    confidence comes from the legal keyword count.
//! 2. **Classifier**: otherwise the first [`CLASSIFIER_INPUT_CHARS`]
//!    characters of the normalised text go to the injected [`Classifier`].
//! 3. **Keyword tie-break**: an uncertain classifier (confidence strictly
//!    inside 0.3..0.7) is overridden to "legal" when five or more legal
//!    keywords are present.
//!
//! A failing, slow, or nonsensical classifier never blocks the caller: the
//! verdict falls back to legal at 0.5 with a [`VerificationBasis::Degraded`]
//! basis naming the cause.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lawmate_core::normalize::truncate_chars;
use lawmate_core::{
    Document, PatternCatalog, VerificationBasis, VerificationResult, keyword_confidence,
    keyword_score, structure_score,
};
use tracing::{debug, info, warn};

use crate::backend::{Classifier, LegalLabel};

/// The classifier sees at most this many characters of normalised text.
pub const CLASSIFIER_INPUT_CHARS: usize = 2000;

pub const DEFAULT_CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(30);

const UNCERTAIN_LOW: f64 = 0.3;
const UNCERTAIN_HIGH: f64 = 0.7;
const TIEBREAK_MIN_KEYWORDS: usize = 5;
const TIEBREAK_BOOST: f64 = 0.2;

/// Raw documents longer than this get a small confidence boost.
const LONG_DOCUMENT_CHARS: usize = 1500;
const LONG_DOCUMENT_BOOST: f64 = 0.1;

/// Combines the structural heuristic, keyword score, and a classifier.
pub struct HybridVerifier {
    classifier: Arc<dyn Classifier>,
    catalog: Arc<PatternCatalog>,
    timeout: Option<Duration>,
}

impl HybridVerifier {
    /// Verifier over the standard catalog with the default classifier timeout.
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            catalog: PatternCatalog::standard(),
            timeout: Some(DEFAULT_CLASSIFIER_TIMEOUT),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<PatternCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// `None` waits on the classifier indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &Arc<PatternCatalog> {
        &self.catalog
    }

    /// Produce the verdict for `doc`. Never fails; see the module docs.
    pub async fn verify(&self, doc: &Document) -> VerificationResult {
        let normalized = doc.normalized_text();

        let structure = structure_score(&self.catalog, normalized);
        debug!(
            patterns = structure.pattern_matches,
            headers = structure.header_matches,
            "structural check"
        );
        if structure.has_legal_structure() {
            let keywords = keyword_score(normalized);
            let verdict = VerificationResult::new(
                true,
                keyword_confidence(keywords),
                VerificationBasis::Structural,
            );
            info!(keywords, confidence = verdict.confidence, "legal structure detected");
            return verdict;
        }

        match self.model_check(doc, normalized).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "verification degraded, failing open");
                VerificationResult::fallback(format!("{e:#}"))
            }
        }
    }

    #[cfg(test)]
    async fn verify_text(&self, text: &str) -> VerificationResult {
        self.verify(&Document::from_text(text)).await
    }

    async fn model_check(
        &self,
        doc: &Document,
        normalized: &str,
    ) -> anyhow::Result<VerificationResult> {
        let input = truncate_chars(normalized, CLASSIFIER_INPUT_CHARS);
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.classifier.classify(input))
                .await
                .map_err(|_| anyhow::anyhow!("classifier timed out after {limit:?}"))?,
            None => self.classifier.classify(input).await,
        }
        .context("classifier call failed")?;

        let confidence = output.confidence;
        anyhow::ensure!(
            (0.0..=1.0).contains(&confidence),
            "classifier confidence {confidence} outside [0, 1]"
        );
        debug!(label = output.label.as_str(), confidence, "classifier result");

        if confidence > UNCERTAIN_LOW && confidence < UNCERTAIN_HIGH {
            let keywords = keyword_score(normalized);
            if keywords >= TIEBREAK_MIN_KEYWORDS {
                info!(keywords, confidence, "uncertain classifier overridden by keywords");
                return Ok(VerificationResult::new(
                    true,
                    (confidence + TIEBREAK_BOOST).min(1.0),
                    VerificationBasis::KeywordTiebreak,
                ));
            }
        }

        let adjusted = if doc.char_len() > LONG_DOCUMENT_CHARS {
            (confidence + LONG_DOCUMENT_BOOST).min(1.0)
        } else {
            confidence
        };

        Ok(VerificationResult::new(
            output.label == LegalLabel::Legal,
            adjusted,
            VerificationBasis::Classifier,
        ))
    }
}
