use std::sync::Arc;
use std::time::Duration;

use lawmate_ai::{
    Classifier, DEFAULT_CLASSIFIER_TIMEOUT, DEFAULT_SUMMARIZER_TIMEOUT, HybridVerifier, Summarizer,
    summarize,
};
use lawmate_core::{
    AnalysisRecord, Clause, Document, DocumentInput, PatternCatalog, VerificationResult,
    extract_clauses,
};
use lawmate_store::RecordStore;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{AnalysisError, AnalysisWarning, Stage};

/// Documents shorter than this (in characters) are rejected before verification.
pub const MIN_ANALYSIS_CHARS: usize = 100;

/// Summary text used when the summarizer fails.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// `None` waits indefinitely.
    pub classifier_timeout: Option<Duration>,
    pub summarizer_timeout: Option<Duration>,
    pub min_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classifier_timeout: Some(DEFAULT_CLASSIFIER_TIMEOUT),
            summarizer_timeout: Some(DEFAULT_SUMMARIZER_TIMEOUT),
            min_chars: MIN_ANALYSIS_CHARS,
        }
    }
}

/// Outcome of one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub content_hash: String,
    pub kind: &'static str,
    pub chars: usize,
    pub verdict: VerificationResult,
    /// `None` for non-legal documents.
    pub summary: Option<String>,
    pub clauses: Vec<Clause>,
    pub warnings: Vec<AnalysisWarning>,
    pub persisted: bool,
}

impl Analysis {
    pub fn is_legal(&self) -> bool {
        self.verdict.is_legal
    }
}

/// Where legal analyses are saved.
enum Persistence {
    Disabled,
    Store(Arc<dyn RecordStore>),
    /// Saving was requested but the store could not be opened.
    Unavailable(String),
}

/// Runs documents through the analysis stages. Shareable across tasks.
pub struct Analyzer {
    verifier: HybridVerifier,
    summarizer: Arc<dyn Summarizer>,
    persistence: Persistence,
    catalog: Arc<PatternCatalog>,
    config: PipelineConfig,
}

impl Analyzer {
    pub fn new(classifier: Arc<dyn Classifier>, summarizer: Arc<dyn Summarizer>) -> Self {
        let catalog = PatternCatalog::standard();
        Self {
            verifier: HybridVerifier::new(classifier).with_catalog(catalog.clone()),
            summarizer,
            persistence: Persistence::Disabled,
            catalog,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.persistence = Persistence::Store(store);
        self
    }

    /// Record that the store could not be opened. Legal analyses then carry
    /// a [`AnalysisWarning::PersistenceWarning`] with `reason`.
    pub fn with_store_unavailable(mut self, reason: impl Into<String>) -> Self {
        self.persistence = Persistence::Unavailable(reason.into());
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<PatternCatalog>) -> Self {
        self.verifier = self.verifier.with_catalog(catalog.clone());
        self.catalog = catalog;
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.verifier = self.verifier.with_timeout(config.classifier_timeout);
        self.config = config;
        self
    }

    pub fn verifier(&self) -> &HybridVerifier {
        &self.verifier
    }

    pub fn catalog(&self) -> &Arc<PatternCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn analyze(&self, input: &DocumentInput) -> Result<Analysis, AnalysisError> {
        self.analyze_with_cancel(input, &CancellationToken::new())
            .await
    }

    /// Run every stage in order, checking `cancel` between stages and while
    /// waiting on the classifier or summarizer.
    pub async fn analyze_with_cancel(
        &self,
        input: &DocumentInput,
        cancel: &CancellationToken,
    ) -> Result<Analysis, AnalysisError> {
        let doc = Document::ingest(input)?;
        checkpoint(cancel, Stage::Ingest)?;

        let chars = doc.char_len();
        if chars < self.config.min_chars {
            info!(chars, min = self.config.min_chars, "document too short");
            return Err(AnalysisError::ShortDocument {
                chars,
                min: self.config.min_chars,
            });
        }
        checkpoint(cancel, Stage::LengthCheck)?;

        let verdict = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(Stage::LengthCheck)),
            verdict = self.verifier.verify(&doc) => verdict,
        };
        checkpoint(cancel, Stage::Verify)?;

        let mut warnings = Vec::new();
        if let Some(reason) = verdict.degraded_reason() {
            warnings.push(AnalysisWarning::VerificationDegraded {
                reason: reason.to_string(),
            });
        }

        let mut analysis = Analysis {
            content_hash: doc.content_hash().to_string(),
            kind: doc.kind().as_str(),
            chars,
            verdict,
            summary: None,
            clauses: Vec::new(),
            warnings,
            persisted: false,
        };

        if !analysis.verdict.is_legal {
            info!(
                hash = %analysis.content_hash,
                confidence = analysis.verdict.confidence,
                "document is not a legal agreement"
            );
            return Ok(analysis);
        }

        let summary = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(Stage::Verify)),
            summary = summarize(
                self.summarizer.as_ref(),
                doc.raw_text(),
                self.config.summarizer_timeout,
            ) => summary,
        };
        let summary = summary.unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "summary degraded");
            analysis.warnings.push(AnalysisWarning::SummaryDegraded {
                reason: format!("{e:#}"),
            });
            SUMMARY_UNAVAILABLE.to_string()
        });
        checkpoint(cancel, Stage::Summarize)?;

        let extraction = extract_clauses(&self.catalog, doc.raw_text());
        analysis
            .warnings
            .extend(extraction.failures.into_iter().map(AnalysisWarning::from));
        analysis.clauses = extraction.clauses;
        analysis.summary = Some(summary);
        checkpoint(cancel, Stage::Extract)?;

        match &self.persistence {
            Persistence::Disabled => {}
            Persistence::Unavailable(reason) => {
                analysis.warnings.push(AnalysisWarning::PersistenceWarning {
                    reason: reason.clone(),
                });
            }
            Persistence::Store(store) => {
                let record = AnalysisRecord::new(
                    analysis.content_hash.clone(),
                    &analysis.verdict,
                    analysis.summary.clone().unwrap_or_default(),
                    analysis.clauses.clone(),
                );
                match upsert(store.clone(), record).await {
                    Ok(()) => analysis.persisted = true,
                    Err(reason) => {
                        warn!(hash = %analysis.content_hash, error = %reason, "failed to store analysis");
                        analysis
                            .warnings
                            .push(AnalysisWarning::PersistenceWarning { reason });
                    }
                }
            }
        }

        info!(
            hash = %analysis.content_hash,
            confidence = analysis.verdict.confidence,
            basis = analysis.verdict.basis.as_str(),
            clauses = analysis.clauses.len(),
            warnings = analysis.warnings.len(),
            persisted = analysis.persisted,
            "analysis complete"
        );
        Ok(analysis)
    }
}

/// Store writes block (DuckDB), so they run off the async workers.
async fn upsert(store: Arc<dyn RecordStore>, record: AnalysisRecord) -> Result<(), String> {
    match tokio::task::spawn_blocking(move || store.upsert(&record)).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(format!("store task failed: {e}")),
    }
}

fn cancelled(stage: Stage) -> AnalysisError {
    info!(stage = stage.as_str(), "analysis cancelled");
    AnalysisError::Cancelled { stage }
}

fn checkpoint(cancel: &CancellationToken, completed: Stage) -> Result<(), AnalysisError> {
    if cancel.is_cancelled() {
        return Err(cancelled(completed));
    }
    Ok(())
}
