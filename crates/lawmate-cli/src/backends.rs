//! Construction of classifier, summarizer, and store from CLI options.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use lawmate_ai::{Classifier, HttpBackend, LeadSummarizer, OnnxClassifier, Summarizer, Unconfigured};
use lawmate_pipeline::{Analyzer, PipelineConfig};
use lawmate_store::DuckStore;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// DuckDB database file for stored analyses
    #[arg(long, global = true, env = "LAWMATE_DB", default_value = "lawmate.duckdb")]
    pub db: PathBuf,

    /// Base URL of an inference service exposing POST /classify
    #[arg(long, global = true, env = "LAWMATE_CLASSIFIER_URL")]
    pub classifier_url: Option<String>,

    /// Directory holding model.onnx and tokenizer.json for a local classifier
    #[arg(
        long,
        global = true,
        env = "LAWMATE_CLASSIFIER_MODEL",
        conflicts_with = "classifier_url"
    )]
    pub classifier_model: Option<PathBuf>,

    /// Base URL of an inference service exposing POST /summarize (lead sentences otherwise)
    #[arg(long, global = true, env = "LAWMATE_SUMMARIZER_URL")]
    pub summarizer_url: Option<String>,

    /// Classifier timeout in seconds (0 = wait indefinitely)
    #[arg(long, global = true, env = "LAWMATE_CLASSIFIER_TIMEOUT", default_value_t = 30)]
    pub classifier_timeout: u64,

    /// Summarizer timeout in seconds (0 = wait indefinitely)
    #[arg(long, global = true, env = "LAWMATE_SUMMARIZER_TIMEOUT", default_value_t = 60)]
    pub summarizer_timeout: u64,
}

impl BackendArgs {
    pub fn classifier(&self) -> anyhow::Result<Arc<dyn Classifier>> {
        if let Some(dir) = &self.classifier_model {
            return Ok(Arc::new(OnnxClassifier::load(dir)?));
        }
        if let Some(url) = &self.classifier_url {
            info!(url = %url, "using remote classifier");
            return Ok(Arc::new(HttpBackend::new(url.clone())));
        }
        warn!("no classifier configured; documents without legal structure will fail open");
        Ok(Arc::new(Unconfigured))
    }

    pub fn summarizer(&self) -> Arc<dyn Summarizer> {
        match &self.summarizer_url {
            Some(url) => Arc::new(HttpBackend::new(url.clone())),
            None => Arc::new(LeadSummarizer),
        }
    }

    pub fn open_store(&self) -> anyhow::Result<DuckStore> {
        Ok(DuckStore::open_persistent(&self.db)?)
    }

    /// Attach the analysis store to `analyzer`. A store that cannot be opened
    /// is not fatal: the analysis runs and reports why it was not saved.
    pub fn attach_store(&self, analyzer: Analyzer) -> Analyzer {
        match self.open_store() {
            Ok(store) => analyzer.with_store(Arc::new(store)),
            Err(e) => {
                warn!(db = %self.db.display(), error = %format!("{e:#}"), "analysis store unavailable, results will not be saved");
                analyzer.with_store_unavailable(format!(
                    "cannot open {}: {e:#}",
                    self.db.display()
                ))
            }
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            classifier_timeout: seconds(self.classifier_timeout),
            summarizer_timeout: seconds(self.summarizer_timeout),
            ..PipelineConfig::default()
        }
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(db: PathBuf) -> BackendArgs {
        BackendArgs {
            db,
            classifier_url: None,
            classifier_model: None,
            summarizer_url: None,
            classifier_timeout: 30,
            summarizer_timeout: 60,
        }
    }

    const CONTRACT: &str = "This Supply Agreement is made between the parties named below. \
        The Supplier shall deliver the goods within 10 days. \
        The Buyer shall pay $500 within 30 days. \
        This agreement is governed by the laws of Delaware.";

    #[tokio::test]
    async fn unopenable_store_is_reported_in_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let backends = args(dir.path().join("missing").join("lawmate.duckdb"));
        let analyzer = backends.attach_store(Analyzer::new(
            Arc::new(Unconfigured),
            backends.summarizer(),
        ));

        let analysis = analyzer
            .analyze(&lawmate_core::DocumentInput::from_text(CONTRACT))
            .await
            .unwrap();
        assert!(!analysis.persisted);
        assert!(analysis.warnings.iter().any(|w| matches!(
            w,
            lawmate_pipeline::AnalysisWarning::PersistenceWarning { reason }
                if reason.contains("lawmate.duckdb")
        )));
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        assert_eq!(seconds(0), None);
        assert_eq!(seconds(30), Some(Duration::from_secs(30)));
    }
}
