use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Binary label produced by a legal-text classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegalLabel {
    Legal,
    NonLegal,
}

impl LegalLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legal => "legal",
            Self::NonLegal => "non-legal",
        }
    }

    /// Parse a backend label. Accepts `legal`/`non-legal` in any case or
    /// separator style, and the raw `LABEL_1`/`LABEL_0` of sequence
    /// classification heads.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "legal" | "label-1" => Some(Self::Legal),
            "non-legal" | "nonlegal" | "not-legal" | "label-0" => Some(Self::NonLegal),
            _ => None,
        }
    }
}

/// A classifier's answer for one text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierOutput {
    pub label: LegalLabel,
    /// Expected within `[0, 1]`; the verifier rejects anything else.
    pub confidence: f64,
}

impl ClassifierOutput {
    pub fn new(label: LegalLabel, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

/// Binary legal-text classifier. Must be stateless across calls.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> anyhow::Result<ClassifierOutput>;
}

/// Parameters for one summarization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRequest<'a> {
    pub text: &'a str,
    pub min_length: usize,
    pub max_length: usize,
    /// Greedy decoding, no sampling.
    pub deterministic: bool,
}

/// Abstractive (or extractive) summarizer.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest<'_>) -> anyhow::Result<String>;
}

/// Stand-in used when the host configured no backend. Every call fails, so
/// the verifier takes its fail-open path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait]
impl Classifier for Unconfigured {
    async fn classify(&self, _text: &str) -> anyhow::Result<ClassifierOutput> {
        anyhow::bail!("no classifier backend configured")
    }
}

#[async_trait]
impl Summarizer for Unconfigured {
    async fn summarize(&self, _request: &SummaryRequest<'_>) -> anyhow::Result<String> {
        anyhow::bail!("no summarizer backend configured")
    }
}
