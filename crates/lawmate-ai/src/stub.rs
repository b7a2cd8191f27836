//! Scripted backends for tests and offline runs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{Classifier, ClassifierOutput, LegalLabel, Summarizer, SummaryRequest};

enum Reply<T> {
    Ok(T),
    Fail(String),
}

/// Classifier that returns a fixed answer and records what it was asked.
pub struct StubClassifier {
    reply: Reply<ClassifierOutput>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl StubClassifier {
    pub fn returning(label: LegalLabel, confidence: f64) -> Self {
        Self::with_reply(Reply::Ok(ClassifierOutput::new(label, confidence)))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(message.into()))
    }

    fn with_reply(reply: Reply<ClassifierOutput>) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().ok().and_then(|g| g.clone())
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, text: &str) -> anyhow::Result<ClassifierOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_input.lock() {
            *last = Some(text.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Reply::Ok(output) => Ok(*output),
            Reply::Fail(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

/// Summarizer that returns a fixed summary.
pub struct StubSummarizer {
    reply: Reply<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubSummarizer {
    pub fn returning(summary: impl Into<String>) -> Self {
        Self::with_reply(Reply::Ok(summary.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(message.into()))
    }

    fn with_reply(reply: Reply<String>) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, _request: &SummaryRequest<'_>) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Reply::Ok(summary) => Ok(summary.clone()),
            Reply::Fail(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}
