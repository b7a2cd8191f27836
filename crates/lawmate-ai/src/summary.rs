use std::time::Duration;

use lawmate_core::normalize::truncate_chars;
use tracing::debug;

use crate::backend::{Summarizer, SummaryRequest};

/// The summarizer sees at most this many characters of the raw text.
pub const SUMMARY_INPUT_CHARS: usize = 3000;
pub const SUMMARY_MIN_LENGTH: usize = 50;
pub const SUMMARY_MAX_LENGTH: usize = 200;

pub const DEFAULT_SUMMARIZER_TIMEOUT: Duration = Duration::from_secs(60);

/// The bounded, deterministic request sent for `raw`.
pub fn summary_request(raw: &str) -> SummaryRequest<'_> {
    SummaryRequest {
        text: truncate_chars(raw, SUMMARY_INPUT_CHARS),
        min_length: SUMMARY_MIN_LENGTH,
        max_length: SUMMARY_MAX_LENGTH,
        deterministic: true,
    }
}

/// Summarize `raw` under an optional time limit. A blank summary is an error.
pub async fn summarize(
    summarizer: &dyn Summarizer,
    raw: &str,
    timeout: Option<Duration>,
) -> anyhow::Result<String> {
    let request = summary_request(raw);
    debug!(chars = request.text.len(), "requesting summary");

    let summary = match timeout {
        Some(limit) => tokio::time::timeout(limit, summarizer.summarize(&request))
            .await
            .map_err(|_| anyhow::anyhow!("summarizer timed out after {limit:?}"))??,
        None => summarizer.summarize(&request).await?,
    };

    let summary = summary.trim();
    anyhow::ensure!(!summary.is_empty(), "summarizer returned an empty summary");
    Ok(summary.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubSummarizer;

    #[test]
    fn request_is_bounded_and_deterministic() {
        let raw = "é".repeat(5000);
        let request = summary_request(&raw);
        assert_eq!(request.text.chars().count(), SUMMARY_INPUT_CHARS);
        assert_eq!(request.min_length, 50);
        assert_eq!(request.max_length, 200);
        assert!(request.deterministic);
    }

    #[tokio::test]
    async fn summary_is_trimmed() {
        let stub = StubSummarizer::returning("  The lease runs for two years.\n");
        let summary = summarize(&stub, "text", None).await.unwrap();
        assert_eq!(summary, "The lease runs for two years.");
    }

    #[tokio::test]
    async fn blank_summary_is_an_error() {
        let stub = StubSummarizer::returning("   ");
        assert!(summarize(&stub, "text", None).await.is_err());
    }

    #[tokio::test]
    async fn slow_summarizer_times_out() {
        let stub = StubSummarizer::returning("late").with_delay(Duration::from_secs(5));
        let err = summarize(&stub, "text", Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
