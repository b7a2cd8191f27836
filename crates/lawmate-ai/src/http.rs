//! HTTP client for a hosted inference service exposing `/classify` and
//! `/summarize`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::backend::{Classifier, ClassifierOutput, LegalLabel, Summarizer, SummaryRequest};

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unrecognised classifier label: {0}")]
    UnknownLabel(String),
    #[error("classifier returned no predictions")]
    NoPrediction,
}

/// Client for one inference service base URL.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f64,
}

/// Pipeline servers answer either with one prediction or a ranked list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    One(Prediction),
    Ranked(Vec<Prediction>),
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
    min_length: usize,
    max_length: usize,
    do_sample: bool,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary_text: String,
}

impl HttpBackend {
    /// `base_url` like `http://localhost:8000`; a trailing slash is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn classify_text(&self, text: &str) -> Result<ClassifierOutput, HttpError> {
        let url = format!("{}/classify", self.base_url);
        debug!(url = %url, chars = text.len(), "classifying");
        let body = self.post(&url, &ClassifyRequest { text }).await?;

        let prediction = match serde_json::from_str::<ClassifyResponse>(&body)? {
            ClassifyResponse::One(p) => p,
            ClassifyResponse::Ranked(ps) => ps
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .ok_or(HttpError::NoPrediction)?,
        };
        let label = LegalLabel::parse(&prediction.label)
            .ok_or_else(|| HttpError::UnknownLabel(prediction.label.clone()))?;
        Ok(ClassifierOutput::new(label, prediction.score))
    }

    pub async fn summarize_text(&self, request: &SummaryRequest<'_>) -> Result<String, HttpError> {
        let url = format!("{}/summarize", self.base_url);
        let payload = SummarizeRequest {
            text: request.text,
            min_length: request.min_length,
            max_length: request.max_length,
            do_sample: !request.deterministic,
        };
        let body = self.post(&url, &payload).await?;
        let response: SummarizeResponse = serde_json::from_str(&body)?;
        info!(chars = response.summary_text.len(), "summary received");
        Ok(response.summary_text)
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, payload: &T) -> Result<String, HttpError> {
        let resp = self.client.post(url).json(payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HttpError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl Classifier for HttpBackend {
    async fn classify(&self, text: &str) -> anyhow::Result<ClassifierOutput> {
        Ok(self.classify_text(text).await?)
    }
}

#[async_trait]
impl Summarizer for HttpBackend {
    async fn summarize(&self, request: &SummaryRequest<'_>) -> anyhow::Result<String> {
        Ok(self.summarize_text(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one request with a fixed status and body; hand back the request body.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let request_body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let headers = text[..split].to_ascii_lowercase();
                    let length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    let body = &text[split + 4..];
                    if body.len() >= length {
                        break body.to_string();
                    }
                }
                if n == 0 {
                    break String::new();
                }
            };
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request_body
        });
        (format!("http://{addr}/"), handle)
    }

    #[test]
    fn trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
    }

    #[test]
    fn parses_single_and_ranked_predictions() {
        let one: ClassifyResponse =
            serde_json::from_str(r#"{"label": "legal", "score": 0.93}"#).unwrap();
        assert!(matches!(one, ClassifyResponse::One(p) if p.label == "legal"));

        let ranked: ClassifyResponse = serde_json::from_str(
            r#"[{"label": "LABEL_0", "score": 0.2}, {"label": "LABEL_1", "score": 0.8}]"#,
        )
        .unwrap();
        assert!(matches!(ranked, ClassifyResponse::Ranked(ps) if ps.len() == 2));
    }

    #[tokio::test]
    async fn classify_round_trip() {
        let (url, server) = serve_once("200 OK", r#"{"label": "non-legal", "score": 0.9}"#).await;
        let backend = HttpBackend::new(url);
        let output = backend.classify_text("The quick brown fox.").await.unwrap();
        assert_eq!(output.label, LegalLabel::NonLegal);
        assert_eq!(output.confidence, 0.9);

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["text"], "The quick brown fox.");
    }

    #[tokio::test]
    async fn ranked_response_takes_best_label() {
        let (url, _server) = serve_once(
            "200 OK",
            r#"[{"label": "LABEL_0", "score": 0.2}, {"label": "LABEL_1", "score": 0.8}]"#,
        )
        .await;
        let output = HttpBackend::new(url).classify_text("text").await.unwrap();
        assert_eq!(output.label, LegalLabel::Legal);
        assert_eq!(output.confidence, 0.8);
    }

    #[tokio::test]
    async fn unknown_label_is_an_error() {
        let (url, _server) = serve_once("200 OK", r#"{"label": "spam", "score": 0.9}"#).await;
        let err = HttpBackend::new(url).classify_text("text").await.unwrap_err();
        assert!(matches!(err, HttpError::UnknownLabel(l) if l == "spam"));
    }

    #[tokio::test]
    async fn server_error_carries_status() {
        let (url, _server) = serve_once("503 Service Unavailable", r#"{"error": "loading"}"#).await;
        let err = HttpBackend::new(url).classify_text("text").await.unwrap_err();
        assert!(matches!(err, HttpError::Server { status: 503, .. }));
    }

    #[tokio::test]
    async fn summarize_sends_greedy_request() {
        let (url, server) = serve_once("200 OK", r#"{"summary_text": "A two-year lease."}"#).await;
        let request = SummaryRequest {
            text: "The lease runs for two years.",
            min_length: 50,
            max_length: 200,
            deterministic: true,
        };
        let summary = HttpBackend::new(url).summarize_text(&request).await.unwrap();
        assert_eq!(summary, "A two-year lease.");

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["do_sample"], false);
        assert_eq!(sent["min_length"], 50);
        assert_eq!(sent["max_length"], 200);
    }
}
