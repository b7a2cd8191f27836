//! Verification layer: the hybrid verifier plus classifier and summarizer
//! backends (ONNX Runtime, HTTP inference service, deterministic built-ins).

mod backend;
mod lead;
pub mod stub;
mod summary;
mod verifier;

pub use backend::{Classifier, ClassifierOutput, LegalLabel, Summarizer, SummaryRequest, Unconfigured};
pub use lead::LeadSummarizer;
pub use summary::{
    DEFAULT_SUMMARIZER_TIMEOUT, SUMMARY_INPUT_CHARS, SUMMARY_MAX_LENGTH, SUMMARY_MIN_LENGTH,
    summarize, summary_request,
};
pub use verifier::{CLASSIFIER_INPUT_CHARS, DEFAULT_CLASSIFIER_TIMEOUT, HybridVerifier};

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{HttpBackend, HttpError};

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
