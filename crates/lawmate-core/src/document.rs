//! Turning raw input bytes into an analysable document.
//!
//! Plain text is decoded as UTF-8 with malformed sequences replaced. PDFs
//! (feature `pdf`) are read page by page from their text layer. The content
//! hash always covers the raw input bytes, so the same file hashes the same
//! however its text is extracted.

use std::path::Path;
use std::sync::OnceLock;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::normalize::normalize;

/// A PDF text layer shorter than this is treated as missing.
pub const MIN_PDF_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no analyzable text in document")]
    Empty,

    #[error("pdf support not enabled in this build")]
    PdfUnsupported,

    #[cfg(feature = "pdf")]
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the input bytes are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
}

impl DocumentKind {
    /// Detect from the file extension, falling back to the `%PDF-` magic.
    pub fn detect(path: Option<&Path>, bytes: &[u8]) -> Self {
        let by_extension = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if by_extension || bytes.starts_with(b"%PDF-") {
            Self::Pdf
        } else {
            Self::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
        }
    }
}

/// Raw bytes awaiting ingest.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
}

impl DocumentInput {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            bytes: text.into().into_bytes(),
            kind: DocumentKind::Text,
        }
    }

    pub fn from_bytes(bytes: Vec<u8>, kind: DocumentKind) -> Self {
        Self { bytes, kind }
    }

    /// Read a file, detecting its kind from extension and content.
    pub fn read(path: &Path) -> Result<Self, IngestError> {
        let bytes = std::fs::read(path)?;
        let kind = DocumentKind::detect(Some(path), &bytes);
        Ok(Self { bytes, kind })
    }
}

/// An ingested document: its text, identity, and lazily normalised form.
#[derive(Debug)]
pub struct Document {
    raw_text: String,
    content_hash: String,
    kind: DocumentKind,
    normalized: OnceLock<String>,
}

impl Document {
    /// Extract text from `input`. Fails when no text can be obtained.
    pub fn ingest(input: &DocumentInput) -> Result<Self, IngestError> {
        let raw_text = match input.kind {
            DocumentKind::Text => String::from_utf8_lossy(&input.bytes).trim().to_string(),
            DocumentKind::Pdf => pdf_text(&input.bytes)?,
        };
        if raw_text.is_empty() {
            return Err(IngestError::Empty);
        }
        Ok(Self {
            raw_text,
            content_hash: content_hash(&input.bytes),
            kind: input.kind,
            normalized: OnceLock::new(),
        })
    }

    /// Wrap already-extracted text. The hash covers the text's UTF-8 bytes.
    pub fn from_text(text: impl Into<String>) -> Self {
        let raw_text = text.into();
        Self {
            content_hash: content_hash(raw_text.as_bytes()),
            raw_text,
            kind: DocumentKind::Text,
            normalized: OnceLock::new(),
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Normalised text, computed on first use.
    pub fn normalized_text(&self) -> &str {
        self.normalized.get_or_init(|| normalize(&self.raw_text))
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Length of the raw text in characters.
    pub fn char_len(&self) -> usize {
        self.raw_text.chars().count()
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(feature = "pdf")]
fn pdf_text(bytes: &[u8]) -> Result<String, IngestError> {
    let doc = lopdf::Document::load_mem(bytes)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();

    let mut parts = Vec::with_capacity(pages.len());
    for page in pages {
        match doc.extract_text(&[page]) {
            Ok(text) if !text.trim().is_empty() => parts.push(text.trim().to_string()),
            Ok(_) => {}
            Err(e) => tracing::debug!(page, error = %e, "page has no usable text layer"),
        }
    }

    let text = parts.join(" ");
    if text.chars().count() < MIN_PDF_CHARS {
        return Err(IngestError::Empty);
    }
    Ok(text)
}

#[cfg(not(feature = "pdf"))]
fn pdf_text(_bytes: &[u8]) -> Result<String, IngestError> {
    Err(IngestError::PdfUnsupported)
}
