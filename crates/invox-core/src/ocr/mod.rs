//! Text extraction from raw documents.
//!
//! The OCR engine is a pluggable collaborator: the pipeline owns the
//! *capability* of turning bytes into text lines, not the engine itself.
//! [`TextExtractor`] wraps an engine with a timeout and converts every
//! failure into a degraded [`ExtractedText`] so a pipeline run never aborts
//! on unreadable input.

mod pdf;

pub use pdf::EmbeddedTextEngine;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::OcrError;
use crate::models::config::OcrConfig;
use crate::models::record::{ExtractedText, RawDocument};

/// Pluggable OCR collaborator.
///
/// Implementations turn raw bytes into ordered text lines, one per logical
/// text block. They may call out to an external engine; the extractor wraps
/// every call in a timeout.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract text lines from raw bytes of the given media type.
    async fn extract(&self, bytes: &[u8], media_type: &str) -> Result<Vec<String>, OcrError>;

    /// Engine name, for diagnostics.
    fn name(&self) -> &str;
}

/// Pass-through engine for input that is already text.
///
/// Splits the bytes into lines verbatim. Used by tests and for `text/*`
/// uploads; anything else is rejected as unsupported.
pub struct PlainTextEngine;

#[async_trait]
impl OcrEngine for PlainTextEngine {
    async fn extract(&self, bytes: &[u8], media_type: &str) -> Result<Vec<String>, OcrError> {
        if !media_type.starts_with("text/") {
            return Err(OcrError::UnsupportedMediaType(media_type.to_string()));
        }

        let text = String::from_utf8_lossy(bytes);
        Ok(split_lines(&text))
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}

/// Turns a raw document into an ordered sequence of text lines.
///
/// Contract: never fails. An engine error or timeout produces an
/// [`ExtractedText`] with a single diagnostic line and
/// `extraction_failed = true`; the pipeline continues with degraded data.
pub struct TextExtractor {
    engine: Arc<dyn OcrEngine>,
    config: OcrConfig,
}

impl TextExtractor {
    /// Create an extractor around the given engine.
    pub fn new(engine: Arc<dyn OcrEngine>, config: OcrConfig) -> Self {
        Self { engine, config }
    }

    /// Extract text from a raw document, degrading on any failure.
    pub async fn extract(&self, doc: &RawDocument) -> ExtractedText {
        let timeout = Duration::from_millis(self.config.timeout_ms);

        let outcome = tokio::time::timeout(
            timeout,
            self.engine.extract(&doc.bytes, &doc.media_type),
        )
        .await;

        match outcome {
            Ok(Ok(lines)) => {
                debug!(
                    engine = self.engine.name(),
                    filename = %doc.filename,
                    line_count = lines.len(),
                    "text extraction complete"
                );
                ExtractedText::from_lines(lines)
            }
            Ok(Err(e)) => {
                warn!(
                    engine = self.engine.name(),
                    filename = %doc.filename,
                    error = %e,
                    "text extraction failed, continuing degraded"
                );
                ExtractedText::failed(format!("[extraction failed: {e}]"))
            }
            Err(_) => {
                warn!(
                    engine = self.engine.name(),
                    filename = %doc.filename,
                    timeout_ms = self.config.timeout_ms,
                    "text extraction timed out, continuing degraded"
                );
                ExtractedText::failed(format!(
                    "[extraction failed: {}]",
                    OcrError::Timeout(self.config.timeout_ms)
                ))
            }
        }
    }
}

/// Split text into trimmed, non-empty lines.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}
