//! Embedded-text engine for PDF and plain-text documents.

use async_trait::async_trait;
use lopdf::Document;
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{split_lines, OcrEngine};

/// Engine that reads text the document already carries.
///
/// Handles `application/pdf` with an embedded text layer (via `pdf-extract`)
/// and `text/*` verbatim. Scanned images have no embedded text and are
/// rejected; pair this engine with an external OCR collaborator when image
/// uploads must be supported.
pub struct EmbeddedTextEngine {
    min_text_length: usize,
}

impl EmbeddedTextEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
        }
    }

    fn extract_pdf(&self, bytes: &[u8]) -> Result<Vec<String>, OcrError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| OcrError::Unreadable(format!("not a valid PDF: {e}")))?;

        if doc.is_encrypted() {
            return Err(OcrError::Unreadable("PDF is encrypted".to_string()));
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(OcrError::Empty);
        }

        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| OcrError::Engine(format!("pdf text extraction: {e}")))?;

        if text.trim().len() < self.min_text_length {
            // Likely a scanned PDF with no text layer.
            return Err(OcrError::Unreadable(
                "PDF has no usable embedded text".to_string(),
            ));
        }

        debug!(page_count, text_len = text.len(), "embedded PDF text extracted");
        Ok(split_lines(&text))
    }
}

#[async_trait]
impl OcrEngine for EmbeddedTextEngine {
    async fn extract(&self, bytes: &[u8], media_type: &str) -> Result<Vec<String>, OcrError> {
        match media_type {
            "application/pdf" | "pdf" => self.extract_pdf(bytes),
            t if t.starts_with("text/") => Ok(split_lines(&String::from_utf8_lossy(bytes))),
            other => Err(OcrError::UnsupportedMediaType(other.to_string())),
        }
    }

    fn name(&self) -> &str {
        "embedded-text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_media_passthrough() {
        let engine = EmbeddedTextEngine::new(&OcrConfig::default());
        let lines = engine
            .extract(b"line one\nline two\n", "text/plain")
            .await
            .unwrap();
        assert_eq!(lines, vec!["line one".to_string(), "line two".to_string()]);
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_unreadable() {
        let engine = EmbeddedTextEngine::new(&OcrConfig::default());
        let err = engine
            .extract(b"definitely not a pdf", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Unreadable(_)));
    }

    #[tokio::test]
    async fn test_image_media_unsupported() {
        let engine = EmbeddedTextEngine::new(&OcrConfig::default());
        let err = engine.extract(&[0x89, 0x50], "image/png").await.unwrap_err();
        assert!(matches!(err, OcrError::UnsupportedMediaType(_)));
    }
}
