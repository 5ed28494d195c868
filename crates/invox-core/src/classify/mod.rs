//! Document classification: category and language.

pub mod language;

use tracing::debug;

use crate::models::config::ClassifierConfig;
use crate::models::record::{DocType, ExtractedText};

pub use language::detect_language;

/// Classification output.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Assigned document category.
    pub doc_type: DocType,
    /// ISO 639-1 language code or `"unknown"`.
    pub language: String,
}

/// Rule-based document classifier.
///
/// Scores keyword tables from config against the extracted text; the table
/// with the most hits wins, with `unknown` when no rule fires. Never fails.
pub struct DocClassifier {
    config: ClassifierConfig,
}

impl DocClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify a document from its extracted text.
    ///
    /// A failed extraction carries only a diagnostic line, not document
    /// content, so it classifies as unknown without scoring.
    pub fn classify(&self, text: &ExtractedText) -> Classification {
        if text.extraction_failed {
            return Classification {
                doc_type: DocType::Unknown,
                language: "unknown".to_string(),
            };
        }

        let joined = text.joined();
        let padded = padded_tokens(&joined.to_lowercase());

        let recurring = count_hits(&padded, &self.config.recurring_keywords);
        let product = count_hits(&padded, &self.config.product_keywords);
        let service = count_hits(&padded, &self.config.service_keywords);

        // Ties resolve in table order: recurring beats product beats service.
        let doc_type = if recurring == 0 && product == 0 && service == 0 {
            DocType::Unknown
        } else if recurring >= product && recurring >= service {
            DocType::Recurring
        } else if product >= service {
            DocType::Product
        } else {
            DocType::Service
        };

        let language = detect_language(&joined, self.config.min_language_text_len);

        debug!(
            doc_type = doc_type.as_str(),
            language = %language,
            recurring_hits = recurring,
            product_hits = product,
            service_hits = service,
            "document classified"
        );

        Classification { doc_type, language }
    }
}

/// Lowercased text reduced to space-joined tokens with leading and
/// trailing spaces, so keywords match whole words only ("support" does
/// not fire on "unsupported"). Multi-word keywords match across token
/// boundaries.
fn padded_tokens(lower: &str) -> String {
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    format!(" {} ", tokens.join(" "))
}

fn count_hits(padded: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|k| padded.contains(&format!(" {k} ")))
        .count()
}
