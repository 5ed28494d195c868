//! Country-prefixed tax identifier extraction.

use super::patterns::{TAX_ID_LABELED, TAX_ID_STANDALONE};
use super::{ExtractionMatch, FieldExtractor};

/// Tax id extractor.
///
/// Recognizes country-prefixed identifiers such as `DE123456789` or
/// `GB 123456789`, preferring labeled occurrences ("VAT ID: ...").
pub struct TaxIdExtractor;

impl TaxIdExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TaxIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TaxIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        if let Some(caps) = TAX_ID_LABELED.captures(text) {
            if let Some(id) = normalize_tax_id(&caps[1]) {
                return Some(ExtractionMatch::new(id, 0.95, &caps[0]));
            }
        }

        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TAX_ID_STANDALONE
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0).unwrap();
                normalize_tax_id(&caps[1]).map(|id| {
                    ExtractionMatch::new(id, 0.8, full_match.as_str())
                        .with_position(full_match.start(), full_match.end())
                })
            })
            .collect()
    }
}

/// Extract the first tax id from text.
pub fn extract_tax_id(text: &str) -> Option<ExtractionMatch<String>> {
    TaxIdExtractor::new().extract(text)
}

/// Uppercase, strip internal whitespace, and require a two-letter country
/// prefix followed by 8-12 alphanumerics.
fn normalize_tax_id(raw: &str) -> Option<String> {
    let id: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let prefix_ok = id.len() >= 10
        && id.len() <= 14
        && id[0..2].chars().all(|c| c.is_ascii_alphabetic())
        && id[2..].chars().all(|c| c.is_ascii_alphanumeric());

    prefix_ok.then_some(id)
}
