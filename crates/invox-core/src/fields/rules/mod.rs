//! Rule-based field extractors for invoice text.
//!
//! Each extractor is independent and returns value-or-nothing; one missing
//! field never blocks extraction of the others.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod taxid;
pub mod vendor;

pub use amounts::{extract_amount, normalize_amount, AmountExtractor, AmountMatch};
pub use dates::{extract_date, DateExtractor};
pub use taxid::{extract_tax_id, TaxIdExtractor};
pub use vendor::extract_vendor;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value with its match context.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
