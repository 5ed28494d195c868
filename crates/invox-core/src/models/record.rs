//! Invoice record data models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw uploaded document. Transient; lives for one pipeline run only.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Declared media type (`application/pdf`, `image/*`, `text/plain`).
    pub media_type: String,
    /// Owning user.
    pub user_id: String,
    /// Original file name.
    pub filename: String,
}

impl RawDocument {
    pub fn new(
        bytes: Vec<u8>,
        media_type: impl Into<String>,
        user_id: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            user_id: user_id.into(),
            filename: filename.into(),
        }
    }
}

/// Ordered text lines produced by the text extractor, one per OCR block.
///
/// Owned by a single pipeline run; never persisted standalone.
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    /// Extracted lines in reading order.
    pub lines: Vec<String>,
    /// True when extraction failed and `lines` holds only a diagnostic.
    pub extraction_failed: bool,
}

impl ExtractedText {
    /// Successful extraction from the given lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            extraction_failed: false,
        }
    }

    /// Degraded result carrying a single diagnostic line.
    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            lines: vec![diagnostic.into()],
            extraction_failed: true,
        }
    }

    /// All lines joined for whole-document matchers.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

/// Structured candidate fields parsed from extracted text.
///
/// Every field is optional: extraction may partially fail, and a missing
/// field is a data-quality state, not an error. Invariant: `amount` present
/// implies `currency` present (enforced by the field parser).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFields {
    /// Vendor / issuer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    /// Invoice date, normalized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// ISO-4217 currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Invoice total, non-negative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    /// Country-prefixed tax identifier (e.g. `DE123456789`).
    #[serde(rename = "taxId", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

impl ParsedFields {
    /// Two-letter country prefix of the tax id, if the id carries one.
    pub fn tax_country(&self) -> Option<&str> {
        let id = self.tax_id.as_deref()?;
        let prefix = id.get(0..2)?;
        prefix
            .chars()
            .all(|c| c.is_ascii_alphabetic())
            .then_some(prefix)
    }
}

/// Document category assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    /// Service invoice (consulting, maintenance, support).
    Service,
    /// Goods invoice (line items with quantities/SKUs).
    Product,
    /// Recurring billing (subscription, monthly charge).
    Recurring,
    /// No classification rule fired.
    Unknown,
}

impl Default for DocType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Product => "product",
            Self::Recurring => "recurring",
            Self::Unknown => "unknown",
        }
    }
}

/// The persisted, immutable structured representation of one upload.
///
/// Created once by the record assembler at the end of a pipeline run and
/// never edited in place; a re-upload produces a new record. `vat` and
/// `fraud_score` are always present, defaulting to zero when upstream
/// stages degraded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Generated identifier.
    pub id: String,

    /// Owning user.
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Original file name.
    pub filename: String,

    /// Raw extracted text lines.
    pub ocr_text: Vec<String>,

    /// Parsed candidate fields (all optional).
    #[serde(flatten)]
    pub fields: ParsedFields,

    /// Document category.
    #[serde(rename = "docType", default)]
    pub doc_type: DocType,

    /// ISO 639-1 language code or `"unknown"`.
    pub language: String,

    /// Derived VAT amount (zero when unresolvable).
    pub vat: Decimal,

    /// Whether the VAT rate was resolved from a known jurisdiction.
    #[serde(rename = "taxValid", default)]
    pub tax_valid: bool,

    /// Anomaly score in `[0, 1]`.
    #[serde(rename = "fraudScore")]
    pub fraud_score: f64,

    /// Persistence timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl InvoiceRecord {
    /// Effective date used for time-window filtering: the parsed invoice
    /// date when present, otherwise the upload date.
    pub fn effective_date(&self) -> NaiveDate {
        self.fields
            .date
            .unwrap_or_else(|| self.created_at.date_naive())
    }
}

/// Answer returned by the query resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnswer {
    /// Human-readable answer text.
    pub answer: String,

    /// Matching records, when the intent returns a record list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invoices: Vec<InvoiceRecord>,

    /// Base64-encoded CSV export, for export intents.
    #[serde(rename = "csvBase64", skip_serializing_if = "Option::is_none")]
    pub csv_base64: Option<String>,
}

impl QueryAnswer {
    /// Text-only answer.
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            invoices: Vec::new(),
            csv_base64: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_tax_country_prefix() {
        let fields = ParsedFields {
            tax_id: Some("DE123456789".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.tax_country(), Some("DE"));

        let numeric = ParsedFields {
            tax_id: Some("123456789".to_string()),
            ..Default::default()
        };
        assert_eq!(numeric.tax_country(), None);

        assert_eq!(ParsedFields::default().tax_country(), None);
    }

    #[test]
    fn test_effective_date_falls_back_to_created_at() {
        let created = "2024-08-20T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut record = InvoiceRecord {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            filename: "a.pdf".to_string(),
            ocr_text: vec![],
            fields: ParsedFields::default(),
            doc_type: DocType::Unknown,
            language: "unknown".to_string(),
            vat: Decimal::ZERO,
            tax_valid: false,
            fraud_score: 0.0,
            created_at: created,
        };

        assert_eq!(
            record.effective_date(),
            NaiveDate::from_ymd_opt(2024, 8, 20).unwrap()
        );

        record.fields.date = NaiveDate::from_ymd_opt(2024, 3, 14);
        assert_eq!(
            record.effective_date(),
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
        );
    }

    #[test]
    fn test_record_serialization_field_names() {
        let record = InvoiceRecord {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            filename: "a.pdf".to_string(),
            ocr_text: vec!["ACME Corp".to_string()],
            fields: ParsedFields {
                vendor: Some("ACME Corp".to_string()),
                date: NaiveDate::from_ymd_opt(2024, 3, 14),
                currency: Some("EUR".to_string()),
                amount: Some(Decimal::from_str("1200.00").unwrap()),
                tax_id: Some("DE123456789".to_string()),
            },
            doc_type: DocType::Service,
            language: "en".to_string(),
            vat: Decimal::from_str("191.60").unwrap(),
            tax_valid: true,
            fraud_score: 0.1,
            created_at: "2024-03-15T09:30:00Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["docType"], "service");
        assert_eq!(json["taxId"], "DE123456789");
        assert_eq!(json["date"], "2024-03-14");
        assert!(json.get("fraudScore").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
