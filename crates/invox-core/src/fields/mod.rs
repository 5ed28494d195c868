//! Field parsing: extracted text lines to structured candidate fields.

pub mod rules;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::record::{ExtractedText, ParsedFields};

use rules::{extract_amount, extract_date, extract_tax_id, extract_vendor};

/// Outcome of one parse: the candidate fields plus data-quality warnings.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Parsed candidate fields.
    pub fields: ParsedFields,
    /// Human-readable notes about what could not be extracted.
    pub warnings: Vec<String>,
}

/// Parses extracted text into structured candidate fields.
///
/// Runs an ordered set of independent matchers; one missing field never
/// blocks the others. The only cross-field rule enforced here is the
/// amount/currency invariant: an amount without a currency is inconclusive
/// and is dropped rather than silently defaulted.
pub struct FieldParser;

impl FieldParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse candidate fields from extracted text.
    pub fn parse(&self, text: &ExtractedText) -> ParseOutcome {
        let mut warnings = Vec::new();

        if text.extraction_failed {
            warnings.push("text extraction failed upstream".to_string());
        }

        let joined = text.joined();

        let amount_match = extract_amount(&joined);
        let mut amount = amount_match.amount.map(|m| m.value);
        let currency = amount_match.currency;

        // Negative totals never survive; the matchers only produce unsigned
        // values, so this guards against future matcher changes.
        if amount.is_some_and(|a| a < Decimal::ZERO) {
            amount = None;
        }

        if amount.is_some() && currency.is_none() {
            warnings.push("amount found without currency, dropped as inconclusive".to_string());
            amount = None;
        }

        let date = extract_date(&text.lines).map(|m| m.value);
        let tax_id = extract_tax_id(&joined).map(|m| m.value);
        let vendor = extract_vendor(&text.lines);

        for (name, missing) in [
            ("vendor", vendor.is_none()),
            ("date", date.is_none()),
            ("amount", amount.is_none()),
            ("tax id", tax_id.is_none()),
        ] {
            if missing {
                warnings.push(format!("could not extract {name}"));
            }
        }

        // Currency without an amount is fine; the invariant is one-way.
        let fields = ParsedFields {
            vendor,
            date,
            currency,
            amount,
            tax_id,
        };

        debug!(
            vendor = fields.vendor.as_deref().unwrap_or("-"),
            has_amount = fields.amount.is_some(),
            has_date = fields.date.is_some(),
            warning_count = warnings.len(),
            "field parse complete"
        );

        if !warnings.is_empty() {
            warn!(warnings = ?warnings, "partial field extraction");
        }

        ParseOutcome { fields, warnings }
    }
}

impl Default for FieldParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn text(lines: &[&str]) -> ExtractedText {
        ExtractedText::from_lines(lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_full_extraction_scenario() {
        let input = text(&[
            "ACME Corp",
            "Invoice total: 1,200.00 EUR",
            "Date: 14/03/2024",
            "VAT ID: DE123456789",
        ]);

        let outcome = FieldParser::new().parse(&input);
        let fields = outcome.fields;

        assert_eq!(fields.vendor.as_deref(), Some("ACME Corp"));
        assert_eq!(fields.amount, Some(Decimal::from_str("1200.00").unwrap()));
        assert_eq!(fields.currency.as_deref(), Some("EUR"));
        assert_eq!(fields.date, NaiveDate::from_ymd_opt(2024, 3, 14));
        assert_eq!(fields.tax_id.as_deref(), Some("DE123456789"));
    }

    #[test]
    fn test_amount_without_currency_dropped() {
        let input = text(&["Some Vendor", "Total: 1,200.00"]);
        let outcome = FieldParser::new().parse(&input);

        assert!(outcome.fields.amount.is_none());
        assert!(outcome.fields.currency.is_none());
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("without currency")));
    }

    #[test]
    fn test_partial_failure_does_not_block_other_fields() {
        let input = text(&["Globex GmbH", "no numbers on this invoice at all"]);
        let outcome = FieldParser::new().parse(&input);

        assert_eq!(outcome.fields.vendor.as_deref(), Some("Globex GmbH"));
        assert!(outcome.fields.amount.is_none());
        assert!(outcome.fields.date.is_none());
        assert!(outcome.fields.tax_id.is_none());
    }

    #[test]
    fn test_degraded_extraction_still_parses() {
        let input = ExtractedText::failed("[extraction failed: unreadable input]");
        let outcome = FieldParser::new().parse(&input);

        assert!(outcome.fields.amount.is_none());
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("extraction failed upstream")));
    }
}
