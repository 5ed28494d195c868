//! Deterministic override rules for fraud scoring.
//!
//! Each rule is an independent check that fires with a score of at least
//! [`super::RISKY_THRESHOLD`]; the scorer combines them with `max`, so a
//! fired rule always dominates the learned model.

use chrono::Duration;
use rust_decimal::Decimal;

use crate::models::config::FraudConfig;
use crate::models::record::InvoiceRecord;

use super::ScoreInput;

/// A fired override rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleHit {
    /// Override score in `[0.70, 1.0]`.
    pub score: f64,
    /// Which rule fired.
    pub reason: &'static str,
}

/// Run all override rules against a candidate invoice.
pub fn run_rules(
    input: &ScoreInput<'_>,
    history: &[InvoiceRecord],
    config: &FraudConfig,
) -> Vec<RuleHit> {
    let mut hits = Vec::new();

    if let Some(hit) = amount_spike(input, history, config) {
        hits.push(hit);
    }
    if let Some(hit) = duplicate_invoice(input, history) {
        hits.push(hit);
    }
    if let Some(hit) = currency_mismatch(input, history) {
        hits.push(hit);
    }
    if let Some(hit) = red_flag_phrases(input, config) {
        hits.push(hit);
    }

    hits
}

/// Amount above `spike_multiplier x` the user's trailing average.
fn amount_spike(
    input: &ScoreInput<'_>,
    history: &[InvoiceRecord],
    config: &FraudConfig,
) -> Option<RuleHit> {
    let amount = input.fields.amount?;
    let window_start = input.date - Duration::days(config.trailing_days);

    let trailing: Vec<Decimal> = history
        .iter()
        .filter(|r| {
            let d = r.effective_date();
            d >= window_start && d <= input.date
        })
        .filter_map(|r| r.fields.amount)
        .collect();

    if trailing.is_empty() {
        return None;
    }

    let avg = trailing.iter().sum::<Decimal>() / Decimal::from(trailing.len());
    if avg > Decimal::ZERO && amount > avg * Decimal::from(config.spike_multiplier) {
        return Some(RuleHit {
            score: 0.90,
            reason: "amount spike over trailing average",
        });
    }

    None
}

/// Same (tax id, amount, date) combination seen before.
fn duplicate_invoice(input: &ScoreInput<'_>, history: &[InvoiceRecord]) -> Option<RuleHit> {
    let tax_id = input.fields.tax_id.as_deref()?;
    let amount = input.fields.amount?;
    let date = input.fields.date?;

    let seen = history.iter().any(|r| {
        r.fields.tax_id.as_deref() == Some(tax_id)
            && r.fields.amount == Some(amount)
            && r.fields.date == Some(date)
    });

    seen.then_some(RuleHit {
        score: 0.95,
        reason: "duplicate tax id, amount and date",
    })
}

/// Currency differs from every invoice this vendor has billed before.
fn currency_mismatch(input: &ScoreInput<'_>, history: &[InvoiceRecord]) -> Option<RuleHit> {
    let vendor = input.fields.vendor.as_deref()?;
    let currency = input.fields.currency.as_deref()?;

    let vendor_currencies: Vec<&str> = history
        .iter()
        .filter(|r| r.fields.vendor.as_deref() == Some(vendor))
        .filter_map(|r| r.fields.currency.as_deref())
        .collect();

    let mismatched =
        !vendor_currencies.is_empty() && !vendor_currencies.contains(&currency);

    mismatched.then_some(RuleHit {
        score: 0.75,
        reason: "currency mismatch against vendor history",
    })
}

/// Known scam phrasing in the document text.
fn red_flag_phrases(input: &ScoreInput<'_>, config: &FraudConfig) -> Option<RuleHit> {
    let lower = input.text.to_lowercase();

    config
        .red_flag_phrases
        .iter()
        .any(|p| lower.contains(p.as_str()))
        .then_some(RuleHit {
            score: 0.80,
            reason: "red flag phrase in document text",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fraud::tests_support::{record, score_input_fields};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_amount_spike_fires() {
        // Trailing 90-day average of 500 against an incoming 50,000.
        let history = vec![
            record("u1", "ACME Corp", "400.00", "EUR", "2024-07-10"),
            record("u1", "ACME Corp", "600.00", "EUR", "2024-07-20"),
        ];
        let fields = score_input_fields("ACME Corp", "50000.00", "EUR", "2024-08-01");
        let input = ScoreInput {
            fields: &fields,
            vat: Decimal::ZERO,
            text: "",
            date: date("2024-08-01"),
        };

        let hits = run_rules(&input, &history, &FraudConfig::default());
        assert!(hits.iter().any(|h| h.reason.contains("amount spike")));
        assert!(hits.iter().all(|h| h.score >= 0.70));
    }

    #[test]
    fn test_spike_ignores_records_outside_window() {
        let history = vec![record("u1", "ACME Corp", "400.00", "EUR", "2023-01-01")];
        let fields = score_input_fields("ACME Corp", "50000.00", "EUR", "2024-08-01");
        let input = ScoreInput {
            fields: &fields,
            vat: Decimal::ZERO,
            text: "",
            date: date("2024-08-01"),
        };

        let hits = run_rules(&input, &history, &FraudConfig::default());
        assert!(!hits.iter().any(|h| h.reason.contains("amount spike")));
    }

    #[test]
    fn test_duplicate_fires() {
        let mut previous = record("u1", "ACME Corp", "100.00", "EUR", "2024-08-01");
        previous.fields.tax_id = Some("DE123456789".to_string());

        let mut fields = score_input_fields("ACME Corp", "100.00", "EUR", "2024-08-01");
        fields.tax_id = Some("DE123456789".to_string());
        let input = ScoreInput {
            fields: &fields,
            vat: Decimal::ZERO,
            text: "",
            date: date("2024-08-01"),
        };

        let hits = run_rules(&input, &[previous], &FraudConfig::default());
        assert!(hits.iter().any(|h| h.reason.contains("duplicate")));
    }

    #[test]
    fn test_currency_mismatch_fires() {
        let history = vec![
            record("u1", "ACME Corp", "100.00", "EUR", "2024-07-01"),
            record("u1", "ACME Corp", "150.00", "EUR", "2024-07-15"),
        ];
        let fields = score_input_fields("ACME Corp", "120.00", "USD", "2024-08-01");
        let input = ScoreInput {
            fields: &fields,
            vat: Decimal::ZERO,
            text: "",
            date: date("2024-08-01"),
        };

        let hits = run_rules(&input, &history, &FraudConfig::default());
        assert!(hits.iter().any(|h| h.reason.contains("currency mismatch")));
    }

    #[test]
    fn test_red_flag_phrase_fires() {
        let fields = score_input_fields("ACME Corp", "100.00", "EUR", "2024-08-01");
        let input = ScoreInput {
            fields: &fields,
            vat: Decimal::ZERO,
            text: "Please pay by gift card before Friday",
            date: date("2024-08-01"),
        };

        let hits = run_rules(&input, &[], &FraudConfig::default());
        assert!(hits.iter().any(|h| h.reason.contains("red flag")));
    }

    #[test]
    fn test_clean_invoice_fires_nothing() {
        let history = vec![record("u1", "ACME Corp", "100.00", "EUR", "2024-07-01")];
        let fields = score_input_fields("ACME Corp", "110.00", "EUR", "2024-08-01");
        let input = ScoreInput {
            fields: &fields,
            vat: Decimal::ZERO,
            text: "regular invoice",
            date: date("2024-08-01"),
        };

        assert!(run_rules(&input, &history, &FraudConfig::default()).is_empty());
    }
}
