//! Numeric feature projection of an invoice.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;

use crate::models::record::InvoiceRecord;

use super::ScoreInput;

/// Numeric projection of one invoice, used only by the anomaly model.
///
/// Recomputed on demand against the owning user's history; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Invoice total (0 when missing).
    pub amount: f64,
    /// VAT as a fraction of the total (0 when the total is missing).
    pub vat_ratio: f64,
    /// Share of the user's invoices issued by this vendor.
    pub vendor_frequency: f64,
    /// Day of week of the effective date, 0 = Monday.
    pub day_of_week: f64,
    /// Days since the vendor first appeared for this user.
    pub vendor_age_days: f64,
}

/// Number of features in the projection.
pub const FEATURE_COUNT: usize = 5;

impl FeatureVector {
    /// Project a candidate invoice against the owning user's history.
    pub fn project(input: &ScoreInput<'_>, history: &[InvoiceRecord]) -> Self {
        let amount = input
            .fields
            .amount
            .and_then(|a| a.to_f64())
            .unwrap_or(0.0);
        let vat = input.vat.to_f64().unwrap_or(0.0);
        let vat_ratio = if amount > 0.0 { vat / amount } else { 0.0 };

        let (vendor_frequency, vendor_age_days) = match input.fields.vendor.as_deref() {
            Some(vendor) if !history.is_empty() => {
                let same: Vec<&InvoiceRecord> = history
                    .iter()
                    .filter(|r| r.fields.vendor.as_deref() == Some(vendor))
                    .collect();

                let frequency = same.len() as f64 / history.len() as f64;
                let age = same
                    .iter()
                    .map(|r| r.effective_date())
                    .min()
                    .map(|first| days_between(first, input.date))
                    .unwrap_or(0.0);

                (frequency, age)
            }
            _ => (0.0, 0.0),
        };

        Self {
            amount,
            vat_ratio,
            vendor_frequency,
            day_of_week: input.date.weekday().num_days_from_monday() as f64,
            vendor_age_days,
        }
    }

    /// Features as a fixed-size array, in model column order.
    pub fn to_array(self) -> [f64; FEATURE_COUNT] {
        [
            self.amount,
            self.vat_ratio,
            self.vendor_frequency,
            self.day_of_week,
            self.vendor_age_days,
        ]
    }
}

fn days_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days().max(0) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fraud::tests_support::{record, score_input_fields};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_projection_without_history() {
        let fields = score_input_fields("ACME Corp", "1000.00", "EUR", "2024-03-14");
        let input = ScoreInput {
            fields: &fields,
            vat: "159.66".parse().unwrap(),
            text: "",
            date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
        };

        let fv = FeatureVector::project(&input, &[]);
        assert_eq!(fv.amount, 1000.0);
        assert!((fv.vat_ratio - 0.15966).abs() < 1e-9);
        assert_eq!(fv.vendor_frequency, 0.0);
        assert_eq!(fv.day_of_week, 3.0); // 2024-03-14 is a Thursday
        assert_eq!(fv.vendor_age_days, 0.0);
    }

    #[test]
    fn test_vendor_frequency_and_age() {
        let history = vec![
            record("u1", "ACME Corp", "100.00", "EUR", "2024-01-14"),
            record("u1", "Globex", "50.00", "EUR", "2024-02-01"),
        ];

        let fields = score_input_fields("ACME Corp", "120.00", "EUR", "2024-03-14");
        let input = ScoreInput {
            fields: &fields,
            vat: "19.16".parse().unwrap(),
            text: "",
            date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
        };

        let fv = FeatureVector::project(&input, &history);
        assert_eq!(fv.vendor_frequency, 0.5);
        assert_eq!(fv.vendor_age_days, 60.0);
    }
}
