//! Jurisdiction-based VAT resolution.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::models::config::VatConfig;
use crate::models::record::ParsedFields;

/// Result of VAT resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct VatResolution {
    /// Derived VAT amount (zero when no amount is present).
    pub vat: Decimal,
    /// True when the rate came from a known jurisdiction.
    pub tax_valid: bool,
    /// Rate that was applied.
    pub rate: Decimal,
}

/// Applies jurisdiction tax rules to parsed fields.
///
/// The rate table is injected at construction and extensible via config;
/// adding a jurisdiction never touches resolver logic. Invoice amounts are
/// treated as VAT-inclusive, so `vat = amount * rate / (1 + rate)`.
/// Resolution is pure and idempotent and never fails the pipeline: absent
/// data yields `vat = 0, tax_valid = false`.
pub struct VatResolver {
    config: VatConfig,
}

impl VatResolver {
    pub fn new(config: VatConfig) -> Self {
        Self { config }
    }

    /// Resolve the VAT amount for the given fields.
    pub fn resolve(&self, fields: &ParsedFields) -> VatResolution {
        let (rate, tax_valid) = match fields
            .tax_country()
            .and_then(|c| self.config.jurisdictions.get(c))
        {
            Some(rate) => (*rate, true),
            None => (self.config.default_rate, false),
        };

        let vat = match fields.amount {
            Some(amount) => (amount * rate / (Decimal::ONE + rate))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            None => Decimal::ZERO,
        };

        // A defaulted rate on a missing amount stays invalid either way;
        // tax_valid only holds when the jurisdiction resolved.
        let tax_valid = tax_valid && fields.amount.is_some();

        debug!(
            country = fields.tax_country().unwrap_or("-"),
            %rate,
            %vat,
            tax_valid,
            "VAT resolved"
        );

        VatResolution { vat, tax_valid, rate }
    }
}
