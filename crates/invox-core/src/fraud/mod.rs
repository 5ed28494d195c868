//! Fraud scoring: hybrid of a learned anomaly model and hard override rules.

pub mod feature;
pub mod model;
pub mod rules;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::FraudConfig;
use crate::models::record::{InvoiceRecord, ParsedFields};

pub use feature::FeatureVector;
pub use model::{ModelHandle, ModelSnapshot};
pub use rules::RuleHit;

/// Canonical threshold above which an invoice counts as risky.
///
/// Owned by this module; the query resolver and the CLI both consume this
/// definition rather than carrying their own.
pub const RISKY_THRESHOLD: f64 = 0.70;

/// Candidate invoice under scoring, before the record is assembled.
#[derive(Debug, Clone)]
pub struct ScoreInput<'a> {
    /// Parsed candidate fields.
    pub fields: &'a ParsedFields,
    /// Resolved VAT amount.
    pub vat: Decimal,
    /// Full extracted text, for phrase rules.
    pub text: &'a str,
    /// Effective invoice date (parsed date, else upload date).
    pub date: NaiveDate,
}

/// Scoring outcome.
#[derive(Debug, Clone)]
pub struct FraudScore {
    /// Final anomaly score in `[0, 1]`.
    pub score: f64,
    /// Override rules that fired.
    pub rule_hits: Vec<RuleHit>,
    /// Whether the learned model contributed (false on cold start or when
    /// no snapshot has been trained yet).
    pub model_applied: bool,
}

impl FraudScore {
    /// Whether the score crosses the canonical risky threshold.
    pub fn is_risky(&self) -> bool {
        self.score >= RISKY_THRESHOLD
    }
}

/// Hybrid fraud scorer.
///
/// The request path only ever applies the current model snapshot; training
/// runs through [`FraudScorer::retrain`], decoupled from scoring, and
/// publishes a new immutable snapshot atomically. Override rules combine
/// with the model via `max`, so a hard red flag is never masked by model
/// training lag.
pub struct FraudScorer {
    config: FraudConfig,
    model: ModelHandle,
}

impl FraudScorer {
    pub fn new(config: FraudConfig) -> Self {
        Self {
            config,
            model: ModelHandle::new(),
        }
    }

    /// Score a candidate invoice against the owning user's history.
    ///
    /// Cold-start policy: with fewer than `min_history` historical invoices
    /// the model path is skipped entirely and only rules score, avoiding
    /// degenerate fits on a handful of points.
    pub fn score(&self, input: &ScoreInput<'_>, history: &[InvoiceRecord]) -> FraudScore {
        let rule_hits = rules::run_rules(input, history, &self.config);
        let rule_score = rule_hits.iter().map(|h| h.score).fold(0.0, f64::max);

        let mut model_applied = false;
        let mut model_score = 0.0;

        if history.len() >= self.config.min_history {
            if let Some(snapshot) = self.model.current() {
                let features = FeatureVector::project(input, history);
                model_score = snapshot.score(&features);
                model_applied = true;
            }
        }

        // Overrides always win: max() combination.
        let score = rule_score.max(model_score).clamp(0.0, 1.0);

        debug!(
            score,
            model_applied,
            model_version = self.model.version(),
            rule_count = rule_hits.len(),
            history_len = history.len(),
            "fraud score computed"
        );

        FraudScore {
            score,
            rule_hits,
            model_applied,
        }
    }

    /// Retrain the anomaly model over the given record set and publish the
    /// new snapshot.
    ///
    /// Intended as a background batch job; in-flight scoring keeps using
    /// the previous snapshot until the swap. Each record is projected
    /// against the same user's earlier records so training features match
    /// scoring features.
    pub fn retrain(&self, records: &[InvoiceRecord]) {
        let mut features = Vec::with_capacity(records.len());

        for record in records {
            let history: Vec<InvoiceRecord> = records
                .iter()
                .filter(|r| r.user_id == record.user_id && r.id != record.id)
                .filter(|r| r.created_at < record.created_at)
                .cloned()
                .collect();

            let input = ScoreInput {
                fields: &record.fields,
                vat: record.vat,
                text: "",
                date: record.effective_date(),
            };
            features.push(FeatureVector::project(&input, &history));
        }

        if let Some(snapshot) = ModelSnapshot::fit(&features, self.model.version() + 1) {
            self.model.swap(snapshot);
        } else {
            debug!(
                record_count = records.len(),
                "too few records to train anomaly model, keeping current snapshot"
            );
        }
    }

    /// Current model version, 0 when untrained.
    pub fn model_version(&self) -> u64 {
        self.model.version()
    }
}
