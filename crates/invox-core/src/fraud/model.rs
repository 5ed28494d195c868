//! Statistical anomaly model over invoice feature vectors.

use std::sync::{Arc, RwLock};

use ndarray::{Array1, Array2, Axis};
use tracing::{debug, info};

use super::feature::{FeatureVector, FEATURE_COUNT};

/// Standard deviations below this are treated as constant features.
const STD_FLOOR: f64 = 1e-9;

/// Decision-function scale: a mean |z| of this size maps to score 0.5.
const Z_MIDPOINT: f64 = 3.0;

/// One trained, immutable model snapshot.
///
/// Fits per-feature mean and standard deviation over the training matrix;
/// the decision function is the mean absolute z-score of a projected
/// invoice, squashed into `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    /// Monotonic version, bumped on every retrain.
    pub version: u64,
    /// Number of training rows.
    pub sample_count: usize,
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl ModelSnapshot {
    /// Fit a snapshot from feature vectors. Returns `None` for fewer than
    /// two samples, where a fit would be degenerate.
    pub fn fit(features: &[FeatureVector], version: u64) -> Option<Self> {
        if features.len() < 2 {
            return None;
        }

        let rows: Vec<[f64; FEATURE_COUNT]> =
            features.iter().map(|f| f.to_array()).collect();
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let matrix = Array2::from_shape_vec((rows.len(), FEATURE_COUNT), flat).ok()?;

        let means = matrix.mean_axis(Axis(0))?;
        let stds = matrix.std_axis(Axis(0), 0.0);

        debug!(
            version,
            sample_count = rows.len(),
            "anomaly model fitted"
        );

        Some(Self {
            version,
            sample_count: rows.len(),
            means,
            stds,
        })
    }

    /// Continuous anomaly measure: mean absolute z-score across features.
    /// Constant features contribute nothing.
    pub fn decision(&self, features: &FeatureVector) -> f64 {
        let row = features.to_array();
        let mut total = 0.0;
        let mut used = 0usize;

        for (i, value) in row.iter().enumerate() {
            let std = self.stds[i];
            if std > STD_FLOOR {
                total += ((value - self.means[i]) / std).abs();
                used += 1;
            }
        }

        if used == 0 { 0.0 } else { total / used as f64 }
    }

    /// Decision measure rescaled to `[0, 1]`.
    pub fn score(&self, features: &FeatureVector) -> f64 {
        let z = self.decision(features);
        (z / (z + Z_MIDPOINT)).clamp(0.0, 1.0)
    }
}

/// Shared handle to the current model snapshot.
///
/// The snapshot is immutable and swapped atomically on retrain: readers
/// clone the `Arc` and score against a consistent version while a retrain
/// publishes the next one. Read-mostly, single writer at a time.
#[derive(Default)]
pub struct ModelHandle {
    inner: RwLock<Option<Arc<ModelSnapshot>>>,
}

impl ModelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if any training has happened.
    pub fn current(&self) -> Option<Arc<ModelSnapshot>> {
        self.inner
            .read()
            .expect("model lock poisoned")
            .clone()
    }

    /// Publish a freshly trained snapshot.
    pub fn swap(&self, snapshot: ModelSnapshot) {
        info!(
            version = snapshot.version,
            sample_count = snapshot.sample_count,
            "publishing anomaly model snapshot"
        );
        *self.inner.write().expect("model lock poisoned") = Some(Arc::new(snapshot));
    }

    /// Version of the current snapshot, 0 when untrained.
    pub fn version(&self) -> u64 {
        self.current().map(|s| s.version).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fv(amount: f64) -> FeatureVector {
        FeatureVector {
            amount,
            vat_ratio: 0.16,
            vendor_frequency: 0.5,
            day_of_week: 2.0,
            vendor_age_days: 30.0,
        }
    }

    #[test]
    fn test_fit_requires_two_samples() {
        assert!(ModelSnapshot::fit(&[fv(100.0)], 1).is_none());
        assert!(ModelSnapshot::fit(&[fv(100.0), fv(110.0)], 1).is_some());
    }

    #[test]
    fn test_typical_invoice_scores_low() {
        let training: Vec<FeatureVector> =
            (0..20).map(|i| fv(100.0 + i as f64)).collect();
        let model = ModelSnapshot::fit(&training, 1).unwrap();

        let score = model.score(&fv(110.0));
        assert!(score < 0.5, "typical invoice scored {score}");
    }

    #[test]
    fn test_outlier_scores_higher_than_typical() {
        let training: Vec<FeatureVector> =
            (0..20).map(|i| fv(100.0 + i as f64)).collect();
        let model = ModelSnapshot::fit(&training, 1).unwrap();

        let typical = model.score(&fv(110.0));
        let outlier = model.score(&fv(50_000.0));
        assert!(outlier > typical);
        assert!(outlier <= 1.0 && outlier >= 0.0);
    }

    #[test]
    fn test_constant_features_score_zero() {
        let training: Vec<FeatureVector> = (0..5).map(|_| fv(100.0)).collect();
        let model = ModelSnapshot::fit(&training, 1).unwrap();
        assert_eq!(model.decision(&fv(100.0)), 0.0);
    }

    #[test]
    fn test_handle_swap_bumps_version() {
        let handle = ModelHandle::new();
        assert_eq!(handle.version(), 0);
        assert!(handle.current().is_none());

        let snapshot = ModelSnapshot::fit(&[fv(1.0), fv(2.0)], 7).unwrap();
        handle.swap(snapshot);
        assert_eq!(handle.version(), 7);
    }
}
