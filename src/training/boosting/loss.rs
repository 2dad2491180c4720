//! Boosting loss functions.
//!
//! Each loss supplies three things to the boosting loop:
//!
//! - the constant initial prediction,
//! - the residuals (negative gradients) the next tree is fitted to,
//! - optionally, a robust per-leaf statistic that replaces the mean leaf
//!   value the tree builder assigned.
//!
//! The last one is the [`LeafUpdate`] capability. Least squares does not need
//! it because the mean of the residuals is already optimal.
//!
//! All losses only read and write the positions listed in `indices`.

use crate::training::config::ConfigError;
use crate::utils::{median, nan_to_zero, score_at_percentile, sigmoid};

// =============================================================================
// Traits
// =============================================================================

/// Samples owned by one leaf, with the boosting state they are scored on.
///
/// `targets`, `predictions` and `residuals` are full-length and addressed
/// through `indices`.
#[derive(Debug, Clone, Copy)]
pub struct LeafSamples<'a> {
    pub targets: &'a [f64],
    pub predictions: &'a [f64],
    pub residuals: &'a [f64],
    pub indices: &'a [usize],
}

impl LeafSamples<'_> {
    /// `target - prediction` for every owned sample.
    fn differences(&self) -> Vec<f64> {
        self.indices
            .iter()
            .map(|&i| self.targets[i] - self.predictions[i])
            .collect()
    }
}

/// Post-hoc leaf value recomputation.
pub trait LeafUpdate {
    /// Whether leaves need recomputing after the tree is grown.
    fn needs_leaf_update(&self) -> bool;

    /// Optimal constant for one non-empty leaf.
    fn leaf_value(&self, samples: &LeafSamples<'_>) -> f64;
}

/// A loss for single-output gradient boosting.
pub trait BoostLoss: LeafUpdate + Clone + Send + Sync {
    /// Constant the ensemble starts from.
    fn initial_prediction(&self, targets: &[f64], indices: &[usize]) -> f64;

    /// Write negative gradients at `indices` into `residuals`.
    ///
    /// Takes `&mut self` so losses can cache iteration state (the Huber
    /// transition point) for the following leaf update.
    fn update_residuals(
        &mut self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        indices: &[usize],
    );

    /// Mean loss over `indices`, for progress reporting.
    fn loss(&self, targets: &[f64], predictions: &[f64], indices: &[usize]) -> f64;

    /// Name of the loss function (for logging).
    fn name(&self) -> &'static str;
}

fn mean_over(indices: &[usize], f: impl Fn(usize) -> f64) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| f(i)).sum::<f64>() / indices.len() as f64
}

fn gather(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| values[i]).collect()
}

/// Accepts `(0, 1)`, or `(0, 1]` when `inclusive_upper` is set.
fn validate_alpha(alpha: f64, inclusive_upper: bool) -> Result<f64, ConfigError> {
    let below_upper = if inclusive_upper { alpha <= 1.0 } else { alpha < 1.0 };
    if alpha > 0.0 && below_upper {
        Ok(alpha)
    } else {
        Err(ConfigError::InvalidAlpha(alpha))
    }
}

// =============================================================================
// Least squares
// =============================================================================

/// Squared error. Residual `y - F`, leaf value is the residual mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl LeafUpdate for SquaredLoss {
    fn needs_leaf_update(&self) -> bool {
        false
    }

    fn leaf_value(&self, samples: &LeafSamples<'_>) -> f64 {
        mean_over(samples.indices, |i| samples.residuals[i])
    }
}

impl BoostLoss for SquaredLoss {
    fn initial_prediction(&self, targets: &[f64], indices: &[usize]) -> f64 {
        mean_over(indices, |i| targets[i])
    }

    fn update_residuals(
        &mut self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        indices: &[usize],
    ) {
        for &i in indices {
            residuals[i] = targets[i] - predictions[i];
        }
    }

    fn loss(&self, targets: &[f64], predictions: &[f64], indices: &[usize]) -> f64 {
        mean_over(indices, |i| (targets[i] - predictions[i]).powi(2))
    }

    fn name(&self) -> &'static str {
        "squared"
    }
}

// =============================================================================
// Least absolute deviation
// =============================================================================

/// Absolute error. Residual `sign(y - F)`, leaf value is the median of
/// `y - F`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteLoss;

impl LeafUpdate for AbsoluteLoss {
    fn needs_leaf_update(&self) -> bool {
        true
    }

    fn leaf_value(&self, samples: &LeafSamples<'_>) -> f64 {
        median(&samples.differences())
    }
}

impl BoostLoss for AbsoluteLoss {
    fn initial_prediction(&self, targets: &[f64], indices: &[usize]) -> f64 {
        median(&gather(targets, indices))
    }

    fn update_residuals(
        &mut self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        indices: &[usize],
    ) {
        for &i in indices {
            let diff = targets[i] - predictions[i];
            residuals[i] = if diff > 0.0 {
                1.0
            } else if diff < 0.0 {
                -1.0
            } else {
                0.0
            };
        }
    }

    fn loss(&self, targets: &[f64], predictions: &[f64], indices: &[usize]) -> f64 {
        mean_over(indices, |i| (targets[i] - predictions[i]).abs())
    }

    fn name(&self) -> &'static str {
        "absolute"
    }
}

// =============================================================================
// Huber
// =============================================================================

/// Huber loss with an adaptive transition point.
///
/// Every iteration sets `gamma` to the `alpha` percentile of `|y - F|` over
/// the rows in use. Residuals are `y - F` inside `gamma` and clipped to
/// `±gamma` outside. Leaves take the median of `y - F` plus the mean of the
/// clipped deviations from that median.
#[derive(Debug, Clone, Copy)]
pub struct HuberLoss {
    alpha: f64,
    gamma: f64,
}

impl HuberLoss {
    /// `alpha` must lie in `(0, 1]`. At 1.0 nothing is clipped: `gamma` is
    /// the largest absolute residual.
    pub fn new(alpha: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            alpha: validate_alpha(alpha, true)?,
            gamma: 0.0,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Transition point from the latest residual update.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for HuberLoss {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            gamma: 0.0,
        }
    }
}

impl LeafUpdate for HuberLoss {
    fn needs_leaf_update(&self) -> bool {
        true
    }

    fn leaf_value(&self, samples: &LeafSamples<'_>) -> f64 {
        let differences = samples.differences();
        let med = median(&differences);
        let correction = differences
            .iter()
            .map(|d| {
                let deviation = d - med;
                deviation.signum() * deviation.abs().min(self.gamma)
            })
            .sum::<f64>()
            / differences.len() as f64;
        med + correction
    }
}

impl BoostLoss for HuberLoss {
    fn initial_prediction(&self, targets: &[f64], indices: &[usize]) -> f64 {
        median(&gather(targets, indices))
    }

    fn update_residuals(
        &mut self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        indices: &[usize],
    ) {
        let absolute: Vec<f64> = indices
            .iter()
            .map(|&i| (targets[i] - predictions[i]).abs())
            .collect();
        self.gamma = nan_to_zero(score_at_percentile(&absolute, self.alpha));

        for &i in indices {
            let diff = targets[i] - predictions[i];
            residuals[i] = if diff.abs() <= self.gamma {
                diff
            } else {
                self.gamma * diff.signum()
            };
        }
    }

    fn loss(&self, targets: &[f64], predictions: &[f64], indices: &[usize]) -> f64 {
        let gamma = self.gamma;
        mean_over(indices, |i| {
            let diff = (targets[i] - predictions[i]).abs();
            if diff <= gamma {
                0.5 * diff * diff
            } else {
                gamma * (diff - 0.5 * gamma)
            }
        })
    }

    fn name(&self) -> &'static str {
        "huber"
    }
}

// =============================================================================
// Quantile
// =============================================================================

/// Pinball loss for the `alpha` quantile.
///
/// Residual is `alpha` above the prediction and `-(1 - alpha)` below it;
/// leaves take the `alpha` percentile of `y - F`.
#[derive(Debug, Clone, Copy)]
pub struct QuantileLoss {
    alpha: f64,
}

impl QuantileLoss {
    /// `alpha` must lie in `(0, 1)`. Unlike [`HuberLoss::new`] the upper
    /// bound is excluded.
    pub fn new(alpha: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            alpha: validate_alpha(alpha, false)?,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Default for QuantileLoss {
    fn default() -> Self {
        Self { alpha: 0.9 }
    }
}

impl LeafUpdate for QuantileLoss {
    fn needs_leaf_update(&self) -> bool {
        true
    }

    fn leaf_value(&self, samples: &LeafSamples<'_>) -> f64 {
        score_at_percentile(&samples.differences(), self.alpha)
    }
}

impl BoostLoss for QuantileLoss {
    fn initial_prediction(&self, targets: &[f64], indices: &[usize]) -> f64 {
        score_at_percentile(&gather(targets, indices), self.alpha)
    }

    fn update_residuals(
        &mut self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        indices: &[usize],
    ) {
        for &i in indices {
            residuals[i] = if targets[i] > predictions[i] {
                self.alpha
            } else {
                -(1.0 - self.alpha)
            };
        }
    }

    fn loss(&self, targets: &[f64], predictions: &[f64], indices: &[usize]) -> f64 {
        let alpha = self.alpha;
        mean_over(indices, |i| {
            let diff = targets[i] - predictions[i];
            if diff > 0.0 {
                alpha * diff
            } else {
                (alpha - 1.0) * diff
            }
        })
    }

    fn name(&self) -> &'static str {
        "quantile"
    }
}

// =============================================================================
// Binomial deviance
// =============================================================================

/// Logistic loss on 0/1 targets, predictions are log-odds.
///
/// Residual `y - sigmoid(F)`; leaf value is one Newton step,
/// `Σ r / Σ (y - r)(1 - y + r)`, or 0 when the denominator vanishes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinomialDeviance;

impl LeafUpdate for BinomialDeviance {
    fn needs_leaf_update(&self) -> bool {
        true
    }

    fn leaf_value(&self, samples: &LeafSamples<'_>) -> f64 {
        let (mut numerator, mut denominator) = (0.0, 0.0);
        for &i in samples.indices {
            let (y, r) = (samples.targets[i], samples.residuals[i]);
            numerator += r;
            denominator += (y - r) * (1.0 - y + r);
        }
        if denominator == 0.0 {
            0.0
        } else {
            nan_to_zero(numerator / denominator)
        }
    }
}

impl BoostLoss for BinomialDeviance {
    fn initial_prediction(&self, targets: &[f64], indices: &[usize]) -> f64 {
        let positives: f64 = indices.iter().map(|&i| targets[i]).sum();
        let negatives = indices.len() as f64 - positives;
        let log_odds = nan_to_zero((positives / negatives).ln());
        if log_odds.is_finite() {
            log_odds
        } else {
            0.0
        }
    }

    fn update_residuals(
        &mut self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        indices: &[usize],
    ) {
        for &i in indices {
            residuals[i] = targets[i] - sigmoid(predictions[i]);
        }
    }

    fn loss(&self, targets: &[f64], predictions: &[f64], indices: &[usize]) -> f64 {
        // log(1 + e^F) - yF, written to stay finite for large |F|
        mean_over(indices, |i| {
            let f = predictions[i];
            let softplus = f.max(0.0) + (-f.abs()).exp().ln_1p();
            softplus - targets[i] * f
        })
    }

    fn name(&self) -> &'static str {
        "binomial"
    }
}

// =============================================================================
// Multinomial deviance
// =============================================================================

/// Softmax cross-entropy for `K >= 3` classes, one score stream per class.
///
/// Residual for class `k` is `y_k - p_k` where `y_k` is the class indicator
/// and `p_k` the softmax probability. Leaf value is
/// `(K - 1) / K * Σ r / Σ |r| (1 - |r|)` from the class's residual tree.
#[derive(Debug, Clone, Copy)]
pub struct MultinomialDeviance {
    n_classes: usize,
}

impl MultinomialDeviance {
    pub fn new(n_classes: usize) -> Self {
        Self { n_classes }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Prior probability of each class over `indices`.
    ///
    /// `class_targets[k]` is the 0/1 indicator of class `k`.
    pub fn initial_predictions(&self, class_targets: &[Vec<f64>], indices: &[usize]) -> Vec<f64> {
        class_targets
            .iter()
            .map(|targets| mean_over(indices, |i| targets[i]))
            .collect()
    }

    /// Update every class's residuals from the current scores.
    ///
    /// `scores[k][i]` is the raw score of class `k` for row `i`.
    pub fn update_residuals(
        &self,
        class_targets: &[Vec<f64>],
        scores: &[Vec<f64>],
        residuals: &mut [Vec<f64>],
        indices: &[usize],
    ) {
        for &i in indices {
            let log_norm = log_sum_exp(scores.iter().map(|s| s[i]));
            for k in 0..self.n_classes {
                let probability = (scores[k][i] - log_norm).exp();
                residuals[k][i] = nan_to_zero(class_targets[k][i] - probability);
            }
        }
    }

    /// Mean cross-entropy over `indices`.
    pub fn loss(&self, class_targets: &[Vec<f64>], scores: &[Vec<f64>], indices: &[usize]) -> f64 {
        mean_over(indices, |i| {
            let log_norm = log_sum_exp(scores.iter().map(|s| s[i]));
            (0..self.n_classes)
                .filter(|&k| class_targets[k][i] > 0.0)
                .map(|k| log_norm - scores[k][i])
                .sum()
        })
    }
}

impl LeafUpdate for MultinomialDeviance {
    fn needs_leaf_update(&self) -> bool {
        true
    }

    fn leaf_value(&self, samples: &LeafSamples<'_>) -> f64 {
        let (mut numerator, mut denominator) = (0.0, 0.0);
        for &i in samples.indices {
            let (y, r) = (samples.targets[i], samples.residuals[i]);
            numerator += r;
            denominator += (y - r) * (1.0 - y + r);
        }
        if denominator == 0.0 {
            return 0.0;
        }
        let k = self.n_classes as f64;
        nan_to_zero(numerator * (k - 1.0) / k / denominator)
    }
}

/// `log Σ e^x`, shifted by the maximum for stability.
pub(crate) fn log_sum_exp(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.map(|v| (v - max).exp()).sum::<f64>().ln()
}
