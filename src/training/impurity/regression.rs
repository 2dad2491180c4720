//! Weighted-variance impurity for regression and boosting residuals.

use super::{ChildImpurities, ImpurityCalculator};

/// Running sums for the weighted variance of one side.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    weight: f64,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    #[inline]
    fn add(&mut self, target: f64, weight: f64) {
        let weighted = weight * target;
        self.weight += weight;
        self.sum += weighted;
        self.sum_sq += weighted * target;
    }

    #[inline]
    fn remove(&mut self, target: f64, weight: f64) {
        let weighted = weight * target;
        self.weight -= weight;
        self.sum -= weighted;
        self.sum_sq -= weighted * target;
    }

    #[inline]
    fn mean(&self) -> f64 {
        if self.weight <= 0.0 {
            0.0
        } else {
            self.sum / self.weight
        }
    }

    #[inline]
    fn variance(&self) -> f64 {
        if self.weight <= 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        self.sum_sq / self.weight - mean * mean
    }
}

/// Weighted variance impurity.
///
/// Improvement is Friedman's `wL * wR * (meanL - meanR)² / (wL + wR)`, which
/// equals the reduction in weighted sum of squared errors and does not depend
/// on the parent impurity.
#[derive(Debug, Clone, Default)]
pub struct RegressionImpurity {
    targets: Vec<f64>,
    weights: Vec<f64>,
    total: Moments,
    left: Moments,
    right: Moments,
    position: usize,
}

impl RegressionImpurity {
    #[inline]
    fn weight(&self, i: usize) -> f64 {
        if self.weights.is_empty() {
            1.0
        } else {
            self.weights[i]
        }
    }
}

impl ImpurityCalculator for RegressionImpurity {
    fn init(&mut self, targets: &[f64], weights: Option<&[f64]>) {
        self.targets.clear();
        self.targets.extend_from_slice(targets);
        self.weights.clear();
        if let Some(w) = weights {
            self.weights.extend_from_slice(w);
        }

        self.total = Moments::default();
        for i in 0..self.targets.len() {
            let w = self.weight(i);
            self.total.add(self.targets[i], w);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.position = 0;
        self.left = Moments::default();
        self.right = self.total;
    }

    fn update_index(&mut self, position: usize) {
        debug_assert!(
            position >= self.position,
            "new position {position} must not be before current {}",
            self.position
        );
        for i in self.position..position {
            let (target, w) = (self.targets[i], self.weight(i));
            self.left.add(target, w);
            self.right.remove(target, w);
        }
        self.position = position;
    }

    fn node_impurity(&self) -> f64 {
        self.total.variance()
    }

    fn child_impurities(&self) -> ChildImpurities {
        ChildImpurities {
            left: self.left.variance(),
            right: self.right.variance(),
        }
    }

    fn impurity_improvement(&self, _parent_impurity: f64) -> f64 {
        let (wl, wr) = (self.left.weight, self.right.weight);
        if wl <= 0.0 || wr <= 0.0 {
            return 0.0;
        }
        let diff = self.left.mean() - self.right.mean();
        wl * wr * diff * diff / (wl + wr)
    }

    #[inline]
    fn weighted_left(&self) -> f64 {
        self.left.weight
    }

    #[inline]
    fn weighted_right(&self) -> f64 {
        self.right.weight
    }
}
