//! Leaf value policies.
//!
//! A factory turns the targets of one finished region into the leaf's scalar
//! value and, for classification, its class-probability payload. Factories
//! are only invoked on non-empty regions.

use crate::utils::weighted_mean;

/// Value and payload of a new leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub value: f64,
    /// One probability per class, ordered like the tree's classes. Empty for
    /// regression leaves.
    pub probabilities: Vec<f64>,
}

/// Computes leaf contents from a region's targets.
pub trait LeafFactory {
    /// `classes` is the sorted distinct class list of the whole build (empty
    /// for regression).
    fn create(&self, targets: &[f64], weights: Option<&[f64]>, classes: &[f64]) -> Leaf;
}

/// Weighted mean of the targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanLeaf;

impl LeafFactory for MeanLeaf {
    fn create(&self, targets: &[f64], weights: Option<&[f64]>, _classes: &[f64]) -> Leaf {
        Leaf {
            value: weighted_mean(targets, weights),
            probabilities: Vec::new(),
        }
    }
}

/// Weighted class frequencies; the value is the most frequent class, lowest
/// class first on ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilityLeaf;

impl LeafFactory for ProbabilityLeaf {
    fn create(&self, targets: &[f64], weights: Option<&[f64]>, classes: &[f64]) -> Leaf {
        let (counts, total) = class_counts(targets, weights, classes);
        let probabilities = if total > 0.0 {
            counts.iter().map(|c| c / total).collect()
        } else {
            vec![0.0; classes.len()]
        };
        Leaf {
            value: majority_class(&counts, classes),
            probabilities,
        }
    }
}

/// Laplace-adjusted frequencies `(count + 1) / (total + K)`.
///
/// Never assigns probability zero to a class.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaplaceProbabilityLeaf;

impl LeafFactory for LaplaceProbabilityLeaf {
    fn create(&self, targets: &[f64], weights: Option<&[f64]>, classes: &[f64]) -> Leaf {
        let (counts, total) = class_counts(targets, weights, classes);
        let k = classes.len() as f64;
        Leaf {
            value: majority_class(&counts, classes),
            probabilities: counts.iter().map(|c| (c + 1.0) / (total + k)).collect(),
        }
    }
}

fn class_counts(targets: &[f64], weights: Option<&[f64]>, classes: &[f64]) -> (Vec<f64>, f64) {
    let mut counts = vec![0.0; classes.len()];
    let mut total = 0.0;
    for (i, &target) in targets.iter().enumerate() {
        let w = weights.map_or(1.0, |w| w[i]);
        if let Ok(position) = classes.binary_search_by(|c| c.total_cmp(&target)) {
            counts[position] += w;
            total += w;
        }
    }
    (counts, total)
}

fn majority_class(counts: &[f64], classes: &[f64]) -> f64 {
    let mut best = (f64::NEG_INFINITY, f64::NAN);
    for (&count, &class) in counts.iter().zip(classes) {
        if count > best.0 {
            best = (count, class);
        }
    }
    best.1
}
