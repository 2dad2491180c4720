//! Impurity metrics with incremental left/right bookkeeping.
//!
//! A calculator is loaded with one region's targets (in the order the split
//! searcher will sweep them) and then moved along that order with
//! [`update_index`](ImpurityCalculator::update_index). Each move transfers the
//! samples between the old and the new position from the right side to the
//! left side in O(moved samples).
//!
//! Every metric defines the impurity of an empty side as 0, so a sweep never
//! produces `NaN`.
//!
//! - [`GiniImpurity`], [`EntropyImpurity`]: classification, on class counts
//! - [`RegressionImpurity`]: weighted variance, with Friedman's improvement

mod classification;
mod regression;

pub use classification::{ClassificationImpurity, Criterion, Entropy, EntropyImpurity, Gini, GiniImpurity};
pub use regression::RegressionImpurity;

/// Impurities of the two sides of the current split position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChildImpurities {
    pub left: f64,
    pub right: f64,
}

/// Cost function driving the split search.
pub trait ImpurityCalculator {
    /// Called once per tree build with the sorted distinct classes of the
    /// training targets. Regression metrics ignore it.
    fn prepare(&mut self, _classes: &[f64]) {}

    /// Load a region. Everything starts on the right side.
    ///
    /// `weights`, when present, has the same length as `targets`.
    fn init(&mut self, targets: &[f64], weights: Option<&[f64]>);

    /// Move every sample back to the right side.
    fn reset(&mut self);

    /// Move samples `[current, position)` from the right side to the left
    /// side. `position` is relative to the start of the loaded region and
    /// must not go backwards.
    fn update_index(&mut self, position: usize);

    /// Impurity of the whole loaded region.
    fn node_impurity(&self) -> f64;

    /// Impurities of the left and right sides at the current position.
    fn child_impurities(&self) -> ChildImpurities;

    /// Improvement of splitting at the current position over a parent with
    /// impurity `parent_impurity`.
    fn impurity_improvement(&self, parent_impurity: f64) -> f64;

    fn weighted_left(&self) -> f64;

    fn weighted_right(&self) -> f64;
}
