//! Single-tree models.

use crate::data::DenseMatrix;
use crate::repr::{BinaryTree, ProbabilityPrediction};

use super::named_importance;

// =============================================================================
// RegressionTreeModel
// =============================================================================

/// A trained regression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTreeModel {
    tree: BinaryTree,
}

impl RegressionTreeModel {
    pub fn new(tree: BinaryTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &BinaryTree {
        &self.tree
    }

    pub fn into_tree(self) -> BinaryTree {
        self.tree
    }

    #[inline]
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.tree.predict(row)
    }

    /// Predict every row of `observations`.
    pub fn predict_all<S: AsRef<[f64]>>(&self, observations: &DenseMatrix<S>) -> Vec<f64> {
        observations.rows().map(|row| self.predict(row)).collect()
    }

    /// Per-feature importance accumulated while growing.
    pub fn raw_variable_importance(&self) -> &[f64] {
        self.tree.variable_importance()
    }

    /// Importance scaled to a maximum of 100, most important first.
    pub fn variable_importance(&self, feature_names: &[&str]) -> Vec<(String, f64)> {
        named_importance(self.tree.variable_importance(), feature_names)
    }
}

// =============================================================================
// ClassificationTreeModel
// =============================================================================

/// A trained classification tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationTreeModel {
    tree: BinaryTree,
}

impl ClassificationTreeModel {
    pub fn new(tree: BinaryTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &BinaryTree {
        &self.tree
    }

    pub fn into_tree(self) -> BinaryTree {
        self.tree
    }

    /// Sorted distinct classes seen in training.
    pub fn classes(&self) -> &[f64] {
        self.tree.classes()
    }

    /// Most likely class.
    #[inline]
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.tree.predict(row)
    }

    pub fn predict_all<S: AsRef<[f64]>>(&self, observations: &DenseMatrix<S>) -> Vec<f64> {
        observations.rows().map(|row| self.predict(row)).collect()
    }

    pub fn predict_probability(&self, row: &[f64]) -> ProbabilityPrediction {
        self.tree.predict_probability(row)
    }

    pub fn predict_probability_all<S: AsRef<[f64]>>(
        &self,
        observations: &DenseMatrix<S>,
    ) -> Vec<ProbabilityPrediction> {
        observations
            .rows()
            .map(|row| self.predict_probability(row))
            .collect()
    }

    pub fn raw_variable_importance(&self) -> &[f64] {
        self.tree.variable_importance()
    }

    pub fn variable_importance(&self, feature_names: &[&str]) -> Vec<(String, f64)> {
        named_importance(self.tree.variable_importance(), feature_names)
    }
}
