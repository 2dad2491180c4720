//! Boosted ensemble models.

use crate::data::DenseMatrix;
use crate::repr::{BinaryTree, ProbabilityPrediction};
use crate::training::boosting::log_sum_exp;
use crate::utils::sigmoid;

use super::named_importance;

/// Sum raw importances over `trees`.
fn summed_importance<'a>(trees: impl Iterator<Item = &'a BinaryTree>, n_features: usize) -> Vec<f64> {
    let mut total = vec![0.0; n_features];
    for tree in trees {
        for (sum, value) in total.iter_mut().zip(tree.variable_importance()) {
            *sum += value;
        }
    }
    total
}

// =============================================================================
// RegressionBoostModel
// =============================================================================

/// A boosted regression ensemble: `initial + learning_rate * Σ tree(row)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionBoostModel {
    initial: f64,
    learning_rate: f64,
    trees: Vec<BinaryTree>,
    n_features: usize,
}

impl RegressionBoostModel {
    pub fn new(initial: f64, learning_rate: f64, trees: Vec<BinaryTree>, n_features: usize) -> Self {
        Self {
            initial,
            learning_rate,
            trees,
            n_features,
        }
    }

    pub fn initial_prediction(&self) -> f64 {
        self.initial
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn trees(&self) -> &[BinaryTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.initial
            + self.learning_rate * self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>()
    }

    pub fn predict_all<S: AsRef<[f64]>>(&self, observations: &DenseMatrix<S>) -> Vec<f64> {
        observations.rows().map(|row| self.predict(row)).collect()
    }

    /// Raw importance summed over all trees.
    pub fn raw_variable_importance(&self) -> Vec<f64> {
        summed_importance(self.trees.iter(), self.n_features)
    }

    /// Importance scaled to a maximum of 100, most important first.
    pub fn variable_importance(&self, feature_names: &[&str]) -> Vec<(String, f64)> {
        named_importance(&self.raw_variable_importance(), feature_names)
    }
}

// =============================================================================
// ClassificationBoostModel
// =============================================================================

/// A boosted classification ensemble.
///
/// Binary models keep one log-odds stream for the larger class; multiclass
/// models keep one score stream per class and apply a softmax.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationBoostModel {
    classes: Vec<f64>,
    initial: Vec<f64>,
    learning_rate: f64,
    /// Indexed `[stream][iteration]`.
    trees: Vec<Vec<BinaryTree>>,
    n_features: usize,
}

impl ClassificationBoostModel {
    pub fn new(
        classes: Vec<f64>,
        initial: Vec<f64>,
        learning_rate: f64,
        trees: Vec<Vec<BinaryTree>>,
        n_features: usize,
    ) -> Self {
        debug_assert_eq!(initial.len(), trees.len());
        Self {
            classes,
            initial,
            learning_rate,
            trees,
            n_features,
        }
    }

    /// Sorted distinct classes seen in training.
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Total number of trees over all streams.
    pub fn n_trees(&self) -> usize {
        self.trees.iter().map(Vec::len).sum()
    }

    /// Raw score of every stream for `row`.
    fn scores(&self, row: &[f64]) -> Vec<f64> {
        self.initial
            .iter()
            .zip(&self.trees)
            .map(|(initial, trees)| {
                initial + self.learning_rate * trees.iter().map(|tree| tree.predict(row)).sum::<f64>()
            })
            .collect()
    }

    /// Probability of every class, ordered like [`classes`](Self::classes).
    fn probabilities(&self, row: &[f64]) -> Vec<f64> {
        let scores = self.scores(row);
        if self.classes.len() == 2 {
            let positive = sigmoid(scores[0]);
            vec![1.0 - positive, positive]
        } else {
            let log_norm = log_sum_exp(scores.iter().copied());
            scores.iter().map(|s| (s - log_norm).exp()).collect()
        }
    }

    /// Most likely class; the lowest class wins ties.
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.predict_probability(row).prediction
    }

    pub fn predict_all<S: AsRef<[f64]>>(&self, observations: &DenseMatrix<S>) -> Vec<f64> {
        observations.rows().map(|row| self.predict(row)).collect()
    }

    pub fn predict_probability(&self, row: &[f64]) -> ProbabilityPrediction {
        ProbabilityPrediction::from_classes(&self.classes, &self.probabilities(row))
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

    /// Raw importance summed over every tree of every stream.
    pub fn raw_variable_importance(&self) -> Vec<f64> {
        summed_importance(self.trees.iter().flatten(), self.n_features)
    }

    pub fn variable_importance(&self, feature_names: &[&str]) -> Vec<(String, f64)> {
        named_importance(&self.raw_variable_importance(), feature_names)
    }
}
