//! Training input bundle and shape validation.
//!
//! [`TrainingData`] is the canonical input to every learner: a borrowed
//! observation matrix, a target vector, and optional sample weights and
//! row-index subset. All shape checks happen when it is constructed, so
//! learners can assume consistent lengths.

use std::borrow::Cow;

use super::matrix::{DenseMatrix, MatrixView};

/// Data-shape errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("observations must have at least one row and one column, got {rows}x{cols}")]
    Empty { rows: usize, cols: usize },

    #[error("number of targets ({targets}) does not match number of rows ({rows})")]
    TargetLenMismatch { rows: usize, targets: usize },

    #[error("number of weights ({weights}) does not match number of rows ({rows})")]
    WeightLenMismatch { rows: usize, weights: usize },

    #[error("sample index {index} is out of bounds for {rows} rows")]
    IndexOutOfBounds { index: usize, rows: usize },

    #[error("sample index subset is empty")]
    EmptyIndices,

    #[error("row {row} has {got} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("feature {feature} has {got} values, expected {expected}")]
    RaggedColumn {
        feature: usize,
        expected: usize,
        got: usize,
    },
}

/// Observations, targets, and optional weights/indices for one training call.
///
/// Absent weights mean uniform weight 1.0. Absent indices mean all rows in
/// order.
#[derive(Debug, Clone)]
pub struct TrainingData<'a> {
    observations: MatrixView<'a>,
    targets: &'a [f64],
    weights: Option<&'a [f64]>,
    indices: Cow<'a, [usize]>,
}

impl<'a> TrainingData<'a> {
    /// Bundle observations and targets, using every row.
    pub fn new<S: AsRef<[f64]>>(
        observations: &'a DenseMatrix<S>,
        targets: &'a [f64],
    ) -> Result<Self, DatasetError> {
        let view = observations.view();
        let (rows, cols) = (view.num_rows(), view.num_cols());
        if rows == 0 || cols == 0 {
            return Err(DatasetError::Empty { rows, cols });
        }
        if targets.len() != rows {
            return Err(DatasetError::TargetLenMismatch {
                rows,
                targets: targets.len(),
            });
        }
        Ok(Self {
            observations: view,
            targets,
            weights: None,
            indices: Cow::Owned((0..rows).collect()),
        })
    }

    /// Attach per-row sample weights.
    pub fn with_weights(mut self, weights: &'a [f64]) -> Result<Self, DatasetError> {
        if weights.len() != self.num_rows() {
            return Err(DatasetError::WeightLenMismatch {
                rows: self.num_rows(),
                weights: weights.len(),
            });
        }
        self.weights = Some(weights);
        Ok(self)
    }

    /// Restrict training to a subset of rows.
    pub fn with_indices(mut self, indices: &'a [usize]) -> Result<Self, DatasetError> {
        if indices.is_empty() {
            return Err(DatasetError::EmptyIndices);
        }
        let rows = self.num_rows();
        if let Some(&index) = indices.iter().find(|&&i| i >= rows) {
            return Err(DatasetError::IndexOutOfBounds { index, rows });
        }
        self.indices = Cow::Borrowed(indices);
        Ok(self)
    }

    /// Same observations and indices with a different target vector.
    ///
    /// Used by boosting, which fits each tree to residuals rather than the
    /// original targets.
    pub(crate) fn with_targets<'b>(&'b self, targets: &'b [f64]) -> TrainingData<'b> {
        debug_assert_eq!(targets.len(), self.targets.len());
        TrainingData {
            observations: self.observations.clone(),
            targets,
            weights: self.weights,
            indices: Cow::Borrowed(&*self.indices),
        }
    }

    /// Same data restricted to `indices`, which must be in bounds.
    pub(crate) fn with_sampled_indices<'b>(&'b self, indices: &'b [usize]) -> TrainingData<'b> {
        TrainingData {
            observations: self.observations.clone(),
            targets: self.targets,
            weights: self.weights,
            indices: Cow::Borrowed(indices),
        }
    }

    #[inline]
    pub fn observations(&self) -> &MatrixView<'a> {
        &self.observations
    }

    #[inline]
    pub fn targets(&self) -> &'a [f64] {
        self.targets
    }

    #[inline]
    pub fn weights(&self) -> Option<&'a [f64]> {
        self.weights
    }

    /// Active row indices.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.observations.num_rows()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.observations.num_cols()
    }
}
