//! Data input abstractions.
//!
//! - [`DenseMatrix`]: row-major observation storage, owned or borrowed
//! - [`TrainingData`]: observations + targets + optional weights/indices,
//!   validated once at construction

mod dataset;
mod matrix;

pub use dataset::{DatasetError, TrainingData};
pub use matrix::{DenseMatrix, MatrixView};
