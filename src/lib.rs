//! arbor: CART decision trees and gradient boosting for Rust.
//!
//! Classification and regression trees grown greedily over dense numeric
//! data, plus gradient-boosted ensembles built from them.
//!
//! # Key Types
//!
//! - [`ClassificationTreeLearner`] / [`RegressionTreeLearner`] - single trees
//! - [`ClassificationBoostLearner`] / [`RegressionBoostLearner`] - boosted ensembles
//! - [`TreeConfig`] / [`BoostingConfig`] - validated configuration builders
//! - [`TrainingData`] - observations, targets, optional weights and row subset
//! - [`BinaryTree`] - the trained tree, a flat node array
//!
//! # Training
//!
//! ```
//! use arbor::{DenseMatrix, RegressionTreeLearner, TrainingData, TreeConfig};
//!
//! let x = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 4, 1);
//! let y = [1.0, 1.0, 3.0, 3.0];
//! let data = TrainingData::new(&x, &y)?;
//!
//! let config = TreeConfig::builder().max_depth(4).build()?;
//! let model = RegressionTreeLearner::new(config).learn(&data)?;
//! assert_eq!(model.predict(&[1.5]), 1.0);
//! assert_eq!(model.predict(&[3.5]), 3.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The building blocks of a build (impurity metrics, split searchers, leaf
//! factories, the growth loop) live in [`training`] and can be combined
//! directly through [`training::TreeBuilder`].

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod model;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Trained models
pub use model::{
    ClassificationBoostModel, ClassificationTreeModel, RegressionBoostModel, RegressionTreeModel,
};

// Learners and their configuration
pub use training::{
    BoostingConfig, ClassificationBoostLearner, ClassificationTreeLearner, ConfigError,
    GrowthStrategy, RegressionBoostLearner, RegressionTreeLearner, TrainError, TreeConfig,
    Verbosity,
};

// Tree representation
pub use repr::{BinaryTree, Node, ProbabilityPrediction, TreeValidationError};

// Data types
pub use data::{DatasetError, DenseMatrix, MatrixView, TrainingData};

// Shared utilities
pub use utils::Parallelism;
