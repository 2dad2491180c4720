//! Tree induction and gradient boosting.
//!
//! This module provides the building blocks of a CART build and the learners
//! assembled from them:
//!
//! - [`ImpurityCalculator`]: Gini, entropy and weighted-variance metrics
//! - [`SplitSearcher`]: exhaustive and random-threshold search in one column
//! - [`FeatureSelector`]: all features or a seeded random subset per node
//! - [`LeafFactory`]: mean, probability and Laplace-smoothed leaves
//! - [`TreeBuilder`]: the worklist-driven growth loop
//! - [`TrainingLogger`]: verbosity-gated progress logging
//!
//! ## Learners
//!
//! - [`RegressionTreeLearner`], [`ClassificationTreeLearner`]: single trees
//! - [`RegressionBoostLearner`], [`ClassificationBoostLearner`]: boosted
//!   ensembles with post-hoc leaf updates (see [`boosting`])

pub mod boosting;
mod builder;
mod config;
pub mod impurity;
mod leaf;
mod learner;
mod logger;
mod sampling;
pub mod split;

pub use boosting::{
    AbsoluteLoss, BinomialDeviance, BoostLoss, BoostingConfig, ClassificationBoostLearner, HuberLoss,
    LeafUpdate, MultinomialDeviance, QuantileLoss, RegressionBoostLearner, SquaredLoss,
};
pub use builder::TreeBuilder;
pub use config::{ConfigError, GrowthStrategy, TreeConfig};
pub use impurity::{EntropyImpurity, GiniImpurity, ImpurityCalculator, RegressionImpurity};
pub use leaf::{LaplaceProbabilityLeaf, Leaf, LeafFactory, MeanLeaf, ProbabilityLeaf};
pub use learner::{ClassificationTreeLearner, RegressionTreeLearner, SplitCriterion, SplitStrategy, TrainError};
pub use logger::{TrainingLogger, Verbosity};
pub use sampling::{subsample_rows, FeatureSelector};
pub use split::{LinearSplitSearcher, RandomSplitSearcher, SplitResult, SplitSearcher};
