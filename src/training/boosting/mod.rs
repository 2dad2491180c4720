//! Gradient boosting on CART residual trees.
//!
//! - [`BoostingConfig`]: iteration count, shrinkage, subsampling and tree options
//! - [`BoostLoss`] / [`LeafUpdate`]: residuals and post-hoc leaf statistics
//! - [`update_leaves`], [`accumulate_predictions`]: the post-hoc leaf updater
//! - [`RegressionBoostLearner`], [`ClassificationBoostLearner`]: training loops

mod config;
mod loss;
mod trainer;
mod updater;

pub use config::BoostingConfig;
pub use loss::{
    AbsoluteLoss, BinomialDeviance, BoostLoss, HuberLoss, LeafSamples, LeafUpdate, MultinomialDeviance,
    QuantileLoss, SquaredLoss,
};
pub use trainer::{ClassificationBoostLearner, RegressionBoostLearner};
pub use updater::{accumulate_predictions, update_leaves};

pub(crate) use loss::log_sum_exp;
