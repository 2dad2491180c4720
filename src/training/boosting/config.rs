//! Gradient boosting configuration with builder pattern.
//!
//! # Example
//!
//! ```
//! use arbor::training::{BoostingConfig, Verbosity};
//!
//! let config = BoostingConfig::builder()
//!     .iterations(50)
//!     .learning_rate(0.05)
//!     .subsample_ratio(0.8)
//!     .verbosity(Verbosity::Info)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.tree_config().max_depth, 3);
//! ```

use bon::Builder;

use crate::training::config::{ConfigError, TreeConfig};
use crate::training::logger::Verbosity;
use crate::utils::Parallelism;

/// Options for gradient boosting. The tree options apply to every
/// iteration's residual tree.
#[derive(Debug, Clone, Builder)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
pub struct BoostingConfig {
    // === Boosting ===
    /// Number of boosting iterations. Default: 100.
    #[builder(default = 100)]
    pub iterations: usize,

    /// Shrinkage applied to each tree. Default: 0.1.
    #[builder(default = 0.1)]
    pub learning_rate: f64,

    /// Fraction of rows drawn without replacement per iteration. Default: 1.0.
    #[builder(default = 1.0)]
    pub subsample_ratio: f64,

    // === Trees ===
    /// Default: 3.
    #[builder(default = 3)]
    pub max_depth: usize,

    /// Default: 1.
    #[builder(default = 1)]
    pub min_leaf_size: usize,

    /// Default: 1e-6.
    #[builder(default = 1e-6)]
    pub min_information_gain: f64,

    /// Features evaluated per node, `0` for all. Default: 0.
    #[builder(default = 0)]
    pub features_per_split: usize,

    // === Resources ===
    /// Seed for row subsampling and feature selection. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Whether per-class trees of one iteration may be built concurrently.
    /// Default: `Parallel`.
    #[builder(default)]
    pub parallelism: Parallelism,

    // === Logging ===
    /// Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: boosting_config_builder::IsComplete> BoostingConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `iterations` is zero, `learning_rate` is not
    /// positive, `subsample_ratio` is outside `(0, 1]`, or a tree option is
    /// invalid.
    pub fn build(self) -> Result<BoostingConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl BoostingConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::InvalidIterations);
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.subsample_ratio.is_nan() || self.subsample_ratio <= 0.0 || self.subsample_ratio > 1.0 {
            return Err(ConfigError::InvalidSubsampleRatio(self.subsample_ratio));
        }
        self.tree_config().validate()
    }

    /// Tree options for the residual trees.
    pub fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_leaf_size: self.min_leaf_size,
            features_per_split: self.features_per_split,
            min_information_gain: self.min_information_gain,
            seed: self.seed,
            growth: Default::default(),
        }
    }
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config_is_valid() {
        let config = BoostingConfig::builder().build().unwrap();
        assert_eq!(config.iterations, 100);
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.subsample_ratio, 1.0);
        assert_eq!(config.parallelism, Parallelism::Parallel);
        assert_eq!(config.verbosity, Verbosity::Silent);
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::above_one(1.5)]
    #[case::negative(-0.1)]
    fn test_invalid_subsample_ratio(#[case] ratio: f64) {
        let result = BoostingConfig::builder().subsample_ratio(ratio).build();
        assert_eq!(result.unwrap_err(), ConfigError::InvalidSubsampleRatio(ratio));
    }

    #[test]
    fn test_invalid_boosting_options() {
        assert_eq!(
            BoostingConfig::builder().iterations(0).build().unwrap_err(),
            ConfigError::InvalidIterations
        );
        assert_eq!(
            BoostingConfig::builder().learning_rate(0.0).build().unwrap_err(),
            ConfigError::InvalidLearningRate(0.0)
        );
    }

    #[test]
    fn test_tree_options_validated() {
        assert_eq!(
            BoostingConfig::builder().min_leaf_size(0).build().unwrap_err(),
            ConfigError::InvalidMinLeafSize(0)
        );
        assert!(BoostingConfig::builder().min_information_gain(0.0).build().is_err());
    }

    #[test]
    fn test_tree_config_mirrors_fields() {
        let config = BoostingConfig::builder()
            .max_depth(5)
            .min_leaf_size(2)
            .features_per_split(1)
            .seed(7)
            .build()
            .unwrap();
        let tree = config.tree_config();
        assert_eq!(tree.max_depth, 5);
        assert_eq!(tree.min_leaf_size, 2);
        assert_eq!(tree.features_per_split, 1);
        assert_eq!(tree.seed, 7);
    }
}
