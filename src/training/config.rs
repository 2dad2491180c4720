//! Tree induction configuration with builder pattern.
//!
//! [`TreeConfig`] is shared by the classification and regression tree
//! learners. It uses the `bon` crate for the builder and validates every
//! option when the builder finishes, so an invalid value never reaches the
//! growth loop.
//!
//! # Example
//!
//! ```
//! use arbor::training::{GrowthStrategy, TreeConfig};
//!
//! // All defaults: fully grown CART tree over every feature
//! let config = TreeConfig::builder().build().unwrap();
//!
//! // Shallow random-subspace tree with a leaf budget
//! let config = TreeConfig::builder()
//!     .max_depth(8)
//!     .min_leaf_size(5)
//!     .features_per_split(3)
//!     .growth(GrowthStrategy::BreadthFirst { max_leaves: 16 })
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors raised while validating a configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_depth must be at least 1, got {0}")]
    InvalidMaxDepth(usize),

    #[error("min_leaf_size must be at least 1, got {0}")]
    InvalidMinLeafSize(usize),

    #[error("min_information_gain must be positive, got {0}")]
    InvalidMinInformationGain(f64),

    #[error("features_per_split {requested} exceeds the {available} available features")]
    InvalidFeaturesPerSplit { requested: usize, available: usize },

    #[error("max_leaves must be at least 2, got {0}")]
    InvalidMaxLeaves(usize),

    #[error("learning_rate must be positive, got {0}")]
    InvalidLearningRate(f64),

    #[error("iterations must be at least 1")]
    InvalidIterations,

    #[error("subsample_ratio must be in (0, 1], got {0}")]
    InvalidSubsampleRatio(f64),

    #[error("alpha must be in (0, 1), got {0}")]
    InvalidAlpha(f64),
}

// =============================================================================
// GrowthStrategy
// =============================================================================

/// Order in which pending regions are processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GrowthStrategy {
    /// Last-in first-out worklist. Only depth limits the tree.
    #[default]
    DepthFirst,
    /// First-in first-out worklist with at most `max_leaves - 1` splits.
    BreadthFirst { max_leaves: usize },
}

impl GrowthStrategy {
    /// Maximum number of accepted splits, if bounded.
    pub fn max_splits(&self) -> Option<usize> {
        match self {
            Self::DepthFirst => None,
            Self::BreadthFirst { max_leaves } => Some(max_leaves.saturating_sub(1)),
        }
    }
}

// =============================================================================
// TreeConfig
// =============================================================================

/// Options controlling how a single tree is grown.
#[derive(Debug, Clone, Builder)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
pub struct TreeConfig {
    /// Maximum depth; the root has depth 0, so `1` allows a single split.
    /// Default: 2000.
    #[builder(default = 2000)]
    pub max_depth: usize,

    /// Minimum number of samples on each side of a split. Default: 1.
    #[builder(default = 1)]
    pub min_leaf_size: usize,

    /// Features evaluated per node. `0` means all. Default: 0.
    #[builder(default = 0)]
    pub features_per_split: usize,

    /// Minimum improvement for a split to be accepted. Default: 1e-6.
    #[builder(default = 1e-6)]
    pub min_information_gain: f64,

    /// Seed for feature subsampling and random thresholds. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Worklist order and optional leaf budget. Default: depth-first.
    #[builder(default)]
    pub growth: GrowthStrategy,
}

impl<S: tree_config_builder::IsComplete> TreeConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_depth` or `min_leaf_size` is zero,
    /// `min_information_gain` is not positive, or a breadth-first leaf budget
    /// is below 2.
    pub fn build(self) -> Result<TreeConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl TreeConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        if self.min_leaf_size == 0 {
            return Err(ConfigError::InvalidMinLeafSize(self.min_leaf_size));
        }
        if self.min_information_gain.is_nan() || self.min_information_gain <= 0.0 {
            return Err(ConfigError::InvalidMinInformationGain(self.min_information_gain));
        }
        if let GrowthStrategy::BreadthFirst { max_leaves } = self.growth {
            if max_leaves < 2 {
                return Err(ConfigError::InvalidMaxLeaves(max_leaves));
            }
        }
        Ok(())
    }

    /// Reject a feature count the data cannot satisfy.
    pub(crate) fn check_features(&self, available: usize) -> Result<(), ConfigError> {
        if self.features_per_split > available {
            return Err(ConfigError::InvalidFeaturesPerSplit {
                requested: self.features_per_split,
                available,
            });
        }
        Ok(())
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}

// =============================================================================
// Tests
// =============================================================================
