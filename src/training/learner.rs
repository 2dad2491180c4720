//! Single-tree learners.
//!
//! [`RegressionTreeLearner`] and [`ClassificationTreeLearner`] validate their
//! input, pick the impurity metric, split searcher and leaf policy, and run a
//! [`TreeBuilder`] over the data.
//!
//! # Example
//!
//! ```
//! use arbor::data::{DenseMatrix, TrainingData};
//! use arbor::training::{ClassificationTreeLearner, TreeConfig};
//!
//! let x = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], 4, 1);
//! let y = vec![0.0, 0.0, 1.0, 1.0];
//! let data = TrainingData::new(&x, &y).unwrap();
//!
//! let config = TreeConfig::builder().max_depth(1).build().unwrap();
//! let model = ClassificationTreeLearner::new(config).learn(&data).unwrap();
//! assert_eq!(model.predict(&[3.5]), 1.0);
//! ```

use crate::data::{DatasetError, TrainingData};
use crate::model::{ClassificationTreeModel, RegressionTreeModel};
use crate::repr::BinaryTree;
use crate::training::builder::TreeBuilder;
use crate::training::config::{ConfigError, TreeConfig};
use crate::training::impurity::{EntropyImpurity, GiniImpurity, ImpurityCalculator, RegressionImpurity};
use crate::training::leaf::{LaplaceProbabilityLeaf, LeafFactory, MeanLeaf, ProbabilityLeaf};
use crate::training::split::{LinearSplitSearcher, RandomSplitSearcher};

// =============================================================================
// TrainError
// =============================================================================

/// Errors that abort a training run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("classification needs at least 2 distinct classes, found {0}")]
    TooFewClasses(usize),

    #[error("gradient boosting does not support sample weights")]
    WeightsUnsupported,
}

// =============================================================================
// Options
// =============================================================================

/// How thresholds are searched within a feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Every boundary between distinct values.
    #[default]
    Exhaustive,
    /// One uniformly drawn threshold per feature (extremely randomised trees).
    RandomThreshold,
}

/// Classification impurity metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitCriterion {
    #[default]
    Gini,
    Entropy,
}

/// Sorted distinct targets of the active rows.
pub(crate) fn distinct_classes(data: &TrainingData<'_>) -> Vec<f64> {
    let targets = data.targets();
    let mut classes: Vec<f64> = data.indices().iter().map(|&i| targets[i]).collect();
    classes.sort_unstable_by(f64::total_cmp);
    classes.dedup();
    classes
}

fn grow<I, L>(
    config: &TreeConfig,
    strategy: SplitStrategy,
    data: &TrainingData<'_>,
    classes: &[f64],
    impurity: I,
    leaf: L,
) -> BinaryTree
where
    I: ImpurityCalculator,
    L: LeafFactory,
{
    match strategy {
        SplitStrategy::Exhaustive => {
            let searcher = LinearSplitSearcher::new(config.min_leaf_size);
            TreeBuilder::new(config, impurity, searcher, leaf).build(data, classes)
        }
        SplitStrategy::RandomThreshold => {
            let searcher = RandomSplitSearcher::new(config.min_leaf_size, config.seed);
            TreeBuilder::new(config, impurity, searcher, leaf).build(data, classes)
        }
    }
}

// =============================================================================
// RegressionTreeLearner
// =============================================================================

/// Learns a regression tree with weighted-variance splits and mean leaves.
#[derive(Debug, Clone, Default)]
pub struct RegressionTreeLearner {
    config: TreeConfig,
    strategy: SplitStrategy,
}

impl RegressionTreeLearner {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            strategy: SplitStrategy::Exhaustive,
        }
    }

    /// Draw one random threshold per feature instead of sweeping.
    pub fn with_random_thresholds(mut self) -> Self {
        self.strategy = SplitStrategy::RandomThreshold;
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn learn(&self, data: &TrainingData<'_>) -> Result<RegressionTreeModel, TrainError> {
        self.config.validate()?;
        self.config.check_features(data.num_features())?;
        let tree = grow(
            &self.config,
            self.strategy,
            data,
            &[],
            RegressionImpurity::default(),
            MeanLeaf,
        );
        Ok(RegressionTreeModel::new(tree))
    }
}

// =============================================================================
// ClassificationTreeLearner
// =============================================================================

/// Learns a classification tree with class-probability leaves.
///
/// Gini impurity and plain frequencies by default.
#[derive(Debug, Clone, Default)]
pub struct ClassificationTreeLearner {
    config: TreeConfig,
    strategy: SplitStrategy,
    criterion: SplitCriterion,
    laplace: bool,
}

impl ClassificationTreeLearner {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_entropy(mut self) -> Self {
        self.criterion = SplitCriterion::Entropy;
        self
    }

    /// Use `(count + 1) / (total + K)` leaf probabilities.
    pub fn with_laplace_smoothing(mut self) -> Self {
        self.laplace = true;
        self
    }

    pub fn with_random_thresholds(mut self) -> Self {
        self.strategy = SplitStrategy::RandomThreshold;
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn learn(&self, data: &TrainingData<'_>) -> Result<ClassificationTreeModel, TrainError> {
        self.config.validate()?;
        self.config.check_features(data.num_features())?;
        let classes = distinct_classes(data);

        let (config, strategy) = (&self.config, self.strategy);
        let tree = match (self.criterion, self.laplace) {
            (SplitCriterion::Gini, false) => {
                grow(config, strategy, data, &classes, GiniImpurity::default(), ProbabilityLeaf)
            }
            (SplitCriterion::Gini, true) => grow(
                config,
                strategy,
                data,
                &classes,
                GiniImpurity::default(),
                LaplaceProbabilityLeaf,
            ),
            (SplitCriterion::Entropy, false) => grow(
                config,
                strategy,
                data,
                &classes,
                EntropyImpurity::default(),
                ProbabilityLeaf,
            ),
            (SplitCriterion::Entropy, true) => grow(
                config,
                strategy,
                data,
                &classes,
                EntropyImpurity::default(),
                LaplaceProbabilityLeaf,
            ),
        };
        Ok(ClassificationTreeModel::new(tree))
    }
}
