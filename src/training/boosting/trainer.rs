//! Gradient boosting learners.
//!
//! Both learners run the same loop: start from the loss's constant, and per
//! iteration compute residuals on a row subsample, grow a regression tree on
//! them, let the loss refine the leaves, then add the shrunken tree to the
//! running predictions of every active row.
//!
//! Multiclass classification keeps one score stream per class. All class
//! residuals of an iteration are computed first, then the per-class trees are
//! grown independently (concurrently when allowed) before any stream is
//! updated.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::TrainingData;
use crate::model::{ClassificationBoostModel, RegressionBoostModel};
use crate::repr::BinaryTree;
use crate::training::boosting::config::BoostingConfig;
use crate::training::boosting::loss::{BinomialDeviance, BoostLoss, MultinomialDeviance, SquaredLoss};
use crate::training::boosting::updater::{accumulate_predictions, update_leaves};
use crate::training::builder::TreeBuilder;
use crate::training::config::TreeConfig;
use crate::training::impurity::RegressionImpurity;
use crate::training::leaf::MeanLeaf;
use crate::training::learner::{distinct_classes, TrainError};
use crate::training::logger::{TrainingLogger, Verbosity};
use crate::training::sampling::subsample_rows;
use crate::training::split::LinearSplitSearcher;

type ResidualTreeBuilder = TreeBuilder<RegressionImpurity, LinearSplitSearcher, MeanLeaf>;

fn residual_tree_builder(config: &TreeConfig) -> ResidualTreeBuilder {
    TreeBuilder::new(
        config,
        RegressionImpurity::default(),
        LinearSplitSearcher::new(config.min_leaf_size),
        MeanLeaf,
    )
}

/// Checks shared by both learners. Returns the residual tree options.
///
/// Losses fit unweighted constants, so weighted data is refused rather than
/// half applied through the residual trees.
fn prepare(config: &BoostingConfig, data: &TrainingData<'_>) -> Result<TreeConfig, TrainError> {
    config.validate()?;
    if data.weights().is_some() {
        return Err(TrainError::WeightsUnsupported);
    }
    let tree_config = config.tree_config();
    tree_config.check_features(data.num_features())?;
    Ok(tree_config)
}

/// Warns about residual trees that could not split, debug-logs the rest.
fn report_tree(logger: &TrainingLogger, iteration: usize, class: Option<usize>, tree: &BinaryTree) {
    let stream = class.map_or_else(String::new, |k| format!(" class {k}"));
    if tree.n_nodes() == 1 {
        logger.warn(&format!(
            "iteration {}{stream}: residual tree is a single leaf",
            iteration + 1
        ));
    } else if logger.enabled(Verbosity::Debug) {
        logger.debug(&format!(
            "iteration {}{stream}: {} leaves, depth {}",
            iteration + 1,
            tree.n_leaves(),
            tree.depth()
        ));
    }
}

/// Single score stream boosting on `targets`.
///
/// Returns the initial constant and one tree per iteration.
fn boost_single<L: BoostLoss>(
    config: &BoostingConfig,
    tree_config: &TreeConfig,
    data: &TrainingData<'_>,
    targets: &[f64],
    mut loss: L,
    logger: &TrainingLogger,
) -> (f64, Vec<BinaryTree>) {
    let observations = data.observations();
    let active = data.indices();
    let n_rows = data.num_rows();

    let initial = loss.initial_prediction(targets, active);
    let mut predictions = vec![initial; n_rows];
    let mut residuals = vec![0.0; n_rows];
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
    let mut builder = residual_tree_builder(tree_config);
    let mut trees = Vec::with_capacity(config.iterations);

    logger.info(&format!(
        "boosting {} iterations with {} loss on {} rows",
        config.iterations,
        loss.name(),
        active.len()
    ));

    for iteration in 0..config.iterations {
        let sample = subsample_rows(active, config.subsample_ratio, &mut rng);
        loss.update_residuals(targets, &predictions, &mut residuals, &sample);

        let mut tree = {
            let residual_data = data.with_targets(&residuals);
            let sampled = residual_data.with_sampled_indices(&sample);
            builder.build(&sampled, &[])
        };
        report_tree(logger, iteration, None, &tree);
        update_leaves(&mut tree, &loss, observations, targets, &predictions, &residuals, &sample);
        accumulate_predictions(&tree, config.learning_rate, observations, &mut predictions, active);

        if logger.enabled(Verbosity::Info) {
            let current = loss.loss(targets, &predictions, active);
            logger.log_iteration(iteration + 1, config.iterations, current);
        }
        trees.push(tree);
    }

    if logger.enabled(Verbosity::Info) {
        logger.log_summary(trees.len(), loss.loss(targets, &predictions, active));
    }
    (initial, trees)
}

// =============================================================================
// RegressionBoostLearner
// =============================================================================

/// Gradient boosting for regression with a pluggable loss.
///
/// # Example
///
/// ```
/// use arbor::data::{DenseMatrix, TrainingData};
/// use arbor::training::{BoostingConfig, HuberLoss, RegressionBoostLearner};
///
/// let x = DenseMatrix::from_vec((0..20).map(f64::from).collect(), 20, 1);
/// let y: Vec<f64> = (0..20).map(|i| if i < 10 { 1.0 } else { 3.0 }).collect();
/// let data = TrainingData::new(&x, &y).unwrap();
///
/// let config = BoostingConfig::builder().iterations(20).build().unwrap();
/// let learner = RegressionBoostLearner::new(config, HuberLoss::default());
/// let model = learner.learn(&data).unwrap();
/// assert!((model.predict(&[15.0]) - 3.0).abs() < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct RegressionBoostLearner<L = SquaredLoss> {
    config: BoostingConfig,
    loss: L,
}

impl<L: BoostLoss> RegressionBoostLearner<L> {
    pub fn new(config: BoostingConfig, loss: L) -> Self {
        Self { config, loss }
    }

    pub fn config(&self) -> &BoostingConfig {
        &self.config
    }

    pub fn loss(&self) -> &L {
        &self.loss
    }

    pub fn learn(&self, data: &TrainingData<'_>) -> Result<RegressionBoostModel, TrainError> {
        let tree_config = prepare(&self.config, data)?;
        let logger = TrainingLogger::new(self.config.verbosity);
        let (initial, trees) = boost_single(
            &self.config,
            &tree_config,
            data,
            data.targets(),
            self.loss.clone(),
            &logger,
        );
        Ok(RegressionBoostModel::new(
            initial,
            self.config.learning_rate,
            trees,
            data.num_features(),
        ))
    }
}

impl Default for RegressionBoostLearner<SquaredLoss> {
    fn default() -> Self {
        Self::new(BoostingConfig::default(), SquaredLoss)
    }
}

// =============================================================================
// ClassificationBoostLearner
// =============================================================================

/// Gradient boosting for classification.
///
/// Two classes use binomial deviance on the indicator of the larger class;
/// more classes use multinomial deviance with one tree per class per
/// iteration.
#[derive(Debug, Clone, Default)]
pub struct ClassificationBoostLearner {
    config: BoostingConfig,
}

impl ClassificationBoostLearner {
    pub fn new(config: BoostingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BoostingConfig {
        &self.config
    }

    pub fn learn(&self, data: &TrainingData<'_>) -> Result<ClassificationBoostModel, TrainError> {
        let tree_config = prepare(&self.config, data)?;
        let classes = distinct_classes(data);
        if classes.len() < 2 {
            return Err(TrainError::TooFewClasses(classes.len()));
        }
        let logger = TrainingLogger::new(self.config.verbosity);
        let class_targets = indicator_targets(data.targets(), &classes);

        let (initial, trees) = if classes.len() == 2 {
            let (initial, trees) = boost_single(
                &self.config,
                &tree_config,
                data,
                &class_targets[1],
                BinomialDeviance,
                &logger,
            );
            (vec![initial], vec![trees])
        } else {
            self.boost_multiclass(&tree_config, data, &class_targets, &logger)
        };

        Ok(ClassificationBoostModel::new(
            classes,
            initial,
            self.config.learning_rate,
            trees,
            data.num_features(),
        ))
    }

    /// One score stream per class; trees indexed `[class][iteration]`.
    fn boost_multiclass(
        &self,
        tree_config: &TreeConfig,
        data: &TrainingData<'_>,
        class_targets: &[Vec<f64>],
        logger: &TrainingLogger,
    ) -> (Vec<f64>, Vec<Vec<BinaryTree>>) {
        let config = &self.config;
        let observations = data.observations();
        let active = data.indices();
        let n_rows = data.num_rows();
        let n_classes = class_targets.len();
        let loss = MultinomialDeviance::new(n_classes);

        let initial = loss.initial_predictions(class_targets, active);
        let mut scores: Vec<Vec<f64>> = initial.iter().map(|&p| vec![p; n_rows]).collect();
        let mut residuals = vec![vec![0.0; n_rows]; n_classes];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        let mut builders: Vec<ResidualTreeBuilder> = (0..n_classes)
            .map(|k| {
                residual_tree_builder(&TreeConfig {
                    seed: config.seed.wrapping_add(k as u64),
                    ..tree_config.clone()
                })
            })
            .collect();
        let mut trees: Vec<Vec<BinaryTree>> = (0..n_classes)
            .map(|_| Vec::with_capacity(config.iterations))
            .collect();

        logger.info(&format!(
            "boosting {} iterations over {} classes on {} rows",
            config.iterations,
            n_classes,
            active.len()
        ));

        for iteration in 0..config.iterations {
            let sample = subsample_rows(active, config.subsample_ratio, &mut rng);
            loss.update_residuals(class_targets, &scores, &mut residuals, &sample);

            let jobs: Vec<(&mut ResidualTreeBuilder, &[f64])> = builders
                .iter_mut()
                .zip(residuals.iter().map(Vec::as_slice))
                .collect();
            let grown = config.parallelism.maybe_par_map(jobs, |(builder, residual)| {
                let class_data = data.with_targets(residual);
                let sampled = class_data.with_sampled_indices(&sample);
                builder.build(&sampled, &[])
            });

            for (k, mut tree) in grown.into_iter().enumerate() {
                report_tree(logger, iteration, Some(k), &tree);
                update_leaves(
                    &mut tree,
                    &loss,
                    observations,
                    &class_targets[k],
                    &scores[k],
                    &residuals[k],
                    &sample,
                );
                accumulate_predictions(&tree, config.learning_rate, observations, &mut scores[k], active);
                trees[k].push(tree);
            }

            if logger.enabled(Verbosity::Info) {
                let current = loss.loss(class_targets, &scores, active);
                logger.log_iteration(iteration + 1, config.iterations, current);
            }
        }

        if logger.enabled(Verbosity::Info) {
            logger.log_summary(n_classes * config.iterations, loss.loss(class_targets, &scores, active));
        }
        (initial, trees)
    }
}

/// 0/1 indicator of every class over all rows.
fn indicator_targets(targets: &[f64], classes: &[f64]) -> Vec<Vec<f64>> {
    classes
        .iter()
        .map(|&class| {
            targets
                .iter()
                .map(|&t| if t == class { 1.0 } else { 0.0 })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DenseMatrix;
    use crate::training::boosting::loss::{AbsoluteLoss, QuantileLoss};
    use crate::utils::Parallelism;

    fn step() -> (DenseMatrix, Vec<f64>) {
        let x = DenseMatrix::from_vec((0..40).map(f64::from).collect(), 40, 1);
        let y = (0..40).map(|i| if i < 20 { -2.0 } else { 4.0 }).collect();
        (x, y)
    }

    fn mse(model: &RegressionBoostModel, x: &DenseMatrix, y: &[f64]) -> f64 {
        x.rows()
            .zip(y)
            .map(|(row, t)| (model.predict(row) - t).powi(2))
            .sum::<f64>()
            / y.len() as f64
    }

    #[test]
    fn test_indicator_targets() {
        let indicators = indicator_targets(&[2.0, 0.0, 2.0], &[0.0, 2.0]);
        assert_eq!(indicators, vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_squared_boosting_fits_step() {
        let (x, y) = step();
        let data = TrainingData::new(&x, &y).unwrap();
        let config = BoostingConfig::builder().iterations(50).learning_rate(0.3).build().unwrap();
        let model = RegressionBoostLearner::new(config, SquaredLoss).learn(&data).unwrap();
        assert_eq!(model.n_trees(), 50);
        assert!(mse(&model, &x, &y) < 1e-3);
    }

    #[test]
    fn test_more_iterations_reduce_training_error() {
        let (x, y) = step();
        let data = TrainingData::new(&x, &y).unwrap();
        let error = |iterations| {
            let config = BoostingConfig::builder()
                .iterations(iterations)
                .max_depth(1)
                .build()
                .unwrap();
            let model = RegressionBoostLearner::new(config, AbsoluteLoss).learn(&data).unwrap();
            mse(&model, &x, &y)
        };
        assert!(error(30) < error(3));
    }

    #[test]
    fn test_subsampling_is_reproducible() {
        let (x, y) = step();
        let data = TrainingData::new(&x, &y).unwrap();
        let config = BoostingConfig::builder()
            .iterations(10)
            .subsample_ratio(0.5)
            .build()
            .unwrap();
        let learner = RegressionBoostLearner::new(config, QuantileLoss::new(0.5).unwrap());
        let a = learner.learn(&data).unwrap();
        let b = learner.learn(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_class_rejected() {
        let x = DenseMatrix::from_vec(vec![1.0, 2.0], 2, 1);
        let y = vec![1.0, 1.0];
        let data = TrainingData::new(&x, &y).unwrap();
        assert_eq!(
            ClassificationBoostLearner::default().learn(&data).unwrap_err(),
            TrainError::TooFewClasses(1)
        );
    }

    #[test]
    fn test_weighted_data_rejected() {
        let (x, y) = step();
        let weights = vec![2.0; y.len()];
        let data = TrainingData::new(&x, &y).unwrap().with_weights(&weights).unwrap();
        assert_eq!(
            RegressionBoostLearner::default().learn(&data).unwrap_err(),
            TrainError::WeightsUnsupported
        );
    }

    #[test]
    fn test_multiclass_parallel_matches_sequential() {
        let x = DenseMatrix::from_vec((0..30).map(f64::from).collect(), 30, 1);
        let y: Vec<f64> = (0..30).map(|i| f64::from(i / 10)).collect();
        let data = TrainingData::new(&x, &y).unwrap();
        let learn = |parallelism| {
            let config = BoostingConfig::builder()
                .iterations(5)
                .parallelism(parallelism)
                .build()
                .unwrap();
            ClassificationBoostLearner::new(config).learn(&data).unwrap()
        };
        let sequential = learn(Parallelism::Sequential);
        let parallel = learn(Parallelism::Parallel);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.n_trees(), 15);
    }
}
