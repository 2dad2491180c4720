//! Gradient boosting integration tests.
//!
//! Focused on behavior: fitted ensembles beat their constant start, runs are
//! reproducible, and every stream holds valid trees.

use std::io;
use std::sync::{Arc, Mutex};

use arbor::testing::{
    aptitude, assert_slice_approx_eq, classification_error, decision_tree_data, glass, mean_squared_error,
};
use arbor::training::{
    AbsoluteLoss, BoostLoss, BoostingConfig, ClassificationBoostLearner, HuberLoss, QuantileLoss,
    RegressionBoostLearner, SquaredLoss, Verbosity,
};
use arbor::{assert_approx_eq, ConfigError, DenseMatrix, Parallelism, TrainError, TrainingData};
use tracing_subscriber::EnvFilter;

fn config(iterations: usize) -> BoostingConfig {
    BoostingConfig::builder()
        .iterations(iterations)
        .learning_rate(0.1)
        .max_depth(3)
        .build()
        .unwrap()
}

fn constant_error(y: &[f64]) -> f64 {
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    mean_squared_error(y, &vec![mean; y.len()])
}

fn fits_better_than_constant<L: BoostLoss>(loss: L) {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let model = RegressionBoostLearner::new(config(50), loss).learn(&data).unwrap();

    assert_eq!(model.n_trees(), 50);
    for tree in model.trees() {
        tree.validate().unwrap();
    }
    let error = mean_squared_error(&y, &model.predict_all(&x));
    assert!(error < constant_error(&y), "error {error}");
}

// =============================================================================
// Regression
// =============================================================================

#[test]
fn squared_loss_fits_better_than_constant() {
    fits_better_than_constant(SquaredLoss);
}

#[test]
fn absolute_loss_fits_better_than_constant() {
    fits_better_than_constant(AbsoluteLoss);
}

#[test]
fn huber_loss_fits_better_than_constant() {
    fits_better_than_constant(HuberLoss::default());
}

#[test]
fn quantile_loss_at_median_fits_better_than_constant() {
    fits_better_than_constant(QuantileLoss::new(0.5).unwrap());
}

#[test]
fn more_iterations_reduce_squared_training_error() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let errors: Vec<f64> = [5, 20, 80]
        .into_iter()
        .map(|iterations| {
            let model = RegressionBoostLearner::new(config(iterations), SquaredLoss)
                .learn(&data)
                .unwrap();
            mean_squared_error(&y, &model.predict_all(&x))
        })
        .collect();

    assert!(errors.windows(2).all(|w| w[1] < w[0]), "errors: {errors:?}");
}

#[test]
fn initial_prediction_is_target_mean_for_squared_loss() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let model = RegressionBoostLearner::new(config(1), SquaredLoss).learn(&data).unwrap();

    let mean = y.iter().sum::<f64>() / y.len() as f64;
    assert_approx_eq!(model.initial_prediction(), mean, 1e-12);
}

#[test]
fn predictions_are_shrunken_tree_sums() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let model = RegressionBoostLearner::new(config(10), HuberLoss::default())
        .learn(&data)
        .unwrap();

    let expected: Vec<f64> = x
        .rows()
        .map(|row| {
            let boost: f64 = model.trees().iter().map(|tree| tree.predict(row)).sum();
            model.initial_prediction() + model.learning_rate() * boost
        })
        .collect();
    assert_slice_approx_eq(&model.predict_all(&x), &expected, 1e-12, "huber ensemble");
}

#[test]
fn stochastic_boosting_is_reproducible() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();
    let config = BoostingConfig::builder()
        .iterations(30)
        .subsample_ratio(0.5)
        .seed(7)
        .build()
        .unwrap();

    let learner = RegressionBoostLearner::new(config, SquaredLoss);
    let first = learner.learn(&data).unwrap();
    let second = learner.learn(&data).unwrap();

    assert_eq!(first, second);
    assert!(mean_squared_error(&y, &first.predict_all(&x)) < constant_error(&y));
}

#[test]
fn boosting_importance_covers_all_features() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let model = RegressionBoostLearner::new(config(20), SquaredLoss).learn(&data).unwrap();

    let raw = model.raw_variable_importance();
    assert_eq!(raw.len(), 2);
    let named = model.variable_importance(&["F1", "F2"]);
    assert_approx_eq!(named[0].1, 100.0, 1e-12);
}

#[test]
fn invalid_boosting_options_are_rejected() {
    assert_eq!(
        BoostingConfig::builder().iterations(0).build().unwrap_err(),
        ConfigError::InvalidIterations
    );
    assert_eq!(
        BoostingConfig::builder().learning_rate(0.0).build().unwrap_err(),
        ConfigError::InvalidLearningRate(0.0)
    );
    assert_eq!(
        BoostingConfig::builder().subsample_ratio(1.5).build().unwrap_err(),
        ConfigError::InvalidSubsampleRatio(1.5)
    );
    assert_eq!(HuberLoss::new(1.5).unwrap_err(), ConfigError::InvalidAlpha(1.5));
    assert_eq!(QuantileLoss::new(1.0).unwrap_err(), ConfigError::InvalidAlpha(1.0));
    assert!(HuberLoss::new(1.0).is_ok());
}

#[test]
fn huber_at_full_alpha_trains() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let full = RegressionBoostLearner::new(config(20), HuberLoss::new(1.0).unwrap())
        .learn(&data)
        .unwrap();

    full.trees().iter().for_each(|tree| tree.validate().unwrap());
    assert!(mean_squared_error(&y, &full.predict_all(&x)) < constant_error(&y));
}

#[test]
fn weighted_data_is_rejected_by_boosting() {
    let x = DenseMatrix::from_vec(vec![1.0; 4], 4, 1);
    let weights = [1.0, 1.0, 1.0, 100.0];

    let y = [0.0, 0.0, 0.0, 10.0];
    let data = TrainingData::new(&x, &y).unwrap().with_weights(&weights).unwrap();
    let err = RegressionBoostLearner::new(config(1), SquaredLoss).learn(&data).unwrap_err();
    assert_eq!(err, TrainError::WeightsUnsupported);

    let labels = [0.0, 0.0, 0.0, 1.0];
    let data = TrainingData::new(&x, &labels).unwrap().with_weights(&weights).unwrap();
    let err = ClassificationBoostLearner::new(config(1)).learn(&data).unwrap_err();
    assert_eq!(err, TrainError::WeightsUnsupported);
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn binomial_boosting_fits_aptitude() {
    let (x, y) = aptitude().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let model = ClassificationBoostLearner::new(config(50)).learn(&data).unwrap();

    assert_eq!(model.classes(), &[0.0, 1.0]);
    assert_eq!(model.n_trees(), 50);
    let error = classification_error(&y, &model.predict_all(&x));
    assert!(error < 0.1, "error {error}");

    for p in model.predict_probability_all(&x) {
        let total: f64 = p.probabilities.iter().map(|(_, p)| p).sum();
        assert_approx_eq!(total, 1.0, 1e-12);
    }
}

#[test]
fn multinomial_boosting_fits_glass() {
    let (x, y) = glass().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let model = ClassificationBoostLearner::new(config(30)).learn(&data).unwrap();

    assert_eq!(model.classes(), &[1.0, 2.0, 3.0, 5.0, 6.0, 7.0]);
    assert_eq!(model.n_trees(), 30 * 6);
    let error = classification_error(&y, &model.predict_all(&x));
    assert!(error < 0.35, "error {error}");

    for p in model.predict_probability_all(&x) {
        let total: f64 = p.probabilities.iter().map(|(_, p)| p).sum();
        assert_approx_eq!(total, 1.0, 1e-9);
    }
}

#[test]
fn parallel_and_sequential_multiclass_agree() {
    let (x, y) = glass().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();
    let build = |parallelism: Parallelism| {
        let config = BoostingConfig::builder()
            .iterations(5)
            .parallelism(parallelism)
            .build()
            .unwrap();
        ClassificationBoostLearner::new(config).learn(&data).unwrap()
    };

    assert_eq!(build(Parallelism::Parallel), build(Parallelism::Sequential));
}

#[test]
fn single_class_is_rejected() {
    let x = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0], 3, 1);
    let y = [4.0, 4.0, 4.0];
    let data = TrainingData::new(&x, &y).unwrap();

    let err = ClassificationBoostLearner::default().learn(&data).unwrap_err();
    assert_eq!(err, TrainError::TooFewClasses(1));
}

// =============================================================================
// Logging
// =============================================================================

/// In-memory sink for formatted `tracing` output.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that records every training logger event into
/// a buffer. Tree builder diagnostics are filtered out.
fn capture_logs(f: impl FnOnce()) -> String {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_env_filter(EnvFilter::new("arbor::training::logger=trace"))
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    logs.contents()
}

fn verbose_config(iterations: usize, verbosity: Verbosity) -> BoostingConfig {
    BoostingConfig::builder()
        .iterations(iterations)
        .verbosity(verbosity)
        .build()
        .unwrap()
}

#[test]
fn info_verbosity_reports_every_iteration() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let output = capture_logs(|| {
        RegressionBoostLearner::new(verbose_config(3, Verbosity::Info), SquaredLoss)
            .learn(&data)
            .unwrap();
    });

    assert_eq!(output.matches("boosting iteration").count(), 3, "{output}");
    assert!(output.contains("n_iterations=3"), "{output}");
    assert!(output.contains("training finished"), "{output}");
    assert!(!output.contains("DEBUG"), "{output}");
}

#[test]
fn silent_verbosity_emits_nothing() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let output = capture_logs(|| {
        RegressionBoostLearner::new(verbose_config(3, Verbosity::Silent), SquaredLoss)
            .learn(&data)
            .unwrap();
    });

    assert!(output.is_empty(), "{output}");
}

#[test]
fn single_leaf_trees_are_warned_about() {
    let x = DenseMatrix::from_vec((0..8).map(f64::from).collect(), 8, 1);
    let y = [2.0; 8];
    let data = TrainingData::new(&x, &y).unwrap();

    let output = capture_logs(|| {
        RegressionBoostLearner::new(verbose_config(2, Verbosity::Warning), SquaredLoss)
            .learn(&data)
            .unwrap();
    });

    assert_eq!(output.matches("residual tree is a single leaf").count(), 2, "{output}");
    assert!(output.contains("WARN"), "{output}");
    assert!(!output.contains("boosting iteration"), "{output}");
}

#[test]
fn debug_verbosity_reports_tree_shapes() {
    let (x, y) = glass().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let output = capture_logs(|| {
        ClassificationBoostLearner::new(verbose_config(1, Verbosity::Debug))
            .learn(&data)
            .unwrap();
    });

    assert!(output.contains("iteration 1 class 0:"), "{output}");
    assert!(output.contains("leaves, depth"), "{output}");
    assert!(output.contains("boosting iteration"), "{output}");
}
