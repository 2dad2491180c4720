//! Single-tree training integration tests.
//!
//! Reference errors are training-set errors of fixed configurations on the
//! bundled fixtures.

use arbor::testing::{aptitude, classification_error, decision_tree_data, glass, mean_squared_error};
use arbor::training::{ClassificationTreeLearner, GrowthStrategy, RegressionTreeLearner, TreeConfig};
use arbor::{assert_approx_eq, ConfigError, DenseMatrix, TrainError, TrainingData};
use rstest::rstest;

const REFERENCE_TOLERANCE: f64 = 1e-7;

fn regression_config(max_depth: usize) -> TreeConfig {
    TreeConfig::builder()
        .max_depth(max_depth)
        .min_leaf_size(4)
        .features_per_split(2)
        .min_information_gain(0.1)
        .seed(42)
        .build()
        .unwrap()
}

fn classification_config(max_depth: usize, features_per_split: usize) -> TreeConfig {
    TreeConfig::builder()
        .max_depth(max_depth)
        .min_leaf_size(1)
        .features_per_split(features_per_split)
        .min_information_gain(0.001)
        .seed(42)
        .build()
        .unwrap()
}

/// Weight `heavy` on rows whose target is below 3.0, 1.0 elsewhere.
fn low_target_weights(targets: &[f64], heavy: f64) -> Vec<f64> {
    targets
        .iter()
        .map(|&t| if t < 3.0 { heavy } else { 1.0 })
        .collect()
}

// =============================================================================
// Regression
// =============================================================================

#[rstest]
#[case(100, 0.032120286249559482)]
#[case(1, 0.55139468272009107)]
#[case(2, 0.14322350107327153)]
fn regression_reference_error(#[case] max_depth: usize, #[case] expected: f64) {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let model = RegressionTreeLearner::new(regression_config(max_depth))
        .learn(&data)
        .unwrap();

    let error = mean_squared_error(&y, &model.predict_all(&x));
    assert_approx_eq!(error, expected, REFERENCE_TOLERANCE);
}

#[rstest]
#[case(100, 1.0, 0.032120286249559482)]
#[case(1, 1.0, 0.55139468272009107)]
#[case(2, 1.0, 0.14322350107327153)]
#[case(100, 100.0, 0.032256921590414704)]
fn regression_weighted_reference_error(
    #[case] max_depth: usize,
    #[case] heavy: f64,
    #[case] expected: f64,
) {
    let (x, y) = decision_tree_data().unwrap();
    let weights = low_target_weights(&y, heavy);
    let data = TrainingData::new(&x, &y).unwrap().with_weights(&weights).unwrap();

    let model = RegressionTreeLearner::new(regression_config(max_depth))
        .learn(&data)
        .unwrap();

    let error = mean_squared_error(&y, &model.predict_all(&x));
    assert_approx_eq!(error, expected, REFERENCE_TOLERANCE);
}

#[test]
fn deeper_trees_fit_training_data_better() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let errors: Vec<f64> = [1, 2, 4, 8]
        .into_iter()
        .map(|depth| {
            let model = RegressionTreeLearner::new(regression_config(depth))
                .learn(&data)
                .unwrap();
            mean_squared_error(&y, &model.predict_all(&x))
        })
        .collect();

    assert!(errors.windows(2).all(|w| w[1] <= w[0]), "errors: {errors:?}");
}

#[test]
fn regression_tree_is_structurally_valid() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();
    let model = RegressionTreeLearner::new(regression_config(100))
        .learn(&data)
        .unwrap();

    let tree = model.tree();
    tree.validate().unwrap();
    let internal = tree.n_nodes() - tree.n_leaves();
    assert_eq!(tree.n_leaves(), internal + 1);
}

#[test]
fn random_threshold_tree_reduces_error() {
    let (x, y) = decision_tree_data().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let baseline = {
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        mean_squared_error(&y, &vec![mean; y.len()])
    };
    let model = RegressionTreeLearner::new(regression_config(10))
        .with_random_thresholds()
        .learn(&data)
        .unwrap();

    model.tree().validate().unwrap();
    assert!(mean_squared_error(&y, &model.predict_all(&x)) < baseline);
}

// =============================================================================
// Classification
// =============================================================================

#[rstest]
#[case(100, 0.038461538461538464)]
#[case(1, 0.23076923076923078)]
#[case(5, 0.076923076923076927)]
fn aptitude_reference_error(#[case] max_depth: usize, #[case] expected: f64) {
    let (x, y) = aptitude().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let model = ClassificationTreeLearner::new(classification_config(max_depth, 2))
        .learn(&data)
        .unwrap();

    let error = classification_error(&y, &model.predict_all(&x));
    assert_approx_eq!(error, expected, REFERENCE_TOLERANCE);
}

#[rstest]
#[case(100, 0.0)]
#[case(1, 0.5280373831775701)]
#[case(5, 0.16355140186915887)]
fn glass_reference_error(#[case] max_depth: usize, #[case] expected: f64) {
    let (x, y) = glass().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();

    let model = ClassificationTreeLearner::new(classification_config(max_depth, x.num_cols()))
        .learn(&data)
        .unwrap();

    let error = classification_error(&y, &model.predict_all(&x));
    assert_approx_eq!(error, expected, REFERENCE_TOLERANCE);
}

#[test]
fn unit_weights_match_unweighted_tree() {
    let (x, y) = aptitude().unwrap();
    let weights = vec![1.0; y.len()];
    let learner = ClassificationTreeLearner::new(classification_config(100, 2));

    let plain = learner.learn(&TrainingData::new(&x, &y).unwrap()).unwrap();
    let weighted = learner
        .learn(&TrainingData::new(&x, &y).unwrap().with_weights(&weights).unwrap())
        .unwrap();

    assert_eq!(plain, weighted);
}

#[test]
fn separable_stump_has_pure_leaves() {
    // Two linearly separable features, binary target.
    let x = DenseMatrix::from_rows(&[
        [1.0, 10.0],
        [2.0, 11.0],
        [3.0, 12.0],
        [7.0, 20.0],
        [8.0, 21.0],
        [9.0, 22.0],
    ])
    .unwrap();
    let y = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let data = TrainingData::new(&x, &y).unwrap();

    let config = TreeConfig::builder().max_depth(1).build().unwrap();
    let model = ClassificationTreeLearner::new(config).learn(&data).unwrap();

    let tree = model.tree();
    assert_eq!(tree.n_nodes(), 3);
    assert_eq!(tree.n_leaves(), 2);
    for row in x.rows() {
        let p = model.predict_probability(row);
        for (_, probability) in &p.probabilities {
            assert!(*probability == 0.0 || *probability == 1.0);
        }
    }
    assert_eq!(model.predict_all(&x), y.to_vec());
}

#[test]
fn constant_targets_give_single_leaf() {
    let (x, _) = aptitude().unwrap();
    let y = vec![1.0; x.num_rows()];
    let data = TrainingData::new(&x, &y).unwrap();

    let model = ClassificationTreeLearner::default().learn(&data).unwrap();

    assert_eq!(model.tree().n_nodes(), 1);
    assert!(model.predict_all(&x).iter().all(|&p| p == 1.0));
}

#[test]
fn entropy_and_laplace_variants_train() {
    let (x, y) = aptitude().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();
    let config = classification_config(3, 2);

    let entropy = ClassificationTreeLearner::new(config.clone())
        .with_entropy()
        .learn(&data)
        .unwrap();
    entropy.tree().validate().unwrap();

    let smoothed = ClassificationTreeLearner::new(config)
        .with_laplace_smoothing()
        .learn(&data)
        .unwrap();
    for row in x.rows() {
        let p = smoothed.predict_probability(row);
        let total: f64 = p.probabilities.iter().map(|(_, p)| p).sum();
        assert_approx_eq!(total, 1.0, 1e-12);
        assert!(p.probabilities.iter().all(|&(_, p)| p > 0.0 && p < 1.0));
    }
}

#[test]
fn breadth_first_respects_leaf_budget() {
    let (x, y) = glass().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();
    let config = TreeConfig::builder()
        .growth(GrowthStrategy::BreadthFirst { max_leaves: 8 })
        .build()
        .unwrap();

    let model = ClassificationTreeLearner::new(config).learn(&data).unwrap();

    model.tree().validate().unwrap();
    assert_eq!(model.tree().n_leaves(), 8);
}

#[test]
fn variable_importance_is_scaled() {
    let (x, y) = aptitude().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();
    let model = ClassificationTreeLearner::new(classification_config(100, 2))
        .learn(&data)
        .unwrap();

    let named = model.variable_importance(&["AptitudeTestScore", "PreviousExperience_month"]);
    assert_eq!(named.len(), 2);
    assert_approx_eq!(named[0].1, 100.0, 1e-12);
    assert!(named[1].1 <= named[0].1);
    assert!(model.raw_variable_importance().iter().all(|&v| v >= 0.0));
}

#[test]
fn too_many_features_per_split_is_rejected() {
    let (x, y) = aptitude().unwrap();
    let data = TrainingData::new(&x, &y).unwrap();
    let config = classification_config(5, 3);

    let err = ClassificationTreeLearner::new(config).learn(&data).unwrap_err();
    assert_eq!(
        err,
        TrainError::Config(ConfigError::InvalidFeaturesPerSplit {
            requested: 3,
            available: 2
        })
    );
}

#[test]
fn training_on_row_subset_ignores_other_rows() {
    let x = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 6, 1);
    // Rows 4 and 5 would force a second split if they were used.
    let y = [0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
    let indices = [0, 1, 2, 3];
    let data = TrainingData::new(&x, &y).unwrap().with_indices(&indices).unwrap();

    let model = ClassificationTreeLearner::default().learn(&data).unwrap();

    assert_eq!(model.tree().n_leaves(), 2);
    assert_eq!(model.predict(&[6.0]), 1.0);
}
