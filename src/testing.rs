//! Testing utilities for arbor.
//!
//! Assertion helpers and the small reference datasets used by the unit,
//! integration and benchmark suites.
//!
//! ```
//! use arbor::testing::{aptitude, DEFAULT_TOLERANCE};
//! use arbor::assert_approx_eq;
//!
//! let (x, y) = aptitude().unwrap();
//! assert_eq!(x.num_rows(), y.len());
//! assert_approx_eq!(y.iter().sum::<f64>(), 10.0, DEFAULT_TOLERANCE);
//! ```

use crate::data::{DatasetError, DenseMatrix};

// =============================================================================
// Constants
// =============================================================================

/// Default absolute tolerance for floating point comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two f64 values are within an absolute tolerance.
///
/// ```
/// # use arbor::assert_approx_eq;
/// assert_approx_eq!(1.0, 1.0001, 0.001);
/// ```
///
/// # Panics
///
/// Panics if the absolute difference exceeds the tolerance.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)` - {}\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                format_args!($($arg)+), left_val, right_val, diff, tol
            );
        }
    }};
}

/// Assert two slices are equal element-wise within `tolerance`.
///
/// # Panics
///
/// Panics if lengths differ or any element differs by more than tolerance.
pub fn assert_slice_approx_eq(actual: &[f64], expected: &[f64], tolerance: f64, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff <= tolerance,
            "{context}[{i}]: {a} ≠ {e} (diff={diff}, tolerance={tolerance})"
        );
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Mean squared error between predictions and targets.
pub fn mean_squared_error(targets: &[f64], predictions: &[f64]) -> f64 {
    debug_assert_eq!(targets.len(), predictions.len());
    if targets.is_empty() {
        return 0.0;
    }
    let sum: f64 = targets
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    sum / targets.len() as f64
}

/// Fraction of predictions that differ from the targets.
pub fn classification_error(targets: &[f64], predictions: &[f64]) -> f64 {
    debug_assert_eq!(targets.len(), predictions.len());
    if targets.is_empty() {
        return 0.0;
    }
    let wrong = targets.iter().zip(predictions).filter(|(t, p)| t != p).count();
    wrong as f64 / targets.len() as f64
}

// =============================================================================
// Reference datasets
// =============================================================================

/// Failure to read one of the bundled CSV fixtures.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("line {line}: cannot parse {value:?} as a number")]
    Parse { line: u64, value: String },

    #[error("line {line}: row has no target column")]
    MissingTarget { line: u64 },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

const APTITUDE: &str = include_str!("../tests/fixtures/aptitude.csv");
const DECISION_TREE: &str = include_str!("../tests/fixtures/decision_tree.csv");
const GLASS: &str = include_str!("../tests/fixtures/glass.csv");

/// Parse a `;`-separated table with a header line. The last column is the
/// target; every other column is a feature.
pub fn parse_csv(text: &str) -> Result<(DenseMatrix, Vec<f64>), FixtureError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut targets = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let mut values = record
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|_| FixtureError::Parse {
                    line,
                    value: field.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        let target = values
            .pop()
            .filter(|_| !values.is_empty())
            .ok_or(FixtureError::MissingTarget { line })?;
        rows.push(values);
        targets.push(target);
    }
    Ok((DenseMatrix::from_rows(&rows)?, targets))
}

/// 26 rows, 2 features (test score, months of experience), binary pass/fail.
pub fn aptitude() -> Result<(DenseMatrix, Vec<f64>), FixtureError> {
    parse_csv(APTITUDE)
}

/// 200 rows, 2 features, continuous target.
pub fn decision_tree_data() -> Result<(DenseMatrix, Vec<f64>), FixtureError> {
    parse_csv(DECISION_TREE)
}

/// 214 rows, 9 features, six glass types.
pub fn glass() -> Result<(DenseMatrix, Vec<f64>), FixtureError> {
    parse_csv(GLASS)
}
