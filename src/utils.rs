//! Common utilities used across the crate.
//!
//! Order statistics used by the boosting losses, the NaN policy applied to
//! log/exp arithmetic, and the parallelism flag threaded through training.

use rayon::prelude::*;

// =============================================================================
// Statistical Utilities
// =============================================================================

/// Replace `NaN` with `0.0`.
///
/// Deviance losses take logs and ratios of quantities that can be zero. Their
/// results go through this before they are stored or compared.
#[inline]
pub fn nan_to_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Logistic function `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Median of `values`.
///
/// Even-length inputs average the two middle values. Returns `NaN` for an
/// empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    }
}

/// Score at `percentile` (in `[0, 1]`) with linear interpolation.
///
/// `percentile == 0` returns the minimum and `percentile == 1` the maximum.
/// Anything in between reads position `percentile * (n - 1)` of the sorted
/// values and interpolates between its two neighbours. Returns `NaN` for an
/// empty slice.
pub fn score_at_percentile(values: &[f64], percentile: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last = sorted.len() - 1;

    if percentile >= 1.0 {
        return sorted[last];
    }
    if percentile <= 0.0 {
        return sorted[0];
    }

    let position = percentile * last as f64;
    let lower = position.floor() as usize;
    if lower >= last {
        return sorted[last];
    }
    let fraction = position - lower as f64;
    sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
}

/// Weighted mean of `values`. Missing weights count as 1.0.
///
/// Returns `0.0` when the total weight is zero.
pub fn weighted_mean(values: &[f64], weights: Option<&[f64]>) -> f64 {
    let (sum, total) = match weights {
        Some(w) => values
            .iter()
            .zip(w)
            .fold((0.0, 0.0), |(s, t), (&v, &w)| (s + v * w, t + w)),
        None => (values.iter().sum(), values.len() as f64),
    };
    if total == 0.0 {
        0.0
    } else {
        sum / total
    }
}

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// Passed through training components. When `Parallel`, components may use
/// `rayon` parallel iterators; when `Sequential` they iterate in order.
/// Components never manage thread pools themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    #[default]
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if the rayon pool has multiple threads)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map `f` over `iter`, in parallel when allowed. Output order matches
    /// input order in both modes.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_median_odd_and_even() {
        assert_abs_diff_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_abs_diff_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_score_at_percentile_bounds() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_abs_diff_eq!(score_at_percentile(&values, 0.0), 1.0);
        assert_abs_diff_eq!(score_at_percentile(&values, 1.0), 5.0);
        assert_abs_diff_eq!(score_at_percentile(&values, 0.5), 3.0);
    }

    #[test]
    fn test_score_at_percentile_interpolates() {
        // position = 0.9 * 3 = 2.7 -> 3 + 0.7 * (4 - 3)
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(score_at_percentile(&values, 0.9), 3.7, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_to_zero() {
        assert_eq!(nan_to_zero(f64::NAN), 0.0);
        assert_eq!(nan_to_zero(1.5), 1.5);
        assert_eq!(nan_to_zero(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_weighted_mean() {
        assert_abs_diff_eq!(weighted_mean(&[1.0, 3.0], None), 2.0);
        assert_abs_diff_eq!(weighted_mean(&[1.0, 3.0], Some(&[3.0, 1.0])), 1.5);
        assert_eq!(weighted_mean(&[1.0], Some(&[0.0])), 0.0);
    }

    #[test]
    fn test_parallelism_from_threads() {
        assert_eq!(Parallelism::from_threads(1), Parallelism::Sequential);
        assert!(Parallelism::from_threads(4).is_parallel());
    }

    #[test]
    fn test_maybe_par_map_preserves_order() {
        let seq = Parallelism::Sequential.maybe_par_map(0..8usize, |i| i * 2);
        let par = Parallelism::Parallel.maybe_par_map(0..8usize, |i| i * 2);
        assert_eq!(seq, par);
        assert_eq!(seq, vec![0, 2, 4, 6, 8, 10, 12, 14]);
    }
}
