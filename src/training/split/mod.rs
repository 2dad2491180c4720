//! Split search over one sorted feature column.
//!
//! The tree builder hands a searcher the region's feature values in
//! ascending order together with the matching targets and weights. The
//! searcher loads them into an [`ImpurityCalculator`] and reports the best
//! eligible cut, if any.
//!
//! A cut at position `p` sends sorted samples `[0, p)` left and `[p, n)`
//! right. Equal feature values are never separated, and both sides must hold
//! at least `min_leaf_size` samples.

mod linear;
mod random;

pub use linear::LinearSplitSearcher;
pub use random::RandomSplitSearcher;

use crate::training::impurity::ImpurityCalculator;

// =============================================================================
// SplitResult
// =============================================================================

/// Best cut found in one feature column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitResult {
    /// Number of sorted samples sent to the left child.
    pub split_index: usize,
    /// Samples with `value <= threshold` go left.
    pub threshold: f64,
    pub improvement: f64,
    pub impurity_left: f64,
    pub impurity_right: f64,
}

impl SplitResult {
    pub(crate) fn at<I: ImpurityCalculator>(
        calc: &I,
        split_index: usize,
        threshold: f64,
        improvement: f64,
    ) -> Self {
        let children = calc.child_impurities();
        Self {
            split_index,
            threshold,
            improvement,
            impurity_left: children.left,
            impurity_right: children.right,
        }
    }
}

// =============================================================================
// SplitSearcher
// =============================================================================

/// Finds a threshold in one sorted feature column.
pub trait SplitSearcher {
    /// Search `values` (ascending) for a cut.
    ///
    /// `targets` and `weights` are aligned with `values`. Returns `None` when
    /// no eligible cut exists, e.g. a constant column or a region smaller than
    /// `2 * min_leaf_size`.
    fn find_best_split<I: ImpurityCalculator>(
        &mut self,
        calc: &mut I,
        values: &[f64],
        targets: &[f64],
        weights: Option<&[f64]>,
        parent_impurity: f64,
    ) -> Option<SplitResult>;
}

/// Midpoint between two adjacent distinct sorted values.
///
/// Falls back to `lower` when rounding would put the midpoint on `upper`,
/// which would route `upper` to the wrong side.
#[inline]
pub(crate) fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = (lower + upper) * 0.5;
    if mid >= upper {
        lower
    } else {
        mid
    }
}
