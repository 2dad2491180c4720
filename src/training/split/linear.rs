//! Exhaustive sweep over every distinct-value boundary.

use super::{midpoint, SplitResult, SplitSearcher};
use crate::training::impurity::ImpurityCalculator;

/// Classic CART search: try every boundary between distinct values.
///
/// The sweep is O(n) after the caller's sort. Candidates are visited in
/// ascending threshold order and replace the best only on a strictly larger
/// improvement, so the lowest threshold wins ties. Improvements of zero or
/// less are never reported.
#[derive(Debug, Clone, Copy)]
pub struct LinearSplitSearcher {
    min_leaf_size: usize,
}

impl LinearSplitSearcher {
    pub fn new(min_leaf_size: usize) -> Self {
        Self {
            min_leaf_size: min_leaf_size.max(1),
        }
    }

    pub fn min_leaf_size(&self) -> usize {
        self.min_leaf_size
    }
}

impl Default for LinearSplitSearcher {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SplitSearcher for LinearSplitSearcher {
    fn find_best_split<I: ImpurityCalculator>(
        &mut self,
        calc: &mut I,
        values: &[f64],
        targets: &[f64],
        weights: Option<&[f64]>,
        parent_impurity: f64,
    ) -> Option<SplitResult> {
        let n = values.len();
        if n < 2 * self.min_leaf_size {
            return None;
        }
        calc.init(targets, weights);

        let mut best: Option<SplitResult> = None;
        let mut best_improvement = 0.0;

        for position in self.min_leaf_size..=(n - self.min_leaf_size) {
            let (prev, current) = (values[position - 1], values[position]);
            if prev == current {
                continue;
            }
            calc.update_index(position);
            let improvement = calc.impurity_improvement(parent_impurity);
            if improvement > best_improvement {
                best_improvement = improvement;
                best = Some(SplitResult::at(
                    calc,
                    position,
                    midpoint(prev, current),
                    improvement,
                ));
            }
        }

        best
    }
}
