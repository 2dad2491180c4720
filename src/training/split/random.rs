//! Single random threshold per feature (extremely randomised trees).

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{SplitResult, SplitSearcher};
use crate::training::impurity::ImpurityCalculator;

/// Draws one threshold uniformly in `[min, max)` of the column and cuts at
/// the first sample above it.
///
/// If the draw lands exactly on `max` the threshold becomes `min`. A draw that
/// would leave a side with fewer than `min_leaf_size` samples yields no split.
#[derive(Debug, Clone)]
pub struct RandomSplitSearcher {
    min_leaf_size: usize,
    rng: Xoshiro256PlusPlus,
}

impl RandomSplitSearcher {
    pub fn new(min_leaf_size: usize, seed: u64) -> Self {
        Self {
            min_leaf_size: min_leaf_size.max(1),
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl SplitSearcher for RandomSplitSearcher {
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
        let (min, max) = (values[0], values[n - 1]);
        if min == max {
            return None;
        }

        let mut threshold = self.rng.gen::<f64>() * (max - min) + min;
        if threshold >= max {
            threshold = min;
        }

        let split_index = values.partition_point(|&v| v <= threshold);
        if split_index < self.min_leaf_size || n - split_index < self.min_leaf_size {
            return None;
        }

        calc.init(targets, weights);
        calc.update_index(split_index);
        let improvement = calc.impurity_improvement(parent_impurity);
        Some(SplitResult::at(calc, split_index, threshold, improvement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::impurity::RegressionImpurity;

    #[test]
    fn test_split_is_consistent_with_threshold() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let targets = [1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0];
        let mut searcher = RandomSplitSearcher::new(1, 7);
        let mut calc = RegressionImpurity::default();
        for _ in 0..20 {
            if let Some(split) = searcher.find_best_split(&mut calc, &values, &targets, None, 0.0) {
                assert!(split.threshold >= 1.0 && split.threshold < 8.0);
                assert!(values[..split.split_index].iter().all(|&v| v <= split.threshold));
                assert!(values[split.split_index..].iter().all(|&v| v > split.threshold));
            }
        }
    }

    #[test]
    fn test_constant_column_has_no_split() {
        let mut searcher = RandomSplitSearcher::new(1, 42);
        let mut calc = RegressionImpurity::default();
        assert!(searcher
            .find_best_split(&mut calc, &[3.0; 4], &[1.0, 2.0, 3.0, 4.0], None, 0.0)
            .is_none());
    }

    #[test]
    fn test_same_seed_same_thresholds() {
        let values = [0.5, 1.5, 2.5, 3.5, 4.5];
        let targets = [0.0, 1.0, 0.0, 1.0, 0.0];
        let run = |seed| {
            let mut searcher = RandomSplitSearcher::new(1, seed);
            let mut calc = RegressionImpurity::default();
            (0..5)
                .map(|_| {
                    searcher
                        .find_best_split(&mut calc, &values, &targets, None, 0.0)
                        .map(|s| s.threshold)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(3), run(3));
    }
}
