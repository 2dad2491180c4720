//! Feature candidate selection and row subsampling.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

// =============================================================================
// FeatureSelector
// =============================================================================

/// Chooses the features evaluated at each node.
///
/// The selected indices are always returned in ascending order so the
/// builder's "lowest feature index wins ties" rule does not depend on the
/// draw order.
#[derive(Debug, Clone)]
pub enum FeatureSelector {
    /// Every feature at every node (classic CART).
    All,
    /// A seeded sample of `count` features without replacement, redrawn at
    /// every node.
    RandomSubset {
        count: usize,
        rng: Xoshiro256PlusPlus,
    },
}

impl FeatureSelector {
    /// `count == 0` evaluates every feature.
    pub fn new(count: usize, seed: u64) -> Self {
        if count == 0 {
            Self::All
        } else {
            Self::random_subset(count, seed)
        }
    }

    pub fn random_subset(count: usize, seed: u64) -> Self {
        Self::RandomSubset {
            count,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Fill `out` with the candidate features for the next node.
    ///
    /// A subset at least as large as `n_features` selects everything without
    /// drawing.
    pub fn select(&mut self, n_features: usize, out: &mut Vec<usize>) {
        out.clear();
        out.extend(0..n_features);
        match self {
            Self::All => {}
            Self::RandomSubset { count, .. } if *count >= n_features => {}
            Self::RandomSubset { count, rng } => {
                let count = *count;
                partial_shuffle(out, count, rng);
                out.truncate(count);
                out.sort_unstable();
            }
        }
    }
}

/// Fisher-Yates over the first `count` slots only.
fn partial_shuffle<T, R: Rng>(items: &mut [T], count: usize, rng: &mut R) {
    let n = items.len();
    for i in 0..count.min(n) {
        let j = rng.gen_range(i..n);
        items.swap(i, j);
    }
}

// =============================================================================
// Row subsampling
// =============================================================================

/// Draw `round(ratio * len)` rows (at least one) without replacement.
///
/// The result is sorted ascending. A ratio of 1.0 returns the input order
/// unchanged.
pub fn subsample_rows<R: Rng>(indices: &[usize], ratio: f64, rng: &mut R) -> Vec<usize> {
    if ratio >= 1.0 || indices.is_empty() {
        return indices.to_vec();
    }
    let size = ((ratio * indices.len() as f64).round() as usize).clamp(1, indices.len());
    let mut shuffled = indices.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(size);
    shuffled.sort_unstable();
    shuffled
}
