//! Classification impurities over weighted class counts.

use std::marker::PhantomData;

use super::{ChildImpurities, ImpurityCalculator};

/// Impurity of one side given its weighted class counts.
pub trait Criterion: Default {
    /// `total` is the sum of `counts`. Must return 0 when `total == 0`.
    fn impurity(counts: &[f64], total: f64) -> f64;
}

/// Gini impurity `1 - Σ p²`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gini;

impl Criterion for Gini {
    #[inline]
    fn impurity(counts: &[f64], total: f64) -> f64 {
        if total <= 0.0 {
            return 0.0;
        }
        let sum_sq: f64 = counts.iter().map(|c| c * c).sum();
        1.0 - sum_sq / (total * total)
    }
}

/// Shannon entropy `-Σ p log₂ p`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Entropy;

impl Criterion for Entropy {
    #[inline]
    fn impurity(counts: &[f64], total: f64) -> f64 {
        if total <= 0.0 {
            return 0.0;
        }
        counts
            .iter()
            .filter(|&&c| c > 0.0)
            .map(|&c| {
                let p = c / total;
                -p * p.log2()
            })
            .sum()
    }
}

pub type GiniImpurity = ClassificationImpurity<Gini>;
pub type EntropyImpurity = ClassificationImpurity<Entropy>;

/// Class-count bookkeeping shared by the classification criteria.
///
/// Improvement is `parent - wL/w * impurity(left) - wR/w * impurity(right)`.
#[derive(Debug, Clone, Default)]
pub struct ClassificationImpurity<C: Criterion> {
    classes: Vec<f64>,
    /// Class position of each loaded sample.
    class_of: Vec<usize>,
    weights: Vec<f64>,

    total: Vec<f64>,
    left: Vec<f64>,
    right: Vec<f64>,
    weighted_total: f64,
    weighted_left: f64,
    weighted_right: f64,

    position: usize,
    _criterion: PhantomData<C>,
}

impl<C: Criterion> ClassificationImpurity<C> {
    #[inline]
    fn class_position(&self, target: f64) -> usize {
        // Targets always come from the set the classes were derived from.
        self.classes
            .binary_search_by(|c| c.total_cmp(&target))
            .unwrap_or_else(|insert_at| insert_at.min(self.classes.len().saturating_sub(1)))
    }

    #[inline]
    fn weight(&self, i: usize) -> f64 {
        if self.weights.is_empty() {
            1.0
        } else {
            self.weights[i]
        }
    }
}

impl<C: Criterion> ImpurityCalculator for ClassificationImpurity<C> {
    fn prepare(&mut self, classes: &[f64]) {
        self.classes.clear();
        self.classes.extend_from_slice(classes);
        let k = classes.len();
        self.total = vec![0.0; k];
        self.left = vec![0.0; k];
        self.right = vec![0.0; k];
    }

    fn init(&mut self, targets: &[f64], weights: Option<&[f64]>) {
        self.class_of.clear();
        for &t in targets {
            let position = self.class_position(t);
            self.class_of.push(position);
        }
        self.weights.clear();
        if let Some(w) = weights {
            self.weights.extend_from_slice(w);
        }

        self.total.iter_mut().for_each(|c| *c = 0.0);
        self.weighted_total = 0.0;
        for i in 0..self.class_of.len() {
            let w = self.weight(i);
            self.total[self.class_of[i]] += w;
            self.weighted_total += w;
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.position = 0;
        self.left.iter_mut().for_each(|c| *c = 0.0);
        self.right.copy_from_slice(&self.total);
        self.weighted_left = 0.0;
        self.weighted_right = self.weighted_total;
    }

    fn update_index(&mut self, position: usize) {
        debug_assert!(
            position >= self.position,
            "new position {position} must not be before current {}",
            self.position
        );
        let mut moved = 0.0;
        for i in self.position..position {
            let w = self.weight(i);
            let class = self.class_of[i];
            self.left[class] += w;
            self.right[class] -= w;
            moved += w;
        }
        self.weighted_left += moved;
        self.weighted_right -= moved;
        self.position = position;
    }

    fn node_impurity(&self) -> f64 {
        C::impurity(&self.total, self.weighted_total)
    }

    fn child_impurities(&self) -> ChildImpurities {
        ChildImpurities {
            left: C::impurity(&self.left, self.weighted_left),
            right: C::impurity(&self.right, self.weighted_right),
        }
    }

    fn impurity_improvement(&self, parent_impurity: f64) -> f64 {
        if self.weighted_total <= 0.0 {
            return 0.0;
        }
        let children = self.child_impurities();
        let left = self.weighted_left / self.weighted_total * children.left;
        let right = self.weighted_right / self.weighted_total * children.right;
        parent_impurity - left - right
    }

    #[inline]
    fn weighted_left(&self) -> f64 {
        self.weighted_left
    }

    #[inline]
    fn weighted_right(&self) -> f64 {
        self.weighted_right
    }
}
