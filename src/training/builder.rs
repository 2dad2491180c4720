//! Tree growth loop.
//!
//! [`TreeBuilder`] grows a [`BinaryTree`] with an explicit worklist of
//! pending regions instead of recursion, so depth is bounded by memory rather
//! than the call stack.
//!
//! A region is a contiguous range of a private work buffer of sample indices.
//! Splitting a region reorders its range by the winning feature, after which
//! the left child owns the front of the range and the right child the back.
//! Every sample index therefore ends up in exactly one leaf.
//!
//! Nodes are appended when a region is popped, and the parent's child slot is
//! patched by replacing the parent record. Child indices are therefore always
//! greater than the parent's.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::data::TrainingData;
use crate::repr::{BinaryTree, Node};
use crate::training::config::{GrowthStrategy, TreeConfig};
use crate::training::impurity::ImpurityCalculator;
use crate::training::leaf::LeafFactory;
use crate::training::sampling::FeatureSelector;
use crate::training::split::{SplitResult, SplitSearcher};

// =============================================================================
// Region bookkeeping
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// A pending region of the work buffer.
#[derive(Debug, Clone, Copy)]
struct Region {
    start: usize,
    end: usize,
    depth: usize,
    impurity: f64,
    parent: Option<(usize, Side)>,
}

impl Region {
    #[inline]
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Winning split of one region.
#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    split: SplitResult,
}

// =============================================================================
// Scratch buffers
// =============================================================================

/// Per-build scratch space, reused across regions and features.
#[derive(Debug, Default)]
struct Scratch {
    features: Vec<usize>,
    order: Vec<usize>,
    best_order: Vec<usize>,
    values: Vec<f64>,
    targets: Vec<f64>,
    weights: Vec<f64>,
}

impl Scratch {
    /// Gather targets (and weights, if any) of `indices` in order.
    fn gather(&mut self, data: &TrainingData<'_>, indices: &[usize]) {
        let targets = data.targets();
        self.targets.clear();
        self.targets.extend(indices.iter().map(|&i| targets[i]));
        self.weights.clear();
        if let Some(weights) = data.weights() {
            self.weights.extend(indices.iter().map(|&i| weights[i]));
        }
    }

    fn weights(&self, data: &TrainingData<'_>) -> Option<&[f64]> {
        data.weights().map(|_| self.weights.as_slice())
    }
}

// =============================================================================
// TreeBuilder
// =============================================================================

/// Grows one tree from training data.
///
/// Generic over the impurity metric, the split searcher and the leaf policy.
/// The builder owns its feature selector and searcher, so consecutive builds
/// continue their random streams rather than replaying them.
#[derive(Debug)]
pub struct TreeBuilder<I, S, L> {
    impurity: I,
    searcher: S,
    leaf_factory: L,
    features: FeatureSelector,
    max_depth: usize,
    min_leaf_size: usize,
    min_information_gain: f64,
    growth: GrowthStrategy,
}

impl<I, S, L> TreeBuilder<I, S, L>
where
    I: ImpurityCalculator,
    S: SplitSearcher,
    L: LeafFactory,
{
    /// `config` is assumed to be validated.
    pub fn new(config: &TreeConfig, impurity: I, searcher: S, leaf_factory: L) -> Self {
        Self {
            impurity,
            searcher,
            leaf_factory,
            features: FeatureSelector::new(config.features_per_split, config.seed),
            max_depth: config.max_depth,
            min_leaf_size: config.min_leaf_size,
            min_information_gain: config.min_information_gain,
            growth: config.growth,
        }
    }

    /// Grow a tree over `data.indices()`.
    ///
    /// `classes` is the sorted distinct class list for classification and
    /// empty for regression.
    pub fn build(&mut self, data: &TrainingData<'_>, classes: &[f64]) -> BinaryTree {
        let mut work = data.indices().to_vec();
        let total = work.len() as f64;
        let mut scratch = Scratch::default();
        let mut nodes: Vec<Node> = Vec::new();
        let mut payloads: Vec<Vec<f64>> = Vec::new();
        let mut importance = vec![0.0; data.num_features()];
        let max_splits = self.growth.max_splits();
        let mut n_splits = 0usize;

        self.impurity.prepare(classes);
        scratch.gather(data, &work);
        self.impurity.init(&scratch.targets, scratch.weights(data));
        let root = Region {
            start: 0,
            end: work.len(),
            depth: 0,
            impurity: self.impurity.node_impurity(),
            parent: None,
        };

        let mut pending = VecDeque::from([root]);
        while let Some(region) = self.next_region(&mut pending) {
            let node_index = nodes.len();
            if let Some((parent, side)) = region.parent {
                nodes[parent] = match side {
                    Side::Left => nodes[parent].with_left(node_index),
                    Side::Right => nodes[parent].with_right(node_index),
                };
            }

            let budget_left = max_splits.map_or(true, |max| n_splits < max);
            let can_split = budget_left
                && region.depth < self.max_depth
                && region.len() >= 2 * self.min_leaf_size;

            let best = if can_split {
                self.find_split(data, &mut work[region.start..region.end], region.impurity, &mut scratch)
            } else {
                None
            };

            match best {
                Some(BestSplit { feature, split }) if split.improvement >= self.min_information_gain => {
                    trace!(
                        node = node_index,
                        feature,
                        threshold = split.threshold,
                        improvement = split.improvement,
                        "split accepted"
                    );
                    n_splits += 1;
                    importance[feature] += split.improvement * region.len() as f64 / total;
                    nodes.push(Node::split(feature, split.threshold, node_index));

                    let mid = region.start + split.split_index;
                    let left = Region {
                        start: region.start,
                        end: mid,
                        depth: region.depth + 1,
                        impurity: split.impurity_left,
                        parent: Some((node_index, Side::Left)),
                    };
                    let right = Region {
                        start: mid,
                        end: region.end,
                        depth: region.depth + 1,
                        impurity: split.impurity_right,
                        parent: Some((node_index, Side::Right)),
                    };
                    self.push_children(&mut pending, left, right);
                }
                _ => {
                    let owned = &work[region.start..region.end];
                    scratch.gather(data, owned);
                    let leaf = self
                        .leaf_factory
                        .create(&scratch.targets, scratch.weights(data), classes);
                    trace!(node = node_index, samples = owned.len(), value = leaf.value, "leaf");
                    nodes.push(Node::leaf(leaf.value, node_index, payloads.len()));
                    payloads.push(leaf.probabilities);
                }
            }
        }

        debug!(
            nodes = nodes.len(),
            leaves = payloads.len(),
            samples = work.len(),
            "tree built"
        );
        BinaryTree::new(nodes, payloads, classes.to_vec(), importance)
    }

    fn next_region(&self, pending: &mut VecDeque<Region>) -> Option<Region> {
        match self.growth {
            GrowthStrategy::DepthFirst => pending.pop_back(),
            GrowthStrategy::BreadthFirst { .. } => pending.pop_front(),
        }
    }

    /// Queue children so the left child is always processed first.
    fn push_children(&self, pending: &mut VecDeque<Region>, left: Region, right: Region) {
        match self.growth {
            GrowthStrategy::DepthFirst => {
                pending.push_back(right);
                pending.push_back(left);
            }
            GrowthStrategy::BreadthFirst { .. } => {
                pending.push_back(left);
                pending.push_back(right);
            }
        }
    }

    /// Search every candidate feature of one region.
    ///
    /// On success `region` is left ordered by the winning feature so the
    /// split index partitions it.
    fn find_split(
        &mut self,
        data: &TrainingData<'_>,
        region: &mut [usize],
        parent_impurity: f64,
        scratch: &mut Scratch,
    ) -> Option<BestSplit> {
        let observations = data.observations();
        let mut best: Option<BestSplit> = None;

        let mut features = std::mem::take(&mut scratch.features);
        self.features.select(data.num_features(), &mut features);

        for &feature in &features {
            scratch.order.clear();
            scratch.order.extend_from_slice(region);
            scratch.order.sort_unstable_by(|&a, &b| {
                observations
                    .value(a, feature)
                    .total_cmp(&observations.value(b, feature))
                    .then(a.cmp(&b))
            });

            scratch.values.clear();
            scratch
                .values
                .extend(scratch.order.iter().map(|&i| observations.value(i, feature)));
            let order = std::mem::take(&mut scratch.order);
            scratch.gather(data, &order);
            scratch.order = order;

            let candidate = self.searcher.find_best_split(
                &mut self.impurity,
                &scratch.values,
                &scratch.targets,
                scratch.weights(data),
                parent_impurity,
            );

            if let Some(split) = candidate {
                let improves = best.map_or(true, |b| split.improvement > b.split.improvement);
                if improves {
                    best = Some(BestSplit { feature, split });
                    scratch.best_order.clear();
                    scratch.best_order.extend_from_slice(&scratch.order);
                }
            }
        }
        scratch.features = features;

        if best.is_some() {
            region.copy_from_slice(&scratch.best_order);
        }
        best
    }
}
