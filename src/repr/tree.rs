//! Flat binary tree storage.
//!
//! - [`BinaryTree`]: index-addressed node array plus the leaf payload table
//! - [`TreeValidationError`]: structural validation errors
//!
//! The root is always node 0. Nodes are only ever appended during growth, so
//! node and leaf indices stay stable for the lifetime of the tree. The
//! post-hoc leaf updater depends on that when it addresses leaves by index.

use crate::data::MatrixView;

use super::node::Node;
use super::prediction::ProbabilityPrediction;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`BinaryTree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,

    #[error("node at position {position} records index {recorded}")]
    NodeIndexMismatch { position: usize, recorded: i32 },

    #[error("node {node}: {side} child {child} is out of bounds for {n_nodes} nodes")]
    ChildOutOfBounds {
        node: usize,
        side: &'static str,
        child: i32,
        n_nodes: usize,
    },

    #[error("node {node}: {side} child {child} does not come after its parent")]
    ChildNotAfterParent {
        node: usize,
        side: &'static str,
        child: usize,
    },

    #[error("node {node} mixes leaf and split fields")]
    InconsistentNode { node: usize },

    #[error("leaf {node} has payload index {leaf_index}, table has {n_payloads} rows")]
    LeafIndexOutOfBounds {
        node: usize,
        leaf_index: i32,
        n_payloads: usize,
    },

    #[error("payload index {leaf_index} is used by more than one leaf")]
    DuplicateLeafIndex { leaf_index: usize },

    #[error("tree has {n_leaves} leaves but {n_payloads} payload rows")]
    LeafTableMismatch { n_leaves: usize, n_payloads: usize },

    #[error("node {node} is reached by more than one path")]
    DuplicateVisit { node: usize },

    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: usize },
}

// ============================================================================
// BinaryTree
// ============================================================================

/// A trained CART tree.
///
/// `probabilities` is the leaf payload table, one row per leaf addressed by
/// [`Node::leaf_index`]. Classification leaves hold one probability per entry
/// of `classes`; regression leaves hold an empty row.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryTree {
    nodes: Vec<Node>,
    probabilities: Vec<Vec<f64>>,
    classes: Vec<f64>,
    variable_importance: Vec<f64>,
}

impl BinaryTree {
    pub fn new(
        nodes: Vec<Node>,
        probabilities: Vec<Vec<f64>>,
        classes: Vec<f64>,
        variable_importance: Vec<f64>,
    ) -> Self {
        Self {
            nodes,
            probabilities,
            classes,
            variable_importance,
        }
    }

    // =========================================================================
    // Structure
    // =========================================================================

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Leaf payload table.
    #[inline]
    pub fn probabilities(&self) -> &[Vec<f64>] {
        &self.probabilities
    }

    /// Sorted distinct target classes; empty for regression trees.
    #[inline]
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Raw per-feature importance accumulated during growth.
    #[inline]
    pub fn variable_importance(&self) -> &[f64] {
        &self.variable_importance
    }

    /// Depth of the deepest leaf (a single-leaf tree has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            let node = &self.nodes[index];
            match (node.left(), node.right()) {
                (Some(left), Some(right)) => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
                _ => max_depth = max_depth.max(depth),
            }
        }
        max_depth
    }

    /// Iterate over `(node_index, node)` for every leaf.
    pub fn iter_leaves(&self) -> impl Iterator<Item = (usize, &Node)> + '_ {
        self.nodes.iter().enumerate().filter(|(_, n)| n.is_leaf())
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Route `row` from the root to its leaf and return the leaf.
    ///
    /// Goes left when `row[feature] <= threshold`, else right.
    pub fn leaf(&self, row: &[f64]) -> &Node {
        let mut node = &self.nodes[0];
        while let (Some(feature), Some(left), Some(right)) = (node.feature(), node.left(), node.right())
        {
            node = if row[feature] <= node.value() {
                &self.nodes[left]
            } else {
                &self.nodes[right]
            };
        }
        node
    }

    /// Scalar prediction: the leaf's value.
    #[inline]
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.leaf(row).value()
    }

    /// Class-probability prediction from the leaf's payload row.
    pub fn predict_probability(&self, row: &[f64]) -> ProbabilityPrediction {
        let leaf = self.leaf(row);
        let probabilities = leaf
            .leaf_index()
            .map(|i| self.probabilities[i].as_slice())
            .unwrap_or(&[]);
        ProbabilityPrediction::new(
            leaf.value(),
            self.classes
                .iter()
                .copied()
                .zip(probabilities.iter().copied())
                .collect(),
        )
    }

    /// Group `indices` by the leaf they are routed to.
    ///
    /// The result has one entry per leaf payload row, in leaf index order.
    /// Each entry lists the sample indices that land in that leaf, in the
    /// order they appear in `indices`.
    pub fn leaf_region_indices(&self, observations: &MatrixView<'_>, indices: &[usize]) -> Vec<Vec<usize>> {
        let mut regions = vec![Vec::new(); self.probabilities.len()];
        for &index in indices {
            if let Some(leaf) = self.leaf(observations.row(index)).leaf_index() {
                regions[leaf].push(index);
            }
        }
        regions
    }

    // =========================================================================
    // Slot replacement
    // =========================================================================

    /// Overwrite the value of the leaf at `node_index`.
    ///
    /// Builds a replacement record with the same structure and payload index.
    pub(crate) fn replace_leaf_value(&mut self, node_index: usize, value: f64) {
        let node = self.nodes[node_index];
        debug_assert!(node.is_leaf(), "node {node_index} is not a leaf");
        self.nodes[node_index] = node.with_value(value);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check the structural invariants.
    ///
    /// Every split node has two in-range children stored after it, every
    /// leaf owns a distinct payload row, leaf and payload counts agree, and
    /// every node is reached from the root exactly once.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.nodes.len();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let n_payloads = self.probabilities.len();
        let mut payload_used = vec![false; n_payloads];
        let mut n_leaves = 0;

        for (position, node) in self.nodes.iter().enumerate() {
            if node.node_index() != position as i32 {
                return Err(TreeValidationError::NodeIndexMismatch {
                    position,
                    recorded: node.node_index(),
                });
            }

            if node.is_leaf() {
                if node.left_index() != -1 || node.right_index() != -1 {
                    return Err(TreeValidationError::InconsistentNode { node: position });
                }
                let leaf_index = match node.leaf_index() {
                    Some(i) if i < n_payloads => i,
                    _ => {
                        return Err(TreeValidationError::LeafIndexOutOfBounds {
                            node: position,
                            leaf_index: node.leaf_probability_index(),
                            n_payloads,
                        })
                    }
                };
                if std::mem::replace(&mut payload_used[leaf_index], true) {
                    return Err(TreeValidationError::DuplicateLeafIndex { leaf_index });
                }
                n_leaves += 1;
                continue;
            }

            if node.leaf_probability_index() != -1 {
                return Err(TreeValidationError::InconsistentNode { node: position });
            }
            for (side, child) in [("left", node.left_index()), ("right", node.right_index())] {
                let child_usize = match usize::try_from(child) {
                    Ok(c) if c < n_nodes => c,
                    _ => {
                        return Err(TreeValidationError::ChildOutOfBounds {
                            node: position,
                            side,
                            child,
                            n_nodes,
                        })
                    }
                };
                if child_usize <= position {
                    return Err(TreeValidationError::ChildNotAfterParent {
                        node: position,
                        side,
                        child: child_usize,
                    });
                }
            }
        }

        if n_leaves != n_payloads {
            return Err(TreeValidationError::LeafTableMismatch {
                n_leaves,
                n_payloads,
            });
        }

        // Children always come after their parent, so a plain DFS cannot
        // cycle; it only has to catch shared children and orphans.
        let mut visited = vec![false; n_nodes];
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut visited[index], true) {
                return Err(TreeValidationError::DuplicateVisit { node: index });
            }
            let node = &self.nodes[index];
            if let (Some(left), Some(right)) = (node.left(), node.right()) {
                stack.push(right);
                stack.push(left);
            }
        }
        if let Some(node) = visited.iter().position(|v| !v) {
            return Err(TreeValidationError::UnreachableNode { node });
        }

        Ok(())
    }
}
