//! Tree node record.

/// Sentinel for "no feature", "no child" and "no leaf payload".
pub const NO_INDEX: i32 = -1;

/// One node of a [`BinaryTree`](super::BinaryTree).
///
/// Nodes are values: once created their fields never change. Updating a node
/// means building a replacement with one of the `with_*` methods and writing
/// it back into the tree's slot.
///
/// For a split node `value` is the threshold (`row[feature] <= value` routes
/// left). For a leaf it is the payload: the regression value, or the most
/// likely class for classification trees.
///
/// `feature_index == -1` iff both children are `-1` iff
/// `leaf_probability_index >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    feature_index: i32,
    value: f64,
    left_index: i32,
    right_index: i32,
    node_index: i32,
    leaf_probability_index: i32,
}

#[inline]
pub(crate) fn to_index(i: usize) -> i32 {
    debug_assert!(i <= i32::MAX as usize, "index {i} does not fit a node record");
    i as i32
}

impl Node {
    /// A leaf at position `node_index` owning payload row `leaf_index`.
    pub fn leaf(value: f64, node_index: usize, leaf_index: usize) -> Self {
        Self {
            feature_index: NO_INDEX,
            value,
            left_index: NO_INDEX,
            right_index: NO_INDEX,
            node_index: to_index(node_index),
            leaf_probability_index: to_index(leaf_index),
        }
    }

    /// A split node with no children attached yet.
    ///
    /// Children are patched in with [`with_left`](Self::with_left) and
    /// [`with_right`](Self::with_right) once they have been appended.
    pub fn split(feature: usize, threshold: f64, node_index: usize) -> Self {
        Self {
            feature_index: to_index(feature),
            value: threshold,
            left_index: NO_INDEX,
            right_index: NO_INDEX,
            node_index: to_index(node_index),
            leaf_probability_index: NO_INDEX,
        }
    }

    // =========================================================================
    // Replacement constructors
    // =========================================================================

    /// Same node with a new `value`.
    #[must_use]
    pub fn with_value(self, value: f64) -> Self {
        Self { value, ..self }
    }

    /// Same node with `left` as its left child.
    #[must_use]
    pub fn with_left(self, left: usize) -> Self {
        Self {
            left_index: to_index(left),
            ..self
        }
    }

    /// Same node with `right` as its right child.
    #[must_use]
    pub fn with_right(self, right: usize) -> Self {
        Self {
            right_index: to_index(right),
            ..self
        }
    }

    // =========================================================================
    // Raw fields
    // =========================================================================

    #[inline]
    pub fn feature_index(&self) -> i32 {
        self.feature_index
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn left_index(&self) -> i32 {
        self.left_index
    }

    #[inline]
    pub fn right_index(&self) -> i32 {
        self.right_index
    }

    #[inline]
    pub fn node_index(&self) -> i32 {
        self.node_index
    }

    #[inline]
    pub fn leaf_probability_index(&self) -> i32 {
        self.leaf_probability_index
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.feature_index == NO_INDEX
    }

    /// Split feature, `None` for leaves.
    #[inline]
    pub fn feature(&self) -> Option<usize> {
        usize::try_from(self.feature_index).ok()
    }

    #[inline]
    pub fn left(&self) -> Option<usize> {
        usize::try_from(self.left_index).ok()
    }

    #[inline]
    pub fn right(&self) -> Option<usize> {
        usize::try_from(self.right_index).ok()
    }

    /// Row in the leaf payload table, `None` for split nodes.
    #[inline]
    pub fn leaf_index(&self) -> Option<usize> {
        usize::try_from(self.leaf_probability_index).ok()
    }
}
