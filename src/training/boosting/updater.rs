//! Post-hoc leaf updates and prediction accumulation.
//!
//! After a boosting iteration's tree is grown on residuals, the loss may
//! replace each leaf's mean with a robust statistic over the samples the leaf
//! owns. Leaves are addressed by their stable payload index, and each update
//! replaces the node record in its slot without touching the structure.
//! Only then is the tree folded into the running predictions.

use crate::data::MatrixView;
use crate::repr::BinaryTree;
use crate::training::boosting::loss::{LeafSamples, LeafUpdate};

/// Recompute every leaf of `tree` from the samples in `indices` it owns.
///
/// Leaves that own no sample in `indices` keep their value. Does nothing when
/// the loss does not need leaf updates.
#[allow(clippy::too_many_arguments)]
pub fn update_leaves<U: LeafUpdate + ?Sized>(
    tree: &mut BinaryTree,
    loss: &U,
    observations: &MatrixView<'_>,
    targets: &[f64],
    predictions: &[f64],
    residuals: &[f64],
    indices: &[usize],
) {
    if !loss.needs_leaf_update() {
        return;
    }

    let regions = tree.leaf_region_indices(observations, indices);
    let leaves: Vec<(usize, usize)> = tree
        .iter_leaves()
        .filter_map(|(node_index, node)| node.leaf_index().map(|leaf| (node_index, leaf)))
        .collect();

    for (node_index, leaf) in leaves {
        let owned = &regions[leaf];
        if owned.is_empty() {
            continue;
        }
        let value = loss.leaf_value(&LeafSamples {
            targets,
            predictions,
            residuals,
            indices: owned,
        });
        tree.replace_leaf_value(node_index, value);
    }
}

/// Add `learning_rate * tree(row)` to `predictions[row]` for every row in
/// `indices`.
pub fn accumulate_predictions(
    tree: &BinaryTree,
    learning_rate: f64,
    observations: &MatrixView<'_>,
    predictions: &mut [f64],
    indices: &[usize],
) {
    for &i in indices {
        predictions[i] += learning_rate * tree.predict(observations.row(i));
    }
}
