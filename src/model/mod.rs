//! Trained models.
//!
//! Every model owns its trees outright and is read-only after training.
//!
//! - [`RegressionTreeModel`], [`ClassificationTreeModel`]: a single CART tree
//! - [`RegressionBoostModel`], [`ClassificationBoostModel`]: boosted ensembles

mod boosting;
mod tree;

pub use boosting::{ClassificationBoostModel, RegressionBoostModel};
pub use tree::{ClassificationTreeModel, RegressionTreeModel};

/// Scale raw importances so the largest is 100 and pair them with names,
/// most important first.
///
/// Features without a name in `feature_names` are called `f{index}`. An
/// all-zero vector stays zero.
pub(crate) fn named_importance(raw: &[f64], feature_names: &[&str]) -> Vec<(String, f64)> {
    let max = raw.iter().copied().fold(0.0, f64::max);
    let scale = if max > 0.0 { 100.0 / max } else { 0.0 };
    let mut named: Vec<(String, f64)> = raw
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let name = feature_names
                .get(i)
                .map_or_else(|| format!("f{i}"), |name| (*name).to_string());
            (name, value * scale)
        })
        .collect();
    // Stable sort keeps feature order among equal importances.
    named.sort_by(|a, b| b.1.total_cmp(&a.1));
    named
}
