//! Tree representation.
//!
//! A tree is an ordered array of [`Node`] records addressed by index, with
//! the root at 0, plus a parallel leaf payload table. There are no pointers:
//! children are integer indices and "mutating" a node means replacing the
//! record in its slot.

mod node;
mod prediction;
mod tree;

pub use node::{Node, NO_INDEX};
pub(crate) use node::to_index;
pub use prediction::ProbabilityPrediction;
pub use tree::{BinaryTree, TreeValidationError};
