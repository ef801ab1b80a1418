//! Render node tree.
//!
//! Every attached element has exactly one [`RenderNode`], stored in a
//! [`RenderTree`] arena under the container's root node. Nodes hold the
//! resolved style, the computed box geometry, interpolation snapshots and
//! the interaction state used by hit-testing and navigation.

mod node;
mod tree;

pub use node::{NodeAreas, NodeKind, NodeState, RenderNode, CARET_BLINK_SECONDS};
pub use tree::{RenderTree, TreeSnapshot};
