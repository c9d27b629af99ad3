//! Syntax-tree contract for the Mica compiler.
//!
//! The parser produces an immutable, generic tree: every node exposes an
//! operator kind, a child count, indexed child access (a child slot may be
//! explicitly absent), and a source span. The semantic core consumes
//! nothing beyond this contract, so any producer of [`node::Node`] values
//! can drive it.

pub mod node;
pub mod op;

pub use node::{Node, NodeBuilder, NodeId};
pub use op::Op;
