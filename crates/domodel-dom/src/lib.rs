//! domodel DOM - Host document
//!
//! Arena-backed in-memory document tree used as the target of model runs.
//! Nodes are addressed by [`NodeId`] and never freed; detaching a node only
//! unlinks it from its parent.

mod node;
mod tree;
mod document;
mod events;
mod operations;
mod properties;
mod serialize;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children};
pub use document::Document;
pub use events::{DomEvent, EventTarget, EventHandler, ListenerOptions};
pub use operations::{DomError, DomResult};
pub use properties::attribute_value;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The document node of every tree
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Convert a sentinel id into an `Option`
    #[inline]
    pub fn some(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}
