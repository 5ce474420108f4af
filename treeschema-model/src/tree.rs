//! The Tree Adapter contract (§4.A): the abstraction the validation engine
//! consumes over a live, read-only hierarchical container.

use thiserror::Error;

use crate::{AttrValue, Dtype};

/// Whether a tree node is a group (has children) or a dataset (has a
/// typed, shaped payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A named interior node containing children
    Group,
    /// A leaf node with a typed, shaped payload
    Dataset,
}

/// An error reading element values from a dataset (§4.A `read_values`, §7).
#[derive(Debug, Error)]
#[error("failed to read values: {0}")]
pub struct IoError(pub String);

/// Abstracts the container being validated: path navigation, node kind,
/// dtype descriptor, shape, attribute map, and element reader.
///
/// Implementations are read-only; the engine never calls a mutating method
/// because there isn't one. This mirrors `diskplan_filesystem::Filesystem`,
/// but the analogue here is a borrowed, read-only handle rather than a
/// trait with both read and write operations, since validation never
/// mutates the tree (§5).
pub trait Tree {
    /// An opaque handle to a node within this tree.
    type NodeId: Copy + Eq + std::hash::Hash;

    /// The root node, always a group.
    fn root(&self) -> Self::NodeId;

    /// Whether `node` is a group or a dataset.
    fn kind(&self, node: Self::NodeId) -> NodeKind;

    /// The children of a group node, in unspecified order.
    fn children(&self, node: Self::NodeId) -> Vec<(String, Self::NodeId)>;

    /// The attributes attached to any node, in unspecified order.
    fn attrs(&self, node: Self::NodeId) -> Vec<(String, AttrValue)>;

    /// The dtype descriptor of a dataset node.
    fn dtype(&self, node: Self::NodeId) -> Dtype;

    /// The shape of a dataset node.
    fn shape(&self, node: Self::NodeId) -> Vec<u64>;

    /// Reads every element value of a dataset node.
    ///
    /// Only invoked for datasets whose schema carries a value constraint
    /// (`enum`, `const`, `minLength`, `maxLength`, `pattern`, `format`).
    fn read_values(&self, node: Self::NodeId) -> Result<Vec<crate::Scalar>, IoError>;
}
