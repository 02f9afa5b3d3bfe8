//! Route configuration errors.

use thiserror::Error;

use crate::routing::tree::NodeId;

/// Errors raised while building a route tree or resolving a location against it.
///
/// All variants are configuration defects: they abort bootstrap before any
/// rendering happens and are never recovered at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteConfigError {
    /// A sibling with the same segment (or a second wildcard) already exists.
    #[error("duplicate route path '{path}' under {parent}")]
    DuplicatePath { parent: NodeId, path: String },

    /// The parent reference does not belong to the tree being built.
    #[error("parent {0} is not part of this route tree")]
    DanglingParent(NodeId),

    /// `finalize` was called before a root was designated.
    #[error("route tree has no root")]
    NoRoot,

    /// A root was already designated for this tree.
    #[error("route tree already has a root ({0})")]
    MultipleRoots(NodeId),

    /// A node path contains an inner separator and cannot be a single segment.
    #[error("route path '{0}' is not a single path segment")]
    InvalidSegment(String),

    /// No exact node and no wildcard covers the location.
    #[error("no route matches '{location}' (register a root-level '*' route)")]
    NoRouteMatch { location: String },
}
