//! Route tree storage and construction.
//!
//! # Responsibilities
//! - Own every RouteNode in a flat arena, indexed by `NodeId`
//! - Keep a parent index (back-references only) and ordered child lists
//! - Reject sibling collisions, foreign parents, and a missing root
//!
//! # Design Decisions
//! - Nodes are moved into the builder by value, so no node can be shared
//!   between parents and no cycle can be expressed
//! - Child order is insertion order; it affects enumeration only, never matching
//! - `NodeId` carries the id of the tree that issued it, so ids from another
//!   builder are detected as dangling rather than silently aliasing

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::routing::error::RouteConfigError;
use crate::view::{FallbackView, View};

static NEXT_TREE_ID: AtomicU32 = AtomicU32::new(1);

/// Wildcard sentinel accepted by [`RouteNode::new`].
pub const WILDCARD: &str = "*";

/// Identifier of a node inside one specific route tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    tree: u32,
    index: u32,
}

impl NodeId {
    /// Position of the node in its tree's arena.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.index)
    }
}

/// One path segment of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches exactly this segment. The root uses the empty segment.
    Exact(String),
    /// Matches anything not exactly matched at its level.
    Wildcard,
}

impl Segment {
    /// Normalize a route path into a segment.
    pub fn parse(path: &str) -> Result<Self, RouteConfigError> {
        let trimmed = path.trim_matches('/');
        if trimmed == WILDCARD {
            return Ok(Segment::Wildcard);
        }
        if trimmed.contains('/') {
            return Err(RouteConfigError::InvalidSegment(path.to_string()));
        }
        Ok(Segment::Exact(trimmed.to_string()))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Exact(s) => write!(f, "/{}", s),
            Segment::Wildcard => f.write_str(WILDCARD),
        }
    }
}

/// An addressable view bound to a path segment.
pub struct RouteNode {
    path: String,
    segment: Segment,
    view: View,
    fallback: Option<FallbackView>,
    parent: Option<NodeId>,
}

impl RouteNode {
    /// Create a node. Invalid paths are reported when the node is attached.
    pub fn new(path: impl Into<String>, view: View) -> Self {
        let path = path.into();
        let segment = Segment::parse(&path).unwrap_or_else(|_| Segment::Exact(path.clone()));
        Self {
            path,
            segment,
            view,
            fallback: None,
            parent: None,
        }
    }

    /// Scope a recovery boundary to this node, rendering `fallback` on failure.
    pub fn with_fallback(mut self, fallback: FallbackView) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// The path as registered.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn fallback(&self) -> Option<&FallbackView> {
        self.fallback.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("path", &self.path)
            .field("parent", &self.parent)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Mutable construction surface for a [`RouteTree`].
#[derive(Debug)]
pub struct RouteTreeBuilder {
    tree: u32,
    nodes: Vec<RouteNode>,
    children: Vec<Vec<NodeId>>,
    root: Option<NodeId>,
}

impl Default for RouteTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTreeBuilder {
    pub fn new() -> Self {
        Self {
            tree: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            children: Vec::new(),
            root: None,
        }
    }

    /// Designate the root node.
    pub fn root(&mut self, node: RouteNode) -> Result<NodeId, RouteConfigError> {
        if let Some(existing) = self.root {
            return Err(RouteConfigError::MultipleRoots(existing));
        }
        Segment::parse(&node.path)?;
        let id = self.push(node, None);
        self.root = Some(id);
        Ok(id)
    }

    /// Attach `node` under `parent`.
    ///
    /// On error the builder is left unmodified.
    pub fn add_child(&mut self, parent: NodeId, node: RouteNode) -> Result<NodeId, RouteConfigError> {
        self.check_parent(parent)?;
        let segment = Segment::parse(&node.path)?;
        self.check_sibling(parent, &segment, &node.path)?;
        Ok(self.push(node, Some(parent)))
    }

    /// Attach several children to one parent in a single call.
    ///
    /// All-or-nothing: every node is validated (against existing siblings and
    /// against each other) before any is attached.
    pub fn add_children(
        &mut self,
        parent: NodeId,
        nodes: impl IntoIterator<Item = RouteNode>,
    ) -> Result<Vec<NodeId>, RouteConfigError> {
        self.check_parent(parent)?;
        let nodes: Vec<RouteNode> = nodes.into_iter().collect();

        let mut batch: Vec<Segment> = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let segment = Segment::parse(&node.path)?;
            self.check_sibling(parent, &segment, &node.path)?;
            if batch.contains(&segment) {
                return Err(RouteConfigError::DuplicatePath {
                    parent,
                    path: node.path.clone(),
                });
            }
            batch.push(segment);
        }

        Ok(nodes
            .into_iter()
            .map(|node| self.push(node, Some(parent)))
            .collect())
    }

    /// Freeze the tree. Fails if no root was designated.
    pub fn finalize(self) -> Result<RouteTree, RouteConfigError> {
        let root = self.root.ok_or(RouteConfigError::NoRoot)?;
        tracing::debug!(tree = self.tree, nodes = self.nodes.len(), "Route tree finalized");
        Ok(RouteTree {
            nodes: self.nodes,
            children: self.children,
            root,
        })
    }

    fn check_parent(&self, parent: NodeId) -> Result<(), RouteConfigError> {
        if parent.tree != self.tree || parent.index() >= self.nodes.len() {
            return Err(RouteConfigError::DanglingParent(parent));
        }
        Ok(())
    }

    fn check_sibling(&self, parent: NodeId, segment: &Segment, path: &str) -> Result<(), RouteConfigError> {
        let collides = self.children[parent.index()]
            .iter()
            .any(|sibling| self.nodes[sibling.index()].segment() == segment);
        if collides {
            return Err(RouteConfigError::DuplicatePath {
                parent,
                path: path.to_string(),
            });
        }
        Ok(())
    }

    fn push(&mut self, mut node: RouteNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId {
            tree: self.tree,
            index: self.nodes.len() as u32,
        };
        node.parent = parent;
        self.nodes.push(node);
        self.children.push(Vec::new());
        if let Some(parent) = parent {
            self.children[parent.index()].push(id);
        }
        id
    }
}

/// Immutable hierarchy of route nodes rooted at a single entry.
#[derive(Debug)]
pub struct RouteTree {
    nodes: Vec<RouteNode>,
    children: Vec<Vec<NodeId>>,
    root: NodeId,
}

impl RouteTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node. Ids from other trees resolve to `None`.
    pub fn node(&self, id: NodeId) -> Option<&RouteNode> {
        if id.tree != self.root.tree {
            return None;
        }
        self.nodes.get(id.index())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        if id.tree != self.root.tree {
            return &[];
        }
        self.children.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(RouteNode::parent)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The chain from the root down to `id`, inclusive.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = self.node(id).map(|_| id);
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.parent(current);
        }
        chain.reverse();
        chain
    }

    /// Child of `parent` whose segment is exactly `segment`.
    pub fn exact_child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        self.children(parent).iter().copied().find(|child| {
            matches!(self.nodes[child.index()].segment(), Segment::Exact(s) if s == segment)
        })
    }

    /// The wildcard child of `parent`, if one is registered.
    pub fn wildcard_child(&self, parent: NodeId) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.nodes[child.index()].segment().is_wildcard())
    }

    /// Whether a root-level wildcard guarantees every location resolves.
    pub fn has_root_wildcard(&self) -> bool {
        self.wildcard_child(self.root).is_some()
    }

    /// Depth-first enumeration in insertion order, with each node's depth.
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0usize, self.root)];
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            for child in self.children(id).iter().rev() {
                stack.push((depth + 1, *child));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Element, View};

    fn node(path: &str) -> RouteNode {
        RouteNode::new(path, View::new(|_| Ok(Element::empty())))
    }

    #[test]
    fn test_segment_normalization() {
        assert_eq!(Segment::parse("/").unwrap(), Segment::Exact(String::new()));
        assert_eq!(Segment::parse("/about/").unwrap(), Segment::Exact("about".into()));
        assert_eq!(Segment::parse("*").unwrap(), Segment::Wildcard);
        assert!(Segment::parse("/users/list").is_err());
    }

    #[test]
    fn test_duplicate_sibling_rejected() {
        let mut builder = RouteTreeBuilder::new();
        let root = builder.root(node("/")).unwrap();
        builder.add_child(root, node("/x")).unwrap();

        let err = builder.add_child(root, node("x")).unwrap_err();
        assert!(matches!(err, RouteConfigError::DuplicatePath { .. }));

        // Tree unchanged by the failed insert
        let tree = builder.finalize().unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_second_wildcard_rejected() {
        let mut builder = RouteTreeBuilder::new();
        let root = builder.root(node("/")).unwrap();
        builder.add_child(root, node("*")).unwrap();
        assert!(matches!(
            builder.add_child(root, node("/*")),
            Err(RouteConfigError::DuplicatePath { .. })
        ));
    }

    #[test]
    fn test_same_path_under_different_parents() {
        let mut builder = RouteTreeBuilder::new();
        let root = builder.root(node("/")).unwrap();
        let a = builder.add_child(root, node("/a")).unwrap();
        let b = builder.add_child(root, node("/b")).unwrap();
        builder.add_child(a, node("/x")).unwrap();
        builder.add_child(b, node("/x")).unwrap();
        assert_eq!(builder.finalize().unwrap().len(), 5);
    }

    #[test]
    fn test_dangling_parent() {
        let mut other = RouteTreeBuilder::new();
        let foreign = other.root(node("/")).unwrap();

        let mut builder = RouteTreeBuilder::new();
        builder.root(node("/")).unwrap();
        assert_eq!(
            builder.add_child(foreign, node("/a")).unwrap_err(),
            RouteConfigError::DanglingParent(foreign)
        );
    }

    #[test]
    fn test_no_root() {
        let builder = RouteTreeBuilder::new();
        assert_eq!(builder.finalize().unwrap_err(), RouteConfigError::NoRoot);
    }

    #[test]
    fn test_single_root() {
        let mut builder = RouteTreeBuilder::new();
        builder.root(node("/")).unwrap();
        assert!(matches!(
            builder.root(node("/")),
            Err(RouteConfigError::MultipleRoots(_))
        ));
    }

    #[test]
    fn test_add_children_is_atomic() {
        let mut builder = RouteTreeBuilder::new();
        let root = builder.root(node("/")).unwrap();

        let err = builder
            .add_children(root, vec![node("/a"), node("/b"), node("/a")])
            .unwrap_err();
        assert!(matches!(err, RouteConfigError::DuplicatePath { .. }));

        let err = builder
            .add_children(root, vec![node("/c"), node("/bad/path")])
            .unwrap_err();
        assert!(matches!(err, RouteConfigError::InvalidSegment(_)));

        let tree = builder.finalize().unwrap();
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn test_walk_and_ancestors() {
        let mut builder = RouteTreeBuilder::new();
        let root = builder.root(node("/")).unwrap();
        let ids = builder
            .add_children(root, vec![node("/dashboard"), node("/users"), node("*")])
            .unwrap();
        let detail = builder.add_child(ids[1], node("/detail")).unwrap();
        let tree = builder.finalize().unwrap();

        let paths: Vec<(usize, &str)> = tree
            .walk()
            .into_iter()
            .map(|(depth, id)| (depth, tree.node(id).unwrap().path()))
            .collect();
        assert_eq!(
            paths,
            vec![(0, "/"), (1, "/dashboard"), (1, "/users"), (2, "/detail"), (1, "*")]
        );

        assert_eq!(tree.ancestors(detail), vec![root, ids[1], detail]);
        assert_eq!(tree.parent(detail), Some(ids[1]));
        assert!(tree.has_root_wildcard());
    }
}
