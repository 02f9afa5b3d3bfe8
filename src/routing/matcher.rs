//! Location matching logic.
//!
//! # Responsibilities
//! - Split a location into path segments (query and fragment ignored)
//! - Descend the tree one segment at a time by exact match
//! - Fall back to a wildcard when no exact child exists at a level
//!
//! # Design Decisions
//! - Exact segment beats a wildcard sibling at the same level
//! - A wildcard consumes the rest of the location
//! - On a dead end below a level without a wildcard, the deepest wildcard seen
//!   on the walked path wins; a root-level `*` therefore covers everything
//! - No regex, no parameters: O(depth × siblings)

use std::fmt;

use crate::routing::error::RouteConfigError;
use crate::routing::tree::{NodeId, RouteTree};

/// Opaque path string that navigation operates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path portion without query string or fragment.
    pub fn path(&self) -> &str {
        let end = self.0.find(['?', '#']).unwrap_or(self.0.len());
        &self.0[..end]
    }

    /// Non-empty path segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path().split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Location {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Location {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Outcome of resolving a location against a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Matched(NodeId),
    NoMatch,
}

impl MatchResult {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            MatchResult::Matched(id) => Some(*id),
            MatchResult::NoMatch => None,
        }
    }
}

/// Resolve `location` to the single node that should render.
pub fn resolve(tree: &RouteTree, location: &Location) -> MatchResult {
    let mut current = tree.root();
    let mut deepest_wildcard = tree.wildcard_child(current);

    for segment in location.segments() {
        if let Some(child) = tree.exact_child(current, segment) {
            current = child;
            if let Some(wildcard) = tree.wildcard_child(current) {
                deepest_wildcard = Some(wildcard);
            }
            continue;
        }
        return match tree.wildcard_child(current).or(deepest_wildcard) {
            Some(wildcard) => MatchResult::Matched(wildcard),
            None => MatchResult::NoMatch,
        };
    }

    MatchResult::Matched(current)
}

/// Like [`resolve`], but a missing match is reported as a configuration error.
pub fn match_location(tree: &RouteTree, location: &Location) -> Result<NodeId, RouteConfigError> {
    resolve(tree, location)
        .node()
        .ok_or_else(|| RouteConfigError::NoRouteMatch {
            location: location.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::tree::{RouteNode, RouteTreeBuilder};
    use crate::view::{Element, View};

    fn node(path: &str) -> RouteNode {
        RouteNode::new(path, View::new(|_| Ok(Element::empty())))
    }

    fn path_of(tree: &RouteTree, location: &str) -> String {
        let id = match_location(tree, &Location::from(location)).unwrap();
        tree.node(id).unwrap().path().to_string()
    }

    fn web_tree() -> RouteTree {
        let mut builder = RouteTreeBuilder::new();
        let root = builder.root(node("/")).unwrap();
        builder
            .add_children(root, vec![node("/about"), node("*")])
            .unwrap();
        builder.finalize().unwrap()
    }

    #[test]
    fn test_root_exact_and_wildcard() {
        let tree = web_tree();
        assert_eq!(path_of(&tree, "/about"), "/about");
        assert_eq!(path_of(&tree, "/missing"), "*");
        assert_eq!(path_of(&tree, "/"), "/");
        assert_eq!(path_of(&tree, ""), "/");
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        let tree = web_tree();
        assert_eq!(path_of(&tree, "/about?tab=team"), "/about");
        assert_eq!(path_of(&tree, "/about/#top"), "/about");
    }

    #[test]
    fn test_exact_match_independent_of_insertion_order() {
        let orders: [&[&str]; 3] = [
            &["*", "/a", "/b"],
            &["/b", "*", "/a"],
            &["/a", "/b", "*"],
        ];
        for order in orders {
            let mut builder = RouteTreeBuilder::new();
            let root = builder.root(node("/")).unwrap();
            builder
                .add_children(root, order.iter().map(|p| node(p)))
                .unwrap();
            let tree = builder.finalize().unwrap();

            assert_eq!(path_of(&tree, "/a"), "/a");
            assert_eq!(path_of(&tree, "/b"), "/b");
            assert_eq!(path_of(&tree, "/c"), "*");
        }
    }

    #[test]
    fn test_deeper_levels() {
        let mut builder = RouteTreeBuilder::new();
        let root = builder.root(node("/")).unwrap();
        let users = builder.add_child(root, node("/users")).unwrap();
        builder.add_child(root, node("*")).unwrap();
        builder.add_child(users, node("/active")).unwrap();
        let settings = builder.add_child(root, node("/settings")).unwrap();
        builder.add_child(settings, node("*")).unwrap();
        let tree = builder.finalize().unwrap();

        assert_eq!(path_of(&tree, "/users/active"), "/active");
        // users has no wildcard: the root-level wildcard covers it
        let id = match_location(&tree, &"/users/unknown".into()).unwrap();
        assert_eq!(tree.parent(id), Some(tree.root()));
        // settings has its own wildcard, which is deeper
        let id = match_location(&tree, &"/settings/unknown/more".into()).unwrap();
        assert_eq!(tree.parent(id), Some(settings));
    }

    #[test]
    fn test_no_wildcard_is_no_match() {
        let mut builder = RouteTreeBuilder::new();
        let root = builder.root(node("/")).unwrap();
        builder.add_child(root, node("/about")).unwrap();
        let tree = builder.finalize().unwrap();

        assert!(!tree.has_root_wildcard());
        assert_eq!(resolve(&tree, &"/missing".into()), MatchResult::NoMatch);
        assert_eq!(
            match_location(&tree, &"/missing".into()).unwrap_err(),
            RouteConfigError::NoRouteMatch {
                location: "/missing".into()
            }
        );
    }
}
