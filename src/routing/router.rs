//! Location ownership and navigation.
//!
//! # Responsibilities
//! - Own the current location and the node it matched
//! - Resolve every navigation through the matcher
//! - Advance the navigation epoch so superseded work is discarded
//! - Broadcast a `LocationChanged` notification for location-dependent chrome
//!
//! # Design Decisions
//! - Shares the frozen tree via Arc (no locks on the read path)
//! - Navigating to the current location is a no-op (no epoch advance, no event)
//! - Last write wins: renders always read the latest location, and tokens
//!   issued for earlier locations are dead
//! - A failed match leaves the router untouched

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::observability::metrics;
use crate::routing::epoch::{EpochToken, NavigationEpoch};
use crate::routing::error::RouteConfigError;
use crate::routing::matcher::{match_location, Location};
use crate::routing::tree::{NodeId, RouteTree};

const EVENT_CAPACITY: usize = 16;

/// Notification emitted after every effective navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChanged {
    pub from: Option<Location>,
    pub to: Location,
    pub node: NodeId,
    pub epoch: u64,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The location changed; the matched subtree must be re-rendered.
    Changed(NodeId),
    /// Already at this location.
    Unchanged,
}

/// Stateful owner of the current location.
#[derive(Debug)]
pub struct Router {
    tree: Arc<RouteTree>,
    current: Option<Location>,
    matched: Option<NodeId>,
    epoch: NavigationEpoch,
    events: broadcast::Sender<LocationChanged>,
}

impl Router {
    pub fn new(tree: Arc<RouteTree>) -> Self {
        if !tree.has_root_wildcard() {
            tracing::warn!("Route tree has no root-level wildcard; unknown locations will fail");
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tree,
            current: None,
            matched: None,
            epoch: NavigationEpoch::new(),
            events,
        }
    }

    /// Move to `location`.
    pub fn navigate(&mut self, location: impl Into<Location>) -> Result<Navigation, RouteConfigError> {
        let location = location.into();
        if self.current.as_ref() == Some(&location) {
            tracing::trace!(location = %location, "Navigation to current location ignored");
            return Ok(Navigation::Unchanged);
        }

        let node = match_location(&self.tree, &location)?;
        let from = self.current.replace(location.clone());
        self.matched = Some(node);
        let epoch = self.epoch.advance();

        tracing::debug!(
            from = ?from.as_ref().map(Location::as_str),
            to = %location,
            node = %node,
            epoch,
            "Navigated"
        );
        metrics::record_navigation();

        // No receivers is fine: chrome may not be listening yet.
        let _ = self.events.send(LocationChanged {
            from,
            to: location,
            node,
            epoch,
        });
        Ok(Navigation::Changed(node))
    }

    /// Subscribe to `LocationChanged` notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<LocationChanged> {
        self.events.subscribe()
    }

    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    pub fn matched(&self) -> Option<NodeId> {
        self.matched
    }

    pub fn tree(&self) -> &Arc<RouteTree> {
        &self.tree
    }

    /// Nodes to render for the current location, root first.
    pub fn chain(&self) -> Vec<NodeId> {
        self.matched
            .map(|node| self.tree.ancestors(node))
            .unwrap_or_default()
    }

    /// Token for work started on behalf of the current location.
    pub fn token(&self) -> EpochToken {
        self.epoch.token()
    }

    /// Invalidate every outstanding token without changing location.
    pub fn retire(&self) {
        self.epoch.advance();
    }
}
