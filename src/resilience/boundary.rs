//! Recovery boundary for rendered subtrees.
//!
//! # States
//! - Stable: wrapped children render normally
//! - Errored: the fallback renders with the captured failure and a reset control
//!
//! # State Transitions
//! ```text
//! Stable → Errored: a wrapped render returns a failure (captured verbatim)
//! Errored → Stable: explicit reset only; also requests a full reload
//! ```
//!
//! # Design Decisions
//! - The nearest boundary to the failure transitions; it returns the fallback
//!   as a success, so enclosing boundaries never observe the failure
//! - Failures raised by the fallback itself propagate past this boundary
//! - No automatic or timed recovery
//! - Reset reloads the whole application rather than remounting locally:
//!   any client state may have been corrupted by the failure

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::observability::metrics;
use crate::routing::NodeId;
use crate::view::{Element, FallbackView, RenderFailure};

/// Identifies a boundary within one mounted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryId {
    /// The boundary the composition root places above the router.
    Shell,
    /// A boundary scoped to a route node with a fallback view.
    Node(NodeId),
}

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryId::Shell => f.write_str("shell"),
            BoundaryId::Node(id) => write!(f, "{}", id),
        }
    }
}

/// Two-state recovery machine owned by a single boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryState {
    Stable,
    Errored { error: RenderFailure },
}

impl RecoveryState {
    pub fn is_stable(&self) -> bool {
        matches!(self, RecoveryState::Stable)
    }
}

/// Shared flag through which a reset asks the host for a full reload.
#[derive(Debug, Clone, Default)]
pub struct ReloadSignal(Arc<AtomicBool>);

impl ReloadSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Consume a pending request.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Reset control handed to fallback views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetAction {
    boundary: BoundaryId,
}

impl ResetAction {
    pub fn boundary(&self) -> BoundaryId {
        self.boundary
    }

    /// A button the host maps back to `Shell::reset`.
    pub fn control(&self, label: &str) -> Element {
        Element::tag("button")
            .attr("type", "button")
            .attr("data-reset", self.boundary.to_string())
            .with_text(label)
    }
}

/// Subtree-scoped failure isolator.
#[derive(Debug)]
pub struct RecoveryBoundary {
    id: BoundaryId,
    fallback: FallbackView,
    state: RefCell<RecoveryState>,
    reload: ReloadSignal,
}

impl RecoveryBoundary {
    /// Mount a boundary. It starts `Stable`.
    pub fn new(id: BoundaryId, fallback: FallbackView, reload: ReloadSignal) -> Self {
        Self {
            id,
            fallback,
            state: RefCell::new(RecoveryState::Stable),
            reload,
        }
    }

    pub fn id(&self) -> BoundaryId {
        self.id
    }

    pub fn state(&self) -> RecoveryState {
        self.state.borrow().clone()
    }

    /// Render the wrapped subtree through this boundary.
    ///
    /// While `Errored`, `render` is not invoked at all.
    pub fn guard<F>(&self, render: F) -> Result<Element, RenderFailure>
    where
        F: FnOnce() -> Result<Element, RenderFailure>,
    {
        let captured = match &*self.state.borrow() {
            RecoveryState::Errored { error } => Some(error.clone()),
            RecoveryState::Stable => None,
        };
        if let Some(error) = captured {
            return self.render_fallback(&error);
        }

        match render() {
            Ok(element) => Ok(element),
            Err(error) => {
                tracing::error!(boundary = %self.id, error = %error, "Render failure captured");
                metrics::record_boundary_trip(&self.id.to_string());
                *self.state.borrow_mut() = RecoveryState::Errored { error: error.clone() };
                self.render_fallback(&error)
            }
        }
    }

    /// User-invoked reset. Returns false (and does nothing) when `Stable`.
    pub fn reset(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.is_stable() {
            tracing::debug!(boundary = %self.id, "Reset ignored: boundary is stable");
            return false;
        }
        *state = RecoveryState::Stable;
        tracing::info!(boundary = %self.id, "Boundary reset, requesting full reload");
        self.reload.request();
        true
    }

    fn render_fallback(&self, error: &RenderFailure) -> Result<Element, RenderFailure> {
        let reset = ResetAction { boundary: self.id };
        self.fallback.render(error, &reset).inspect_err(|e| {
            tracing::error!(boundary = %self.id, error = %e, "Fallback failed; propagating");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fallback() -> FallbackView {
        FallbackView::new(|error, reset| {
            Ok(Element::tag("div")
                .child(Element::tag("pre").with_text(error.message()))
                .child(reset.control("Reload")))
        })
    }

    fn boundary(reload: &ReloadSignal) -> RecoveryBoundary {
        RecoveryBoundary::new(BoundaryId::Shell, fallback(), reload.clone())
    }

    #[test]
    fn test_failure_transitions_to_errored() {
        let reload = ReloadSignal::new();
        let b = boundary(&reload);
        assert!(b.state().is_stable());

        let out = b.guard(|| Err(RenderFailure::new("boom: a very long message that is kept"))).unwrap();
        assert!(out.to_html().contains("boom: a very long message that is kept"));
        assert!(out.to_html().contains("data-reset=\"shell\""));
        assert_eq!(
            b.state(),
            RecoveryState::Errored {
                error: RenderFailure::new("boom: a very long message that is kept")
            }
        );
    }

    #[test]
    fn test_errored_does_not_render_children() {
        let reload = ReloadSignal::new();
        let b = boundary(&reload);
        b.guard(|| Err(RenderFailure::new("boom"))).unwrap();

        let rendered = Cell::new(false);
        b.guard(|| {
            rendered.set(true);
            Ok(Element::empty())
        })
        .unwrap();
        assert!(!rendered.get());
    }

    #[test]
    fn test_nearest_boundary_transitions() {
        let reload = ReloadSignal::new();
        let outer = boundary(&reload);
        let inner = RecoveryBoundary::new(BoundaryId::Shell, fallback(), reload.clone());

        outer
            .guard(|| inner.guard(|| Err(RenderFailure::new("inner failure"))))
            .unwrap();

        assert!(outer.state().is_stable());
        assert!(!inner.state().is_stable());
    }

    #[test]
    fn test_fallback_failure_propagates() {
        let reload = ReloadSignal::new();
        let outer = boundary(&reload);
        let inner = RecoveryBoundary::new(
            BoundaryId::Shell,
            FallbackView::new(|_, _| Err(RenderFailure::new("fallback broke"))),
            reload.clone(),
        );

        let out = outer
            .guard(|| inner.guard(|| Err(RenderFailure::new("first"))))
            .unwrap();

        assert!(out.to_html().contains("fallback broke"));
        assert!(!outer.state().is_stable());
        assert_eq!(
            inner.state(),
            RecoveryState::Errored {
                error: RenderFailure::new("first")
            }
        );
    }

    #[test]
    fn test_reset_requests_reload() {
        let reload = ReloadSignal::new();
        let b = boundary(&reload);

        assert!(!b.reset());
        assert!(!reload.is_requested());

        b.guard(|| Err(RenderFailure::new("boom"))).unwrap();
        assert!(b.reset());
        assert!(b.state().is_stable());
        assert!(reload.take());
        assert!(!reload.take());
    }
}
