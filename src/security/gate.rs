//! Access gate for guarded subtrees.
//!
//! # Responsibilities
//! - Decide, per render pass, whether a subtree may render
//! - Render a denial notice instead of the subtree when it may not
//!
//! # Design Decisions
//! - Hard deny: the subtree's render closure is never invoked, so none of its
//!   data fetches or side effects run
//! - Decision is synchronous; no pending or redirect state
//! - Denial is a normal rendered state, not an error

use crate::observability::metrics;
use crate::security::session::AuthzContext;
use crate::view::{Element, RenderFailure};

const DENIAL_NOTICE: &str = "You must be logged in to access this page.";

/// Which sessions a gate admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Everyone may render the subtree.
    Public,
    /// Only authorized sessions may render the subtree.
    RequireSession,
}

/// Synchronous authorization check in front of a subtree.
#[derive(Debug, Clone, Copy)]
pub struct AccessGate {
    policy: GatePolicy,
}

impl AccessGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    /// Apply the policy to a resolved session.
    pub fn decide(&self, authz: &AuthzContext) -> bool {
        match self.policy {
            GatePolicy::Public => true,
            GatePolicy::RequireSession => authz.is_authorized(),
        }
    }

    /// Render `children` if authorized, otherwise the denial notice.
    pub fn evaluate<F>(&self, is_authorized: bool, children: F) -> Result<Element, RenderFailure>
    where
        F: FnOnce() -> Result<Element, RenderFailure>,
    {
        if is_authorized {
            return children();
        }
        tracing::debug!(policy = ?self.policy, "Access denied; guarded subtree not rendered");
        metrics::record_access_denied();
        Ok(denial_notice())
    }
}

pub fn denial_notice() -> Element {
    Element::tag("div").attr("role", "alert").with_text(DENIAL_NOTICE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_denied_never_constructs_children() {
        let gate = AccessGate::new(GatePolicy::RequireSession);
        let constructed = Cell::new(false);

        let out = gate
            .evaluate(false, || {
                constructed.set(true);
                Err(RenderFailure::new("should never run"))
            })
            .unwrap();

        assert!(!constructed.get());
        assert_eq!(out.text_content(), DENIAL_NOTICE);
    }

    #[test]
    fn test_allowed_renders_children() {
        let gate = AccessGate::new(GatePolicy::RequireSession);
        let out = gate
            .evaluate(true, || Ok(Element::tag("main").with_text("ok")))
            .unwrap();
        assert_eq!(out.to_html(), "<main>ok</main>");
    }

    #[test]
    fn test_policy_decisions() {
        let anonymous = AuthzContext::anonymous();
        let signed_in = AuthzContext::new(true);

        assert!(AccessGate::new(GatePolicy::Public).decide(&anonymous));
        assert!(!AccessGate::new(GatePolicy::RequireSession).decide(&anonymous));
        assert!(AccessGate::new(GatePolicy::RequireSession).decide(&signed_in));
    }

    #[test]
    fn test_child_failures_pass_through() {
        let gate = AccessGate::new(GatePolicy::Public);
        let err = gate.evaluate(true, || Err(RenderFailure::new("boom"))).unwrap_err();
        assert_eq!(err.message(), "boom");
    }
}
