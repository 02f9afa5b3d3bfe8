//! Application definitions mounted by the shell.
//!
//! # Responsibilities
//! - Describe each application's route tree, gate policy and root fallback
//! - Build a fresh, validated tree on every mount
//!
//! # Design Decisions
//! - Trees are rebuilt per mount; a reload never reuses state from the
//!   failed instance
//! - Every application supplies a root fallback, so no failure escapes
//!   the shell boundary

pub mod admin;
pub mod shared;
pub mod web;

use std::fmt;
use std::sync::Arc;

use crate::routing::{RouteConfigError, RouteTree};
use crate::security::GatePolicy;
use crate::view::FallbackView;

type BuildFn = dyn Fn() -> Result<RouteTree, RouteConfigError> + Send + Sync;

/// Names accepted by [`by_name`].
pub const APP_NAMES: [&str; 2] = ["web", "admin"];

/// Everything the composition root needs to mount one application.
#[derive(Clone)]
pub struct AppDefinition {
    name: String,
    policy: GatePolicy,
    fallback: FallbackView,
    build: Arc<BuildFn>,
}

impl AppDefinition {
    pub fn new<F>(name: impl Into<String>, policy: GatePolicy, fallback: FallbackView, build: F) -> Self
    where
        F: Fn() -> Result<RouteTree, RouteConfigError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            policy,
            fallback,
            build: Arc::new(build),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    /// Fallback of the shell-level boundary above the router.
    pub fn fallback(&self) -> &FallbackView {
        &self.fallback
    }

    pub fn build_tree(&self) -> Result<RouteTree, RouteConfigError> {
        (self.build)()
    }
}

impl fmt::Debug for AppDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDefinition")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

pub fn by_name(name: &str) -> Option<AppDefinition> {
    match name {
        "web" => Some(web::definition()),
        "admin" => Some(admin::definition()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        for name in APP_NAMES {
            let app = by_name(name).unwrap();
            assert_eq!(app.name(), name);
            let tree = app.build_tree().unwrap();
            assert!(tree.has_root_wildcard());
        }
        assert!(by_name("billing").is_none());
    }

    #[test]
    fn test_policies() {
        assert_eq!(web::definition().policy(), GatePolicy::Public);
        assert_eq!(admin::definition().policy(), GatePolicy::RequireSession);
    }
}
