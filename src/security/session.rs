//! Session resolution.
//!
//! Produces the [`AuthzContext`] a mounted application renders with. The only
//! resolver is [`StaticSession`], a constant flag from configuration: there is
//! no credential verification behind it, and it must not be relied on in
//! production until a real session protocol is decided.

use crate::config::SessionConfig;

/// Authorization facts resolved before mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthzContext {
    authorized: bool,
}

impl AuthzContext {
    pub fn new(authorized: bool) -> Self {
        Self { authorized }
    }

    pub fn anonymous() -> Self {
        Self::new(false)
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }
}

/// Collaborator that resolves the session for a mount.
pub trait SessionResolver: Send + Sync {
    fn resolve(&self) -> AuthzContext;
}

/// Constant-flag resolver.
#[derive(Debug, Clone, Copy)]
pub struct StaticSession {
    authorized: bool,
}

impl StaticSession {
    pub fn new(authorized: bool) -> Self {
        Self { authorized }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.authorized)
    }
}

impl SessionResolver for StaticSession {
    fn resolve(&self) -> AuthzContext {
        tracing::warn!(
            authorized = self.authorized,
            "Session resolved from a static flag; no credentials were verified"
        );
        AuthzContext::new(self.authorized)
    }
}
