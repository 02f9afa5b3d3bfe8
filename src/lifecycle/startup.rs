//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the collaborators shared by every mounted application
//! - Define the errors that stop a mount or escape a render
//!
//! # Design Decisions
//! - Fail fast: configuration and route errors are fatal
//! - The session is resolved by a collaborator and passed in explicitly

use std::sync::Arc;

use thiserror::Error;

use crate::config::ShellConfig;
use crate::query::{ApiFetcher, Fetcher, QueryCache, QueryError};
use crate::routing::RouteConfigError;
use crate::security::{SessionResolver, StaticSession};
use crate::view::RenderFailure;

#[derive(Debug, Error)]
pub enum ShellError {
    /// The host has no container with this id.
    #[error("rendering container '{0}' does not exist")]
    MissingContainer(String),

    #[error("route configuration error: {0}")]
    Route(#[from] RouteConfigError),

    #[error("data layer configuration error: {0}")]
    DataLayer(#[from] QueryError),

    /// A failure was raised by the shell boundary's own fallback.
    #[error("render failure escaped the root boundary: {0}")]
    Unrecovered(RenderFailure),
}

/// Collaborators shared by mounted applications.
#[derive(Clone)]
pub struct ShellContext {
    cache: QueryCache,
    session: Arc<dyn SessionResolver>,
}

impl ShellContext {
    pub fn new(cache: QueryCache, session: Arc<dyn SessionResolver>) -> Self {
        Self { cache, session }
    }

    /// Cache over an explicit fetcher.
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, session: Arc<dyn SessionResolver>) -> Self {
        Self::new(QueryCache::new(fetcher), session)
    }

    /// HTTP-backed cache and the static session stub.
    pub fn from_config(config: &ShellConfig) -> Result<Self, ShellError> {
        let fetcher = ApiFetcher::new(&config.api.base_url, config.api.request_timeout())?;
        tracing::info!(
            base_url = %config.api.base_url,
            authorized = config.session.authorized,
            "Shell context ready"
        );
        Ok(Self::with_fetcher(
            Arc::new(fetcher),
            Arc::new(StaticSession::from_config(&config.session)),
        ))
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn session(&self) -> &Arc<dyn SessionResolver> {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let ctx = ShellContext::from_config(&ShellConfig::default()).unwrap();
        assert!(ctx.session().resolve().is_authorized());
    }

    #[test]
    fn test_bad_base_url() {
        let mut config = ShellConfig::default();
        config.api.base_url = "::".into();
        assert!(matches!(
            ShellContext::from_config(&config),
            Err(ShellError::DataLayer(QueryError::InvalidKey(_)))
        ));
    }
}
