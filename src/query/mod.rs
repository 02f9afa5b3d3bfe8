//! Data-cache subsystem consumed by leaf views.
//!
//! # Data Flow
//! ```text
//! view → RenderContext::query(key)
//!     → cache.rs (slot lookup: settled | in-flight | vacant)
//!     → vacant: start one shared fetch, spawn its driver
//!     → fetcher.rs (HTTP GET against the backend API)
//!     → settle slot, deliver to live subscribers only
//! ```
//!
//! # Design Decisions
//! - At most one in-flight request per key; every caller awaits the same
//!   shared future and observes the same resolution
//! - Deliveries are tagged with the subscriber's epoch token; dead tokens are
//!   dropped, never applied
//! - Dropping a `Subscription` cancels its delivery

pub mod cache;
pub mod fetcher;

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

pub use cache::{QueryCache, Subscription};
pub use fetcher::ApiFetcher;

/// Opaque cache key; by convention an API path with query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueryKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for QueryKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Errors surfaced by the data layer. These are values handed to views.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The key cannot be turned into a request.
    #[error("invalid query key '{0}'")]
    InvalidKey(String),

    /// No data layer is reachable from this render.
    #[error("data layer unavailable: {0}")]
    Unavailable(String),
}

/// Snapshot of a query as seen by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    Loading,
    Ready(Arc<serde_json::Value>),
    Error(QueryError),
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

/// Future returned by a [`Fetcher`].
pub type QueryFuture = BoxFuture<'static, Result<serde_json::Value, QueryError>>;

/// Source of truth behind the cache.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, key: &QueryKey) -> QueryFuture;
}
