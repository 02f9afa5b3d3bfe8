//! View model.
//!
//! # Data Flow
//! ```text
//! Router chain (root → matched)
//!     → context.rs (RenderContext: location, outlet, chrome, data scope)
//!     → View::render → Result<Element, RenderFailure>
//!     → element.rs (Element tree → escaped HTML)
//! ```
//!
//! # Design Decisions
//! - Views return a Result instead of unwinding; a failure is an ordinary value
//!   that the nearest recovery boundary intercepts
//! - Views are plain shared closures (`Send + Sync`) so trees can be frozen in an Arc
//! - Layout nodes receive their rendered child as the outlet

pub mod context;
pub mod element;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::query::QueryError;
use crate::resilience::boundary::ResetAction;

pub use context::{DataScope, NavChrome, RenderContext};
pub use element::Element;

/// Failure raised while rendering a mounted subtree.
///
/// The message is kept verbatim; fallbacks show it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RenderFailure {
    message: String,
}

impl RenderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<QueryError> for RenderFailure {
    fn from(err: QueryError) -> Self {
        Self::new(err.to_string())
    }
}

type RenderFn = dyn Fn(&mut RenderContext<'_>) -> Result<Element, RenderFailure> + Send + Sync;
type FallbackFn = dyn Fn(&RenderFailure, &ResetAction) -> Result<Element, RenderFailure> + Send + Sync;

/// Render callback bound to a route node.
#[derive(Clone)]
pub struct View(Arc<RenderFn>);

impl View {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&mut RenderContext<'_>) -> Result<Element, RenderFailure> + Send + Sync + 'static,
    {
        Self(Arc::new(render))
    }

    pub fn render(&self, cx: &mut RenderContext<'_>) -> Result<Element, RenderFailure> {
        (self.0)(cx)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("View(..)")
    }
}

/// Rendered by a recovery boundary in place of its failed subtree.
#[derive(Clone)]
pub struct FallbackView(Arc<FallbackFn>);

impl FallbackView {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&RenderFailure, &ResetAction) -> Result<Element, RenderFailure> + Send + Sync + 'static,
    {
        Self(Arc::new(render))
    }

    pub fn render(&self, failure: &RenderFailure, reset: &ResetAction) -> Result<Element, RenderFailure> {
        (self.0)(failure, reset)
    }
}

impl fmt::Debug for FallbackView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FallbackView(..)")
    }
}
