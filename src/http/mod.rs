//! Backend HTTP API consumed by the applications' data layer.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing and timeout layers, graceful shutdown)
//!     → request.rs (request ID, per-request metrics)
//!     → handlers.rs (/health, /sum, JSON 404 for everything else)
//!     → JSON response
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{RequestId, X_REQUEST_ID};
pub use server::ApiServer;
