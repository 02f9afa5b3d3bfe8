//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Render pass:
//!     → boundary.rs (guard wraps a subtree render)
//!     → Ok: element passes through untouched
//!     → Err: nearest boundary captures it, renders its fallback
//!     → user reset: Stable again + ReloadSignal → host remounts the app
//! ```
//!
//! # Design Decisions
//! - Failures are contained where they happen; only one boundary transitions
//! - Recovery is explicit and coarse (full reload), never automatic

pub mod boundary;

pub use boundary::{BoundaryId, RecoveryBoundary, RecoveryState, ReloadSignal, ResetAction};
