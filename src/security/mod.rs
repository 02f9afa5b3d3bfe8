//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Mount:
//!     → session.rs (resolve AuthzContext once, before the tree mounts)
//!
//! Every render pass:
//!     → gate.rs (policy + context → decision)
//!     → allowed: render the guarded subtree
//!     → denied: render the denial notice; the subtree is never constructed
//! ```
//!
//! # Design Decisions
//! - Authorization is an explicit value threaded through the composition,
//!   never ambient state
//! - Fail closed: the guarded closure only runs on an explicit allow
//! - Verification is a stub: no credential check, no redirect, no loading state

pub mod gate;
pub mod session;

pub use gate::{AccessGate, GatePolicy};
pub use session::{AuthzContext, SessionResolver, StaticSession};
