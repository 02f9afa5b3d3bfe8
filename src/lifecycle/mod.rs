//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → ShellContext (cache + session resolver)
//!
//! Mount (shell.rs):
//!     Host container lookup → build route tree → resolve session
//!     → initial navigation → first render committed to the container
//!
//! Render pass (shell.rs):
//!     AccessGate → shell RecoveryBoundary → route chain (root → matched),
//!     each node with a fallback wrapped in its own boundary
//!
//! Reset (shell.rs):
//!     boundary reset → ReloadSignal → retire epoch, drop the mounted app,
//!     rebuild everything, navigate back to the last location
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → API server drains and exits
//! ```
//!
//! # Design Decisions
//! - Configuration and route errors abort mount before anything renders
//! - A failure escaping the shell boundary is reported, never swallowed

pub mod mount;
pub mod shell;
pub mod shutdown;
pub mod startup;

pub use mount::{Container, Host};
pub use shell::Shell;
pub use shutdown::Shutdown;
pub use startup::{ShellContext, ShellError};
