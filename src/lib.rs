//! Route-tree composition and error-recovery shell for single-page applications,
//! plus the small backend API the applications read from.

pub mod apps;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod query;
pub mod resilience;
pub mod routing;
pub mod security;
pub mod view;

pub use config::ShellConfig;
pub use http::ApiServer;
pub use lifecycle::{Host, Shell, ShellContext, ShellError, Shutdown};
