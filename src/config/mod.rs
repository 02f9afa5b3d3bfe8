//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read, parse, env overrides)
//!     → validation.rs (semantic checks)
//!     → ShellConfig (validated, immutable)
//!     → shared with the API server, the cache fetcher and the shell
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ApiConfig, MountConfig, ObservabilityConfig, SessionConfig, ShellConfig};
pub use validation::{validate_config, ValidationError};
