//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber (EnvFilter)
//!     → Prometheus scrape endpoint (shell-api, when enabled)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated strings, for anything filterable
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
