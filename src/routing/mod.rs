//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Tree Compilation (at startup):
//!     RouteNode values
//!     → tree.rs (arena + parent index, sibling uniqueness checks)
//!     → finalize() freezes an immutable RouteTree (shared via Arc)
//!
//! Navigation:
//!     navigate(location)
//!     → router.rs (idempotence check, epoch advance, LocationChanged)
//!     → matcher.rs (exact segment match, wildcard fallback)
//!     → Return: matched NodeId or NoRouteMatch
//! ```
//!
//! # Design Decisions
//! - Trees are immutable after finalize (lock-free concurrent reads)
//! - Exact segment beats wildcard sibling; at most one wildcard per parent
//! - Deterministic: outcome depends only on tree shape and location
//! - Every navigation advances an epoch so superseded effects can be dropped

pub mod epoch;
pub mod error;
pub mod matcher;
pub mod router;
pub mod tree;

pub use epoch::{EpochToken, NavigationEpoch};
pub use error::RouteConfigError;
pub use matcher::{match_location, resolve, Location, MatchResult};
pub use router::{LocationChanged, Navigation, Router};
pub use tree::{NodeId, RouteNode, RouteTree, RouteTreeBuilder, Segment, WILDCARD};
