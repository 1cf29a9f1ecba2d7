//! Balanced team generation
//!
//! This module resolves team requests against the roster, enumerates every
//! two-way split and picks one of the balanced ones.

pub mod partition;
pub mod resolver;
pub mod roster;
pub mod selection;

// Re-export commonly used types
pub use partition::{optimize, ImbalancePenalty, PartitionOptimizer};
pub use resolver::{GuestSpec, RosterFilter, TeamRequest, TeamRequestResolver, WeightSource};
pub use roster::{InMemoryRosterProvider, JsonRosterProvider, RosterEntry, RosterProvider};
pub use selection::{SelectionPolicy, Side, TeamSplit};
