//! Fragstats - match statistics assistant for a shooter community
//!
//! This crate provides balanced team generation from a weighted roster,
//! TrueSkill-style skill ratings from round history, and the chat command
//! layer that exposes both.

pub mod command;
pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod render;
pub mod service;
pub mod teams;
pub mod tracker;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, StatsError};
pub use types::*;

// Re-export key components
pub use command::Command;
pub use rating::{MatchHistoryProvider, SkillRatingEngine};
pub use service::CommandDispatcher;
pub use teams::{PartitionOptimizer, RosterProvider, SelectionPolicy, TeamRequestResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
