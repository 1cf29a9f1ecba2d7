//! Skill ratings from team-vs-team round outcomes
//!
//! This module provides the rating models (TrueSkill and Weng-Lin via the
//! skillratings crate), the engine that replays round history through them,
//! and the sources that supply that history.

pub mod engine;
pub mod history;
pub mod model;
pub mod trueskill;
pub mod weng_lin;

// Re-export commonly used types
pub use engine::{RankingReport, RatingReplay, SkillRatingEngine};
pub use history::{InMemoryMatchHistory, JsonMatchHistory, MatchHistoryProvider};
pub use model::{create_model, RatingModel, RatingModelKind};
pub use trueskill::{TrueSkillModel, TrueSkillParams};
pub use weng_lin::{WengLinModel, WengLinParams};
