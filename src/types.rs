//! Common types used throughout the statistics assistant

use serde::{Deserialize, Serialize};
use skillratings::trueskill::TrueSkillRating;
use skillratings::weng_lin::WengLinRating;
use std::collections::BTreeSet;

/// Unique identifier for players (steam id for regulars, ephemeral for guests)
pub type PlayerId = String;

/// A participant that can be placed on a team or rated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A roster entry with its balancing weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEntry {
    pub player: Player,
    /// Current skill or score; never negative
    pub weight: f64,
}

impl WeightedEntry {
    pub fn new(player: Player, weight: f64) -> Self {
        Self { player, weight }
    }
}

/// One candidate two-way split of a roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub team_a: Vec<Player>,
    pub team_b: Vec<Player>,
    /// Imbalance score; lower is more balanced
    pub diff: f64,
}

/// One completed team-vs-team match outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Position in the chronological history
    #[serde(default)]
    pub sequence: u64,
    pub winners: BTreeSet<PlayerId>,
    pub losers: BTreeSet<PlayerId>,
}

impl Round {
    pub fn new<W, L>(sequence: u64, winners: W, losers: L) -> Self
    where
        W: IntoIterator,
        W::Item: Into<PlayerId>,
        L: IntoIterator,
        L::Item: Into<PlayerId>,
    {
        Self {
            sequence,
            winners: winners.into_iter().map(Into::into).collect(),
            losers: losers.into_iter().map(Into::into).collect(),
        }
    }

    /// A round can be rated only with two non-empty, disjoint sides
    pub fn is_valid(&self) -> bool {
        !self.winners.is_empty()
            && !self.losers.is_empty()
            && self.winners.is_disjoint(&self.losers)
    }
}

/// Skill belief for a player: point estimate and its standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub mu: f64,
    pub sigma: f64,
}

impl Rating {
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// `mu - k * sigma`, the rating we are fairly sure the player exceeds
    pub fn conservative(&self, k: f64) -> f64 {
        self.mu - k * self.sigma
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self {
            mu: 25.0,
            sigma: 25.0 / 3.0,
        }
    }
}

impl From<TrueSkillRating> for Rating {
    fn from(rating: TrueSkillRating) -> Self {
        Self {
            mu: rating.rating,
            sigma: rating.uncertainty,
        }
    }
}

impl From<Rating> for TrueSkillRating {
    fn from(rating: Rating) -> Self {
        Self {
            rating: rating.mu,
            uncertainty: rating.sigma,
        }
    }
}

impl From<WengLinRating> for Rating {
    fn from(rating: WengLinRating) -> Self {
        Self {
            mu: rating.rating,
            sigma: rating.uncertainty,
        }
    }
}

impl From<Rating> for WengLinRating {
    fn from(rating: Rating) -> Self {
        Self {
            rating: rating.mu,
            uncertainty: rating.sigma,
        }
    }
}

/// A rated player's line on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub rating: Rating,
    pub conservative_score: f64,
}

/// Which roster value drives team balancing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Persisted scoreboard score
    #[default]
    Score,
    /// Skill estimate (mu) from the rating engine
    Skill,
}

impl std::fmt::Display for Weighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Weighting::Score => write!(f, "score"),
            Weighting::Skill => write!(f, "skill"),
        }
    }
}
