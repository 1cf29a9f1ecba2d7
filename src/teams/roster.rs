//! Roster sources
//!
//! A roster is the list of regular players with their persisted scoreboard
//! score. Providers are synchronous and own their locking so they can be
//! shared across blocking command workers.

use crate::error::{Result, StatsError};
use crate::types::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Scoreboard score every player starts from
pub const STARTING_SCORE: f64 = 1000.0;

/// A regular player as stored by the stats collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub kills: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub headshots: u64,
    /// Rounds played on either side
    #[serde(default)]
    pub rounds: u64,
}

impl RosterEntry {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score,
            kills: 0,
            deaths: 0,
            headshots: 0,
            rounds: 0,
        }
    }

    pub fn with_stats(mut self, kills: u64, deaths: u64, headshots: u64, rounds: u64) -> Self {
        self.kills = kills;
        self.deaths = deaths;
        self.headshots = headshots;
        self.rounds = rounds;
        self
    }

    /// Score gained (or lost) per round since the starting score
    pub fn score_per_round(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        (self.score - STARTING_SCORE) / self.rounds as f64
    }

    pub fn kill_death_ratio(&self) -> f64 {
        if self.deaths == 0 {
            return 0.0;
        }
        self.kills as f64 / self.deaths as f64
    }

    /// Share of kills that were headshots, in percent
    pub fn headshot_percentage(&self) -> f64 {
        if self.kills == 0 {
            return 0.0;
        }
        self.headshots as f64 / self.kills as f64 * 100.0
    }

    pub fn headshots_per_round(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        self.headshots as f64 / self.rounds as f64
    }

    pub fn player(&self) -> Player {
        Player::new(self.id.clone(), self.name.clone())
    }

    /// Case-insensitive match against display name or id
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.name.to_lowercase() == name || self.id.to_lowercase() == name
    }
}

/// Trait for supplying the current roster
pub trait RosterProvider: Send + Sync {
    /// Every known regular player, in a stable order
    fn roster(&self) -> Result<Vec<RosterEntry>>;

    /// Sum of all scores; a change signals that a game is being played
    fn total_score(&self) -> Result<i64> {
        Ok(self.roster()?.iter().map(|e| e.score).sum::<f64>().round() as i64)
    }
}

/// In-memory roster, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryRosterProvider {
    entries: RwLock<Vec<RosterEntry>>,
}

impl InMemoryRosterProvider {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Set a player's score, adding the player if unknown
    pub fn set_score(&self, id: &str, name: &str, score: f64) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StatsError::InternalError {
                message: "Failed to acquire roster write lock".to_string(),
            })?;

        match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry.score = score,
            None => entries.push(RosterEntry::new(id, name, score)),
        }
        Ok(())
    }
}

impl RosterProvider for InMemoryRosterProvider {
    fn roster(&self) -> Result<Vec<RosterEntry>> {
        let entries = self.entries.read().map_err(|_| StatsError::InternalError {
            message: "Failed to acquire roster read lock".to_string(),
        })?;

        Ok(entries.clone())
    }
}

/// Roster read from a JSON file of `[{"id", "name", "score"}]` on every call
#[derive(Debug, Clone)]
pub struct JsonRosterProvider {
    path: PathBuf,
}

impl JsonRosterProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterProvider for JsonRosterProvider {
    fn roster(&self) -> Result<Vec<RosterEntry>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| StatsError::DataSource {
            message: format!("Failed to read {}: {}", self.path.display(), e),
        })?;

        let entries: Vec<RosterEntry> =
            serde_json::from_str(&contents).map_err(|e| StatsError::DataSource {
                message: format!("Invalid roster in {}: {}", self.path.display(), e),
            })?;

        debug!("Loaded {} roster entries from {}", entries.len(), self.path.display());
        Ok(entries)
    }
}
