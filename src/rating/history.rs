//! Round history sources
//!
//! The engine never stores ratings, so every ranking starts by fetching the
//! complete chronological history from a [`MatchHistoryProvider`].

use crate::error::{Result, StatsError};
use crate::types::{PlayerId, Round};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Trait for supplying the ordered round history
pub trait MatchHistoryProvider: Send + Sync {
    /// All rounds, oldest first
    fn rounds(&self) -> Result<Vec<Round>>;
}

/// In-memory history, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryMatchHistory {
    rounds: RwLock<Vec<Round>>,
}

impl InMemoryMatchHistory {
    pub fn new(rounds: Vec<Round>) -> Self {
        Self {
            rounds: RwLock::new(rounds),
        }
    }

    /// Append a round; its sequence becomes its position in the history
    pub fn record(&self, winners: Vec<PlayerId>, losers: Vec<PlayerId>) -> Result<()> {
        let mut rounds = self
            .rounds
            .write()
            .map_err(|_| StatsError::InternalError {
                message: "Failed to acquire rounds write lock".to_string(),
            })?;

        let sequence = rounds.len() as u64;
        rounds.push(Round::new(sequence, winners, losers));
        Ok(())
    }
}

impl MatchHistoryProvider for InMemoryMatchHistory {
    fn rounds(&self) -> Result<Vec<Round>> {
        let rounds = self.rounds.read().map_err(|_| StatsError::InternalError {
            message: "Failed to acquire rounds read lock".to_string(),
        })?;

        Ok(rounds.clone())
    }
}

#[derive(Debug, Deserialize)]
struct RoundRecord {
    winners: Vec<PlayerId>,
    losers: Vec<PlayerId>,
}

/// Parse a JSON array of `{"winners": [..], "losers": [..]}` objects.
/// Array position becomes the round's sequence number.
pub fn parse_rounds(json: &str) -> Result<Vec<Round>> {
    let records: Vec<RoundRecord> =
        serde_json::from_str(json).map_err(|e| StatsError::DataSource {
            message: format!("Invalid round history: {}", e),
        })?;

    Ok(records
        .into_iter()
        .enumerate()
        .map(|(i, record)| Round::new(i as u64, record.winners, record.losers))
        .collect())
}

/// History read from a JSON file on every call
#[derive(Debug, Clone)]
pub struct JsonMatchHistory {
    path: PathBuf,
}

impl JsonMatchHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MatchHistoryProvider for JsonMatchHistory {
    fn rounds(&self) -> Result<Vec<Round>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| StatsError::DataSource {
            message: format!("Failed to read {}: {}", self.path.display(), e),
        })?;

        let rounds = parse_rounds(&contents)?;
        debug!("Loaded {} rounds from {}", rounds.len(), self.path.display());
        Ok(rounds)
    }
}
