//! Choosing one split out of the ranked partitions
//!
//! The best partition is not always taken: every split within tolerance is an
//! equally good candidate, so repeated requests for the same roster produce
//! different but still balanced teams.

use crate::error::{Result, StatsError};
use crate::types::{Partition, Player};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A named side of a chosen split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Side {
    pub name: String,
    pub players: Vec<Player>,
}

/// The split presented to users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSplit {
    pub first: Side,
    pub second: Side,
    pub diff: f64,
    /// How many partitions were within tolerance
    pub candidates: usize,
}

/// Tolerance-based random selection among balanced partitions
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    per_player_tolerance: f64,
    side_names: [String; 2],
}

impl SelectionPolicy {
    /// Create a policy; the tolerance is per roster member and must be non-negative
    pub fn new(per_player_tolerance: f64, side_names: [String; 2]) -> Result<Self> {
        if !per_player_tolerance.is_finite() || per_player_tolerance < 0.0 {
            return Err(StatsError::ConfigurationError {
                message: format!(
                    "Per-player tolerance must be non-negative, got {}",
                    per_player_tolerance
                ),
            }
            .into());
        }

        Ok(Self {
            per_player_tolerance,
            side_names,
        })
    }

    pub fn per_player_tolerance(&self) -> f64 {
        self.per_player_tolerance
    }

    /// Same side names with a different tolerance (e.g. skill-weighted requests)
    pub fn with_tolerance(&self, per_player_tolerance: f64) -> Result<Self> {
        Self::new(per_player_tolerance, self.side_names.clone())
    }

    /// Partitions with `diff < roster_size * tolerance`, or the best one alone
    /// when none qualify. `partitions` must already be sorted by diff.
    pub fn candidates<'a>(&self, partitions: &'a [Partition], roster_size: usize) -> Vec<&'a Partition> {
        let threshold = roster_size as f64 * self.per_player_tolerance;
        let within: Vec<&Partition> = partitions.iter().filter(|p| p.diff < threshold).collect();

        if within.is_empty() {
            partitions.first().into_iter().collect()
        } else {
            within
        }
    }

    /// Pick a candidate uniformly at random and randomly assign side names.
    /// Returns `None` only when `partitions` is empty.
    pub fn select<R>(&self, partitions: &[Partition], roster_size: usize, rng: &mut R) -> Option<TeamSplit>
    where
        R: Rng,
    {
        let candidates = self.candidates(partitions, roster_size);
        let chosen = *candidates.choose(rng)?;

        let (first, second) = if rng.gen_bool(0.5) {
            (&chosen.team_b, &chosen.team_a)
        } else {
            (&chosen.team_a, &chosen.team_b)
        };

        Some(TeamSplit {
            first: Side {
                name: self.side_names[0].clone(),
                players: first.clone(),
            },
            second: Side {
                name: self.side_names[1].clone(),
                players: second.clone(),
            },
            diff: chosen.diff,
            candidates: candidates.len(),
        })
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            per_player_tolerance: 10.0,
            side_names: ["Terrorists".to_string(), "Counter Terrorists".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teams::partition::PartitionOptimizer;
    use crate::types::WeightedEntry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn partition(diff: f64) -> Partition {
        Partition {
            team_a: vec![Player::new("a", "a")],
            team_b: vec![Player::new("b", "b")],
            diff,
        }
    }

    #[test]
    fn test_candidates_within_tolerance() {
        let policy = SelectionPolicy::default();
        let partitions = vec![partition(0.0), partition(15.0), partition(19.9), partition(20.0)];

        // roster of 2 * tolerance 10 = threshold 20, strictly below
        let candidates = policy.candidates(&partitions, 2);
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|p| p.diff < 20.0));
    }

    #[test]
    fn test_candidates_fall_back_to_best() {
        let policy = SelectionPolicy::default();
        let partitions = vec![partition(500.0), partition(700.0)];

        let candidates = policy.candidates(&partitions, 2);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].diff, 500.0);
    }

    #[test]
    fn test_select_empty_returns_none() {
        let policy = SelectionPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(policy.select(&[], 0, &mut rng).is_none());
    }

    #[test]
    fn test_select_is_reproducible_with_seed() {
        let roster: Vec<WeightedEntry> = (0..6)
            .map(|i| WeightedEntry::new(Player::new(format!("p{}", i), format!("p{}", i)), 1000.0))
            .collect();
        let partitions = PartitionOptimizer::default().optimize(&roster);
        let policy = SelectionPolicy::default();

        let first = policy.select(&partitions, roster.len(), &mut StdRng::seed_from_u64(42));
        let second = policy.select(&partitions, roster.len(), &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);

        let split = first.unwrap();
        assert_eq!(split.diff, 0.0);
        assert_eq!(split.first.players.len() + split.second.players.len(), 6);
        assert_eq!(split.first.name, "Terrorists");
        assert_eq!(split.second.name, "Counter Terrorists");
    }

    #[test]
    fn test_select_varies_between_candidates() {
        let roster: Vec<WeightedEntry> = (0..6)
            .map(|i| WeightedEntry::new(Player::new(format!("p{}", i), format!("p{}", i)), 1000.0))
            .collect();
        let partitions = PartitionOptimizer::default().optimize(&roster);
        let policy = SelectionPolicy::default();
        let mut rng = StdRng::seed_from_u64(1);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let split = policy.select(&partitions, roster.len(), &mut rng).unwrap();
            let mut ids: Vec<String> = split.first.players.iter().map(|p| p.id.clone()).collect();
            ids.sort();
            seen.insert(ids);
        }

        // ten 3v3 splits, each seen from either side
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let names = ["A".to_string(), "B".to_string()];
        assert!(SelectionPolicy::new(-1.0, names.clone()).is_err());
        assert!(SelectionPolicy::new(0.1, names).is_ok());
    }
}
