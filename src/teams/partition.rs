//! Exhaustive two-way roster partitioning
//!
//! Every assignment of roster entries to side A or side B is scored and the
//! whole list is returned sorted by imbalance. Only half of the `2^n`
//! assignments are generated because swapping the labels of a split yields
//! its mirror image.

use crate::error::{Result, StatsError};
use crate::types::{Partition, WeightedEntry};
use serde::{Deserialize, Serialize};

/// Multiplier applied to a partition's score difference based on team sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImbalancePenalty {
    /// `1 + ceil(|size_a - size_b| / 2)`, discourages lopsided head counts
    #[default]
    SizeAware,
    /// Always 1; only the weighted sums matter
    Flat,
}

impl ImbalancePenalty {
    /// Penalty factor for a split with the given side sizes (always >= 1)
    pub fn factor(&self, size_a: usize, size_b: usize) -> f64 {
        match self {
            ImbalancePenalty::SizeAware => size_aware_penalty(size_a, size_b),
            ImbalancePenalty::Flat => 1.0,
        }
    }
}

/// Default size penalty: `1 + ceil(|size_a - size_b| / 2)`
pub fn size_aware_penalty(size_a: usize, size_b: usize) -> f64 {
    let gap = size_a.abs_diff(size_b);
    (1 + gap.div_ceil(2)) as f64
}

/// Enumerate and rank every two-way split of `roster`.
///
/// Bit `i` of each mask in `1..=2^(n-1)` puts entry `i` on side A. A side's
/// score is the sum of `weight^skill_exponent` over its members and the
/// partition's diff is `|score_a - score_b| * penalty(|A|, |B|)`. The result
/// is stable-sorted ascending by diff, so ties keep enumeration order.
///
/// Callers must pass at least two entries and bound the roster size: the
/// work is `O(2^n * n)` and nothing here limits it.
///
/// # Panics
///
/// Panics if the roster has more than 64 entries.
pub fn optimize<F>(roster: &[WeightedEntry], skill_exponent: f64, penalty: F) -> Vec<Partition>
where
    F: Fn(usize, usize) -> f64,
{
    let n = roster.len();
    if n == 0 {
        return Vec::new();
    }
    assert!(n <= 64, "roster of {n} entries cannot be enumerated");

    let scores: Vec<f64> = roster
        .iter()
        .map(|entry| entry.weight.powf(skill_exponent))
        .collect();

    let half = 1u64 << (n - 1);
    let mut scored: Vec<(u64, f64)> = Vec::with_capacity(half as usize);

    for mask in 1..=half {
        let mut score_a = 0.0;
        let mut score_b = 0.0;
        let mut size_a = 0;

        for (i, score) in scores.iter().enumerate() {
            if mask & (1u64 << i) != 0 {
                score_a += score;
                size_a += 1;
            } else {
                score_b += score;
            }
        }

        let diff = (score_a - score_b).abs() * penalty(size_a, n - size_a);
        scored.push((mask, diff));
    }

    // slice::sort_by is stable
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));

    scored
        .into_iter()
        .map(|(mask, diff)| split_by_mask(roster, mask, diff))
        .collect()
}

fn split_by_mask(roster: &[WeightedEntry], mask: u64, diff: f64) -> Partition {
    let mut team_a = Vec::new();
    let mut team_b = Vec::new();

    for (i, entry) in roster.iter().enumerate() {
        if mask & (1u64 << i) != 0 {
            team_a.push(entry.player.clone());
        } else {
            team_b.push(entry.player.clone());
        }
    }

    Partition {
        team_a,
        team_b,
        diff,
    }
}

/// Configured partition optimizer
#[derive(Debug, Clone)]
pub struct PartitionOptimizer {
    skill_exponent: f64,
    penalty: ImbalancePenalty,
}

impl PartitionOptimizer {
    /// Create a new optimizer; `skill_exponent` must be finite and at least 1
    pub fn new(skill_exponent: f64, penalty: ImbalancePenalty) -> Result<Self> {
        if !skill_exponent.is_finite() || skill_exponent < 1.0 {
            return Err(StatsError::ConfigurationError {
                message: format!("Skill exponent must be >= 1, got {}", skill_exponent),
            }
            .into());
        }

        Ok(Self {
            skill_exponent,
            penalty,
        })
    }

    pub fn skill_exponent(&self) -> f64 {
        self.skill_exponent
    }

    pub fn penalty(&self) -> ImbalancePenalty {
        self.penalty
    }

    /// Rank every split of `roster`, most balanced first
    pub fn optimize(&self, roster: &[WeightedEntry]) -> Vec<Partition> {
        optimize(roster, self.skill_exponent, |a, b| self.penalty.factor(a, b))
    }
}

impl Default for PartitionOptimizer {
    fn default() -> Self {
        Self {
            skill_exponent: 1.0,
            penalty: ImbalancePenalty::SizeAware,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Player;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn roster(weights: &[f64]) -> Vec<WeightedEntry> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let name = format!("p{}", i);
                WeightedEntry::new(Player::new(name.clone(), name), *w)
            })
            .collect()
    }

    #[test]
    fn test_size_aware_penalty() {
        assert_eq!(size_aware_penalty(2, 2), 1.0);
        assert_eq!(size_aware_penalty(2, 3), 2.0);
        assert_eq!(size_aware_penalty(1, 3), 2.0);
        assert_eq!(size_aware_penalty(0, 3), 3.0);
        assert_eq!(size_aware_penalty(5, 0), 4.0);
        assert_eq!(ImbalancePenalty::Flat.factor(0, 7), 1.0);
    }

    #[test]
    fn test_two_equal_players_split_evenly() {
        let entries = vec![
            WeightedEntry::new(Player::new("A", "A"), 1000.0),
            WeightedEntry::new(Player::new("B", "B"), 1000.0),
        ];

        let partitions = PartitionOptimizer::default().optimize(&entries);
        assert_eq!(partitions.len(), 2);

        let best = &partitions[0];
        assert_eq!(best.diff, 0.0);
        assert_eq!(best.team_a, vec![Player::new("A", "A")]);
        assert_eq!(best.team_b, vec![Player::new("B", "B")]);
    }

    #[test]
    fn test_four_equal_players_two_per_side() {
        let partitions = PartitionOptimizer::default().optimize(&roster(&[1000.0; 4]));

        assert_eq!(partitions.len(), 8);
        let best = &partitions[0];
        assert_eq!(best.diff, 0.0);
        assert_eq!(best.team_a.len(), 2);
        assert_eq!(best.team_b.len(), 2);
    }

    #[test]
    fn test_size_penalty_prefers_even_head_counts() {
        let entries = roster(&[1000.0, 500.0, 490.0, 2.0]);

        let flat = optimize(&entries, 1.0, |_, _| 1.0);
        let penalised = PartitionOptimizer::default().optimize(&entries);

        // Flat: {p0} vs the rest is closest by score (1000 vs 992)
        assert_eq!(flat[0].diff, 8.0);
        assert_eq!(flat[0].team_a.len(), 1);
        assert_eq!(flat[0].team_b.len(), 3);

        // Size-aware doubles that to 16 and prefers {p1, p2} vs {p0, p3}
        assert_eq!(penalised[0].diff, 12.0);
        let ids: Vec<&str> = penalised[0].team_a.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(penalised[0].team_b.len(), 2);
    }

    #[test]
    fn test_skill_exponent_amplifies_strong_players() {
        let entries = roster(&[3.0, 2.0, 2.0, 1.0]);

        let linear = optimize(&entries, 1.0, |_, _| 1.0);
        let squared = optimize(&entries, 2.0, |_, _| 1.0);

        // Linear: {3,1} vs {2,2} balances exactly
        assert_eq!(linear[0].diff, 0.0);
        // Squared: 9+1 vs 4+4 leaves a gap of 2; 9 vs 4+4+1 is exact
        assert_eq!(squared[0].diff, 0.0);
        assert_eq!(squared[0].team_a.len(), 1);
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let partitions = optimize(&roster(&[1.0, 1.0]), 1.0, |_, _| 1.0);
        // mask 1 = {p0}, mask 2 = {p1}
        assert_eq!(partitions[0].team_a[0].id, "p0");
        assert_eq!(partitions[1].team_a[0].id, "p1");
    }

    #[test]
    fn test_optimizer_rejects_bad_exponent() {
        assert!(PartitionOptimizer::new(0.5, ImbalancePenalty::SizeAware).is_err());
        assert!(PartitionOptimizer::new(f64::NAN, ImbalancePenalty::Flat).is_err());
        assert!(PartitionOptimizer::new(1.5, ImbalancePenalty::Flat).is_ok());
    }

    proptest! {
        #[test]
        fn prop_every_partition_is_a_bipartition(
            weights in prop::collection::vec(0.0f64..2000.0, 2..9)
        ) {
            let entries = roster(&weights);
            let partitions = PartitionOptimizer::default().optimize(&entries);

            prop_assert_eq!(partitions.len(), 1usize << (weights.len() - 1));

            let all: HashSet<&str> = entries.iter().map(|e| e.player.id.as_str()).collect();
            for partition in &partitions {
                let a: HashSet<&str> = partition.team_a.iter().map(|p| p.id.as_str()).collect();
                let b: HashSet<&str> = partition.team_b.iter().map(|p| p.id.as_str()).collect();

                prop_assert_eq!(a.len(), partition.team_a.len());
                prop_assert_eq!(b.len(), partition.team_b.len());
                prop_assert!(a.is_disjoint(&b));
                prop_assert_eq!(a.union(&b).copied().collect::<HashSet<_>>(), all.clone());
                prop_assert!(partition.diff >= 0.0);
            }
        }

        #[test]
        fn prop_partitions_sorted_by_diff(
            weights in prop::collection::vec(0.0f64..2000.0, 2..9),
            exponent in 1.0f64..3.0
        ) {
            let partitions = optimize(&roster(&weights), exponent, size_aware_penalty);
            for pair in partitions.windows(2) {
                prop_assert!(pair[0].diff <= pair[1].diff);
            }
        }
    }
}
