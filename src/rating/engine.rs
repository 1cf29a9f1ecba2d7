//! Skill rating engine
//!
//! Replays a chronological round history through a [`RatingModel`] and turns
//! the final ratings into a leaderboard. Nothing is persisted between calls;
//! every ranking is recomputed from the full history it is given.

use crate::error::{Result, StatsError};
use crate::rating::model::RatingModel;
use crate::types::{LeaderboardEntry, PlayerId, Rating, Round};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Final ratings after replaying a history
#[derive(Debug, Clone, Default)]
pub struct RatingReplay {
    pub ratings: HashMap<PlayerId, Rating>,
    pub rounds_processed: usize,
    pub rounds_skipped: usize,
}

/// Leaderboard plus bookkeeping about the replay that produced it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingReport {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub rounds_processed: usize,
    pub rounds_skipped: usize,
}

/// Fold `rounds` through `model`, creating ratings with `prior` on first sight.
///
/// Rounds with an empty side or a player on both sides are skipped without
/// touching any rating.
pub fn replay<F>(model: &dyn RatingModel, rounds: &[Round], mut prior: F) -> RatingReplay
where
    F: FnMut() -> Rating,
{
    let mut result = RatingReplay::default();

    for round in rounds {
        if !round.is_valid() {
            warn!(
                "Skipping round {} - winners: {:?}, losers: {:?} (empty side or overlapping teams)",
                round.sequence, round.winners, round.losers
            );
            result.rounds_skipped += 1;
            continue;
        }

        let ratings = &mut result.ratings;
        let winners: Vec<Rating> = round
            .winners
            .iter()
            .map(|id| *ratings.entry(id.clone()).or_insert_with(&mut prior))
            .collect();
        let losers: Vec<Rating> = round
            .losers
            .iter()
            .map(|id| *ratings.entry(id.clone()).or_insert_with(&mut prior))
            .collect();

        let (new_winners, new_losers) = model.update(&winners, &losers);

        for (id, rating) in round.winners.iter().zip(new_winners) {
            ratings.insert(id.clone(), rating);
        }
        for (id, rating) in round.losers.iter().zip(new_losers) {
            ratings.insert(id.clone(), rating);
        }

        result.rounds_processed += 1;
    }

    result
}

/// Sort ratings into a leaderboard by `mu - k * sigma`, highest first.
/// Ties fall back to higher mu, then player id.
pub fn leaderboard(ratings: HashMap<PlayerId, Rating>, conservative_k: f64) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = ratings
        .into_iter()
        .map(|(player_id, rating)| LeaderboardEntry {
            player_id,
            rating,
            conservative_score: rating.conservative(conservative_k),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.conservative_score
            .total_cmp(&a.conservative_score)
            .then_with(|| b.rating.mu.total_cmp(&a.rating.mu))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    entries
}

/// Replay `rounds` and rank every player that appeared in a valid round
pub fn rank<F>(
    model: &dyn RatingModel,
    rounds: &[Round],
    prior: F,
    conservative_k: f64,
) -> RankingReport
where
    F: FnMut() -> Rating,
{
    let replayed = replay(model, rounds, prior);

    RankingReport {
        leaderboard: leaderboard(replayed.ratings, conservative_k),
        rounds_processed: replayed.rounds_processed,
        rounds_skipped: replayed.rounds_skipped,
    }
}

/// Rating engine bound to a model and a conservative-score constant
#[derive(Debug, Clone)]
pub struct SkillRatingEngine {
    model: Arc<dyn RatingModel>,
    conservative_k: f64,
}

impl SkillRatingEngine {
    pub fn new(model: Arc<dyn RatingModel>, conservative_k: f64) -> Result<Self> {
        if !conservative_k.is_finite() || conservative_k < 0.0 {
            return Err(StatsError::ConfigurationError {
                message: format!("Conservative k must be non-negative, got {}", conservative_k),
            }
            .into());
        }

        Ok(Self {
            model,
            conservative_k,
        })
    }

    pub fn model(&self) -> &dyn RatingModel {
        self.model.as_ref()
    }

    pub fn conservative_k(&self) -> f64 {
        self.conservative_k
    }

    /// Final ratings for every player, using the model's prior
    pub fn ratings(&self, rounds: &[Round]) -> RatingReplay {
        replay(self.model.as_ref(), rounds, || self.model.default_rating())
    }

    /// Leaderboard for the full history, using the model's prior
    pub fn rank(&self, rounds: &[Round]) -> RankingReport {
        let report = rank(
            self.model.as_ref(),
            rounds,
            || self.model.default_rating(),
            self.conservative_k,
        );

        debug!(
            "Ranked {} players with {} from {} rounds ({} skipped)",
            report.leaderboard.len(),
            self.model.name(),
            report.rounds_processed,
            report.rounds_skipped
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::trueskill::TrueSkillModel;
    use crate::rating::weng_lin::{WengLinModel, WengLinParams};

    fn engine() -> SkillRatingEngine {
        SkillRatingEngine::new(Arc::new(TrueSkillModel::default()), 3.0).unwrap()
    }

    fn history() -> Vec<Round> {
        vec![
            Round::new(0, ["alice", "bob"], ["carol", "dave"]),
            Round::new(1, ["alice", "carol"], ["bob", "dave"]),
            Round::new(2, ["alice", "dave"], ["bob", "carol"]),
            Round::new(3, ["bob", "carol"], ["alice", "dave"]),
            Round::new(4, ["alice", "bob"], ["carol", "dave", "erin"]),
        ]
    }

    fn entry<'a>(board: &'a [LeaderboardEntry], id: &str) -> &'a LeaderboardEntry {
        board.iter().find(|e| e.player_id == id).unwrap()
    }

    #[test]
    fn test_single_round_winner_above_loser() {
        let engine = engine();
        let prior = engine.model().default_rating();

        let report = engine.rank(&[Round::new(0, ["A"], ["B"])]);
        assert_eq!(report.leaderboard.len(), 2);
        assert_eq!(report.rounds_processed, 1);

        let a = entry(&report.leaderboard, "A");
        let b = entry(&report.leaderboard, "B");
        assert!(a.rating.mu > b.rating.mu);
        assert!(a.rating.sigma < prior.sigma);
        assert!(b.rating.sigma < prior.sigma);
        assert_eq!(report.leaderboard[0].player_id, "A");
    }

    #[test]
    fn test_overlapping_round_is_skipped() {
        let engine = engine();
        let clean = history();

        let mut dirty = clean.clone();
        dirty.insert(2, Round::new(99, ["alice", "bob"], ["bob", "carol"]));

        let clean_report = engine.rank(&clean);
        let dirty_report = engine.rank(&dirty);

        assert_eq!(dirty_report.rounds_skipped, 1);
        assert_eq!(dirty_report.rounds_processed, clean.len());
        assert_eq!(clean_report.leaderboard, dirty_report.leaderboard);
    }

    #[test]
    fn test_empty_side_is_skipped() {
        let engine = engine();
        let rounds = vec![
            Round::new(0, ["ghost"], Vec::<String>::new()),
            Round::new(1, ["A"], ["B"]),
        ];

        let report = engine.rank(&rounds);
        assert_eq!(report.rounds_skipped, 1);
        assert_eq!(report.leaderboard.len(), 2);
        assert!(report.leaderboard.iter().all(|e| e.player_id != "ghost"));
    }

    #[test]
    fn test_leaderboard_sorted_by_conservative_score() {
        let report = engine().rank(&history());

        assert_eq!(report.leaderboard.len(), 5);
        for pair in report.leaderboard.windows(2) {
            assert!(pair[0].conservative_score >= pair[1].conservative_score);
        }
        for entry in &report.leaderboard {
            let expected = entry.rating.mu - 3.0 * entry.rating.sigma;
            assert_eq!(entry.conservative_score, expected);
        }
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let engine = engine();
        let first = engine.rank(&history());
        let second = engine.rank(&history());

        assert_eq!(first, second);
        for (a, b) in first.leaderboard.iter().zip(&second.leaderboard) {
            assert_eq!(a.rating.mu.to_bits(), b.rating.mu.to_bits());
            assert_eq!(a.rating.sigma.to_bits(), b.rating.sigma.to_bits());
        }
    }

    #[test]
    fn test_ties_break_by_mu_then_id() {
        let ratings = HashMap::from([
            ("zed".to_string(), Rating::new(25.0, 5.0)),
            ("amy".to_string(), Rating::new(25.0, 5.0)),
            ("max".to_string(), Rating::new(31.0, 7.0)),
        ]);

        // all three share mu - 3 sigma = 10
        let board = leaderboard(ratings, 3.0);
        let ids: Vec<&str> = board.iter().map(|e| e.player_id.as_str()).collect();
        assert_eq!(ids, vec!["max", "amy", "zed"]);
    }

    #[test]
    fn test_custom_prior_factory() {
        let model = TrueSkillModel::default();
        let mut created = 0;

        let report = rank(
            &model,
            &history(),
            || {
                created += 1;
                Rating::new(1000.0, 100.0)
            },
            0.0,
        );

        assert_eq!(created, 5);
        assert!(report.leaderboard.iter().all(|e| e.rating.sigma < 100.0));
        assert!(report.leaderboard.iter().all(|e| (e.rating.mu - 1000.0).abs() < 500.0));
    }

    #[test]
    fn test_confident_prior_is_never_loosened() {
        let model = TrueSkillModel::default();

        // prior sigma sits below the model's sigma floor
        let report = rank(&model, &history(), || Rating::new(25.0, 0.001), 3.0);

        assert_eq!(report.leaderboard.len(), 5);
        assert!(report.leaderboard.iter().all(|e| e.rating.sigma <= 0.001));
    }

    #[test]
    fn test_unrated_players_absent() {
        let report = engine().rank(&[]);
        assert!(report.leaderboard.is_empty());
        assert_eq!(report.rounds_processed, 0);
    }

    #[test]
    fn test_weng_lin_engine() {
        let model = Arc::new(WengLinModel::new(WengLinParams::default()).unwrap());
        let engine = SkillRatingEngine::new(model, 3.0).unwrap();

        let report = engine.rank(&[Round::new(0, ["A"], ["B"]), Round::new(1, ["A"], ["B"])]);
        assert_eq!(report.leaderboard[0].player_id, "A");
        assert!(report.leaderboard[0].rating.mu > report.leaderboard[1].rating.mu);
    }

    #[test]
    fn test_negative_k_rejected() {
        assert!(SkillRatingEngine::new(Arc::new(TrueSkillModel::default()), -1.0).is_err());
    }
}
