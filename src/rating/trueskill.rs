//! TrueSkill rating model
//!
//! Wraps the two-team TrueSkill update from the skillratings crate. Draws
//! cannot happen in a round, so the default draw probability is zero.

use crate::error::{Result, StatsError};
use crate::rating::model::{bound_team, RatingModel};
use crate::types::Rating;
use serde::{Deserialize, Serialize};
use skillratings::trueskill::{
    expected_score_two_teams, trueskill_two_teams, TrueSkillConfig, TrueSkillRating,
};
use skillratings::Outcomes;

/// TrueSkill parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrueSkillParams {
    /// Prior mean for new players
    pub initial_mu: f64,
    /// Prior standard deviation for new players
    pub initial_sigma: f64,
    /// Performance variability within a single round
    pub beta: f64,
    /// Uncertainty added before every update so ratings can keep moving
    pub dynamics: f64,
    pub draw_probability: f64,
    /// Lower bound for sigma after an update
    pub min_sigma: f64,
}

impl Default for TrueSkillParams {
    fn default() -> Self {
        Self {
            initial_mu: 25.0,
            initial_sigma: 25.0 / 3.0,
            beta: 25.0 / 6.0,
            dynamics: 25.0 / 300.0,
            draw_probability: 0.0,
            min_sigma: 0.01,
        }
    }
}

impl TrueSkillParams {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.beta <= 0.0 {
            return Err(StatsError::ConfigurationError {
                message: "TrueSkill beta must be positive".to_string(),
            }
            .into());
        }

        if self.initial_sigma <= 0.0 {
            return Err(StatsError::ConfigurationError {
                message: "Initial sigma must be positive".to_string(),
            }
            .into());
        }

        if self.dynamics < 0.0 {
            return Err(StatsError::ConfigurationError {
                message: "TrueSkill dynamics must be non-negative".to_string(),
            }
            .into());
        }

        if !(0.0..1.0).contains(&self.draw_probability) {
            return Err(StatsError::ConfigurationError {
                message: "Draw probability must be in [0, 1)".to_string(),
            }
            .into());
        }

        if self.min_sigma < 0.0 || self.min_sigma >= self.initial_sigma {
            return Err(StatsError::ConfigurationError {
                message: "Sigma floor must be non-negative and below the initial sigma".to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn trueskill_config(&self) -> TrueSkillConfig {
        TrueSkillConfig {
            draw_probability: self.draw_probability,
            beta: self.beta,
            default_dynamics: self.dynamics,
        }
    }
}

/// TrueSkill implementation of [`RatingModel`]
#[derive(Debug)]
pub struct TrueSkillModel {
    params: TrueSkillParams,
    config: TrueSkillConfig,
}

impl TrueSkillModel {
    pub fn new(params: TrueSkillParams) -> Result<Self> {
        params.validate()?;
        let config = params.trueskill_config();

        Ok(Self { params, config })
    }

    pub fn params(&self) -> &TrueSkillParams {
        &self.params
    }
}

impl Default for TrueSkillModel {
    fn default() -> Self {
        let params = TrueSkillParams::default();
        let config = params.trueskill_config();
        Self { params, config }
    }
}

fn to_trueskill(team: &[Rating]) -> Vec<TrueSkillRating> {
    team.iter().map(|r| (*r).into()).collect()
}

impl RatingModel for TrueSkillModel {
    fn update(&self, winners: &[Rating], losers: &[Rating]) -> (Vec<Rating>, Vec<Rating>) {
        let (new_winners, new_losers) = trueskill_two_teams(
            &to_trueskill(winners),
            &to_trueskill(losers),
            &Outcomes::WIN,
            &self.config,
        );

        let min_sigma = self.params.min_sigma;
        (
            bound_team(winners, new_winners, min_sigma),
            bound_team(losers, new_losers, min_sigma),
        )
    }

    fn default_rating(&self) -> Rating {
        Rating::new(self.params.initial_mu, self.params.initial_sigma)
    }

    fn win_probability(&self, team_a: &[Rating], team_b: &[Rating]) -> f64 {
        let (team_a_wins, _) =
            expected_score_two_teams(&to_trueskill(team_a), &to_trueskill(team_b), &self.config);
        team_a_wins
    }

    fn name(&self) -> &'static str {
        "trueskill"
    }
}
