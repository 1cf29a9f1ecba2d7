//! Weng-Lin (OpenSkill) rating model
//!
//! This module provides an alternative rating model using the Weng-Lin
//! algorithm from the skillratings crate. It converges similarly to TrueSkill
//! while being cheaper to compute.

use crate::error::{Result, StatsError};
use crate::rating::model::{bound_team, RatingModel};
use crate::types::Rating;
use serde::{Deserialize, Serialize};
use skillratings::weng_lin::{
    expected_score_two_teams, weng_lin_two_teams, WengLinConfig, WengLinRating,
};
use skillratings::Outcomes;

/// Weng-Lin parameters, including the prior for new players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WengLinParams {
    /// Initial rating for new players
    pub initial_mu: f64,
    /// Initial uncertainty for new players
    pub initial_sigma: f64,
    /// Performance variability within a single round
    pub beta: f64,
    /// Smallest fraction of variance kept after an update
    pub uncertainty_tolerance: f64,
    /// Lower bound for sigma after an update
    pub min_sigma: f64,
}

impl Default for WengLinParams {
    fn default() -> Self {
        Self {
            initial_mu: 25.0,
            initial_sigma: 25.0 / 3.0,
            beta: 25.0 / 6.0,
            uncertainty_tolerance: 0.000_001,
            min_sigma: 0.01,
        }
    }
}

impl WengLinParams {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.beta <= 0.0 {
            return Err(StatsError::ConfigurationError {
                message: "Beta must be positive".to_string(),
            }
            .into());
        }

        if self.uncertainty_tolerance < 0.0 {
            return Err(StatsError::ConfigurationError {
                message: "Uncertainty tolerance must be non-negative".to_string(),
            }
            .into());
        }

        if self.initial_sigma <= 0.0 {
            return Err(StatsError::ConfigurationError {
                message: "Initial uncertainty must be positive".to_string(),
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

    fn weng_lin_config(&self) -> WengLinConfig {
        WengLinConfig {
            beta: self.beta,
            uncertainty_tolerance: self.uncertainty_tolerance,
        }
    }
}

/// Weng-Lin implementation of [`RatingModel`]
#[derive(Debug)]
pub struct WengLinModel {
    params: WengLinParams,
    config: WengLinConfig,
}

impl WengLinModel {
    /// Create a new Weng-Lin rating model
    pub fn new(params: WengLinParams) -> Result<Self> {
        params.validate()?;
        let config = params.weng_lin_config();

        Ok(Self { params, config })
    }
}

fn to_weng_lin(team: &[Rating]) -> Vec<WengLinRating> {
    team.iter().map(|r| (*r).into()).collect()
}

impl RatingModel for WengLinModel {
    fn update(&self, winners: &[Rating], losers: &[Rating]) -> (Vec<Rating>, Vec<Rating>) {
        let (new_winners, new_losers) = weng_lin_two_teams(
            &to_weng_lin(winners),
            &to_weng_lin(losers),
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
            expected_score_two_teams(&to_weng_lin(team_a), &to_weng_lin(team_b), &self.config);
        team_a_wins
    }

    fn name(&self) -> &'static str {
        "weng_lin"
    }
}
