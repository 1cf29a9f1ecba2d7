//! Single-round rating update interface
//!
//! A rating model folds one observed outcome (winners beat losers) into the
//! Gaussian skill beliefs of everybody who took part.

use crate::config::RatingSettings;
use crate::error::Result;
use crate::rating::trueskill::TrueSkillModel;
use crate::rating::weng_lin::WengLinModel;
use crate::types::Rating;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trait for two-team, win/loss rating updates
pub trait RatingModel: Send + Sync + std::fmt::Debug {
    /// Update both teams after `winners` beat `losers`.
    ///
    /// Returned vectors line up index-for-index with the inputs. Winners'
    /// mu rises, losers' mu falls, and every sigma shrinks but never below
    /// the model's floor. Both teams must be non-empty.
    fn update(&self, winners: &[Rating], losers: &[Rating]) -> (Vec<Rating>, Vec<Rating>);

    /// Prior rating for a player seen for the first time
    fn default_rating(&self) -> Rating;

    /// Probability that `team_a` beats `team_b`
    fn win_probability(&self, team_a: &[Rating], team_b: &[Rating]) -> f64;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Available rating models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RatingModelKind {
    #[default]
    #[serde(rename = "trueskill")]
    TrueSkill,
    #[serde(rename = "weng_lin")]
    WengLin,
}

impl std::str::FromStr for RatingModelKind {
    type Err = crate::error::StatsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trueskill" => Ok(RatingModelKind::TrueSkill),
            "weng_lin" | "weng-lin" | "openskill" => Ok(RatingModelKind::WengLin),
            other => Err(crate::error::StatsError::ConfigurationError {
                message: format!("Unknown rating model: {}", other),
            }),
        }
    }
}

/// Build the configured rating model
pub fn create_model(settings: &RatingSettings) -> Result<Arc<dyn RatingModel>> {
    let model: Arc<dyn RatingModel> = match settings.model {
        RatingModelKind::TrueSkill => Arc::new(TrueSkillModel::new(settings.trueskill.clone())?),
        RatingModelKind::WengLin => Arc::new(WengLinModel::new(settings.weng_lin.clone())?),
    };

    Ok(model)
}

/// Bound a posterior's sigma: never above the prior's, never below the
/// model floor unless the prior already was.
pub(crate) fn bound_sigma(prior: &Rating, posterior: Rating, min_sigma: f64) -> Rating {
    let floor = min_sigma.min(prior.sigma);
    Rating {
        mu: posterior.mu,
        sigma: posterior.sigma.min(prior.sigma).max(floor),
    }
}

/// [`bound_sigma`] applied index-for-index over a team
pub(crate) fn bound_team<T>(priors: &[Rating], posteriors: Vec<T>, min_sigma: f64) -> Vec<Rating>
where
    T: Into<Rating>,
{
    priors
        .iter()
        .zip(posteriors)
        .map(|(prior, posterior)| bound_sigma(prior, posterior.into(), min_sigma))
        .collect()
}
