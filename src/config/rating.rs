//! Rating system configuration

use crate::rating::model::RatingModelKind;
use crate::rating::trueskill::TrueSkillParams;
use crate::rating::weng_lin::WengLinParams;
use serde::{Deserialize, Serialize};

/// Which model rates rounds, its parameters, and how the leaderboard is scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    pub model: RatingModelKind,
    /// `k` in the conservative score `mu - k * sigma`
    pub conservative_k: f64,
    pub trueskill: TrueSkillParams,
    pub weng_lin: WengLinParams,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            model: RatingModelKind::TrueSkill,
            conservative_k: 3.0,
            trueskill: TrueSkillParams::default(),
            weng_lin: WengLinParams::default(),
        }
    }
}
