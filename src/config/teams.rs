//! Team balancing configuration

use crate::teams::partition::ImbalancePenalty;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSettings {
    /// Exponent applied to each weight before summing a side (>= 1)
    pub skill_exponent: f64,
    pub penalty: ImbalancePenalty,
    /// Acceptable diff per roster member when balancing by score
    pub score_tolerance: f64,
    /// Acceptable diff per roster member when balancing by skill
    pub skill_tolerance: f64,
    /// Largest roster the optimizer will enumerate
    pub max_roster_size: usize,
    /// Weight for guests that did not state one
    pub default_guest_weight: f64,
    pub side_names: [String; 2],
}

impl Default for TeamSettings {
    fn default() -> Self {
        Self {
            skill_exponent: 1.0,
            penalty: ImbalancePenalty::SizeAware,
            score_tolerance: 10.0,
            skill_tolerance: 1.0,
            max_roster_size: 16,
            default_guest_weight: 1000.0,
            side_names: ["Terrorists".to_string(), "Counter Terrorists".to_string()],
        }
    }
}
