//! Turning a team request into a weighted roster
//!
//! The resolver applies the include/exclude filter to the roster, appends
//! guests, chooses each entry's weight and enforces the roster size limits
//! before anything reaches the optimizer.

use crate::error::{Result, StatsError};
use crate::teams::roster::RosterEntry;
use crate::types::{Player, PlayerId, Rating, WeightedEntry, Weighting};
use crate::utils::generate_guest_id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Smallest roster that can be split into two sides
pub const MIN_ROSTER_SIZE: usize = 2;

/// Which roster members take part
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RosterFilter {
    #[default]
    All,
    /// Only these players (by name or id)
    Include(Vec<String>),
    /// Everybody except these players (by name or id)
    Exclude(Vec<String>),
}

/// A player who is not on the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestSpec {
    pub name: String,
    /// Stated weight; the configured default applies when absent
    pub weight: Option<f64>,
}

impl GuestSpec {
    pub fn new(name: impl Into<String>, weight: Option<f64>) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Parsed form of a `teams` command
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamRequest {
    pub filter: RosterFilter,
    pub guests: Vec<GuestSpec>,
    pub weighting: Weighting,
}

/// Where weights come from for one resolution
#[derive(Debug, Clone, Copy)]
pub enum WeightSource<'a> {
    /// Roster scores; guests fall back to the default guest weight
    Score,
    /// Rating mu; unrated players and guests fall back to `prior_mu`
    Skill {
        ratings: &'a HashMap<PlayerId, Rating>,
        prior_mu: f64,
    },
}

#[derive(Debug, Clone)]
pub struct TeamRequestResolver {
    default_guest_weight: f64,
    max_roster_size: usize,
}

impl TeamRequestResolver {
    pub fn new(default_guest_weight: f64, max_roster_size: usize) -> Self {
        Self {
            default_guest_weight,
            max_roster_size,
        }
    }

    pub fn max_roster_size(&self) -> usize {
        self.max_roster_size
    }

    /// Build the ordered weighted roster: filtered roster entries in roster
    /// order, then guests in request order.
    pub fn resolve(
        &self,
        request: &TeamRequest,
        roster: &[RosterEntry],
        weights: WeightSource<'_>,
    ) -> Result<Vec<WeightedEntry>> {
        let selected = select_players(&request.filter, roster)?;

        let mut entries: Vec<WeightedEntry> = selected
            .into_iter()
            .map(|entry| {
                let weight = match weights {
                    WeightSource::Score => clamp_weight(entry.score, 0.0),
                    WeightSource::Skill { ratings, prior_mu } => clamp_weight(
                        ratings.get(&entry.id).map_or(prior_mu, |r| r.mu),
                        prior_mu,
                    ),
                };
                WeightedEntry::new(entry.player(), weight)
            })
            .collect();

        for guest in &request.guests {
            let fallback = match weights {
                WeightSource::Score => self.default_guest_weight,
                WeightSource::Skill { prior_mu, .. } => prior_mu,
            };
            let weight = guest.weight.map_or(fallback, |w| clamp_weight(w, fallback));
            let player = Player::new(generate_guest_id(), guest.name.clone());
            entries.push(WeightedEntry::new(player, clamp_weight(weight, 0.0)));
        }

        if entries.len() < MIN_ROSTER_SIZE {
            return Err(StatsError::RosterTooSmall {
                size: entries.len(),
                min: MIN_ROSTER_SIZE,
            }
            .into());
        }
        if entries.len() > self.max_roster_size {
            return Err(StatsError::RosterTooLarge {
                size: entries.len(),
                max: self.max_roster_size,
            }
            .into());
        }

        debug!(
            "Resolved {} players ({} guests) weighted by {}",
            entries.len(),
            request.guests.len(),
            request.weighting
        );
        Ok(entries)
    }
}

fn select_players<'a>(filter: &RosterFilter, roster: &'a [RosterEntry]) -> Result<Vec<&'a RosterEntry>> {
    match filter {
        RosterFilter::All => Ok(roster.iter().collect()),
        RosterFilter::Include(names) => {
            let missing: Vec<&str> = names
                .iter()
                .filter(|name| !roster.iter().any(|e| e.matches(name)))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                return Err(StatsError::PlayerNotFound {
                    names: missing.join(", "),
                }
                .into());
            }

            Ok(roster
                .iter()
                .filter(|e| names.iter().any(|name| e.matches(name)))
                .collect())
        }
        RosterFilter::Exclude(names) => {
            for name in names {
                if !roster.iter().any(|e| e.matches(name)) {
                    debug!("Excluded player {} is not on the roster", name);
                }
            }

            Ok(roster
                .iter()
                .filter(|e| !names.iter().any(|name| e.matches(name)))
                .collect())
        }
    }
}

/// Non-finite weights take `fallback`, negative ones clamp to zero
fn clamp_weight(weight: f64, fallback: f64) -> f64 {
    if weight.is_finite() {
        weight.max(0.0)
    } else {
        fallback
    }
}
