//! Game activity detection
//!
//! The game server only exposes cumulative scoreboard totals, so a game is
//! inferred: the total starts moving when play begins and stays still once
//! everybody has left. [`ActivityTracker`] is a plain value that is fed one
//! observation at a time and hands back its successor.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivityState {
    #[default]
    Idle,
    Active,
}

/// Transition reported by [`ActivityTracker::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityEvent {
    GameStarted { at: DateTime<Utc> },
    GameEnded { at: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityTracker {
    pub state: ActivityState,
    pub last_total: Option<i64>,
    pub last_change: Option<DateTime<Utc>>,
    inactivity_timeout: Duration,
}

impl ActivityTracker {
    pub fn new(inactivity_timeout: Duration) -> Self {
        Self {
            state: ActivityState::Idle,
            last_total: None,
            last_change: None,
            inactivity_timeout,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == ActivityState::Active
    }

    /// Fold in the score total seen at `now`.
    ///
    /// The first observation only sets the baseline. A changed total marks
    /// activity and starts a game if idle; a total that has not moved for
    /// longer than the inactivity timeout ends the running game.
    pub fn observe(self, total: i64, now: DateTime<Utc>) -> (Self, Option<ActivityEvent>) {
        let mut next = Self {
            last_total: Some(total),
            ..self
        };

        let Some(previous) = self.last_total else {
            return (next, None);
        };

        if previous != total {
            next.last_change = Some(now);
            if next.state == ActivityState::Idle {
                next.state = ActivityState::Active;
                return (next, Some(ActivityEvent::GameStarted { at: now }));
            }
            return (next, None);
        }

        match next.last_change {
            Some(changed) if now - changed > next.inactivity_timeout && next.is_active() => {
                next.state = ActivityState::Idle;
                (next, Some(ActivityEvent::GameEnded { at: now }))
            }
            _ => (next, None),
        }
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(Duration::seconds(120))
    }
}
