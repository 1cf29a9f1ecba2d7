//! Utility functions for the statistics assistant

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate an ephemeral id for a guest player
pub fn generate_guest_id() -> String {
    format!("guest-{}", Uuid::new_v4())
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}
