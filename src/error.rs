//! Error types for the statistics assistant
//!
//! Library code returns `anyhow::Result` and raises the specific
//! [`StatsError`] variants below, mirroring how the service edge reports them.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific command and data scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("Unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("Roster too small: {size} players, need at least {min}")]
    RosterTooSmall { size: usize, min: usize },

    #[error("Roster too large: {size} players, at most {max} can be balanced")]
    RosterTooLarge { size: usize, max: usize },

    #[error("Player not found: {names}")]
    PlayerNotFound { names: String },

    #[error("Data source error: {message}")]
    DataSource { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
