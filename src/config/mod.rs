//! Configuration management for the fragstats assistant
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod rating;
pub mod teams;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, DataSettings, ServiceSettings, TrackerSettings};
pub use rating::RatingSettings;
pub use teams::TeamSettings;
