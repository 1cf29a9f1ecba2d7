//! Metrics and monitoring for the fragstats assistant
//!
//! This module provides metrics collection and the HTTP health and metrics
//! endpoints.

pub mod collector;
pub mod health;

pub use collector::{MetricsCollector, MetricsTimer, RatingMetrics, ServiceMetrics, TeamMetrics};
pub use health::{HealthServer, HealthServerConfig, HealthStatus};
