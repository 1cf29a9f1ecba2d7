//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the fragstats assistant using
//! Prometheus metrics.

use crate::rating::engine::RankingReport;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the assistant
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Team generation metrics
    team_metrics: TeamMetrics,

    /// Skill rating metrics
    rating_metrics: RatingMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Commands handled by command and outcome
    pub commands_total: IntCounterVec,

    /// Command handling time
    pub command_duration: Histogram,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Detected game starts and ends
    pub games_total: IntCounterVec,

    /// 1 while a game is being played
    pub game_active: IntGauge,
}

/// Team generation metrics
#[derive(Clone)]
pub struct TeamMetrics {
    /// Partitions scored by the optimizer
    pub partitions_evaluated_total: IntCounter,

    /// Size of rosters that were balanced
    pub roster_size: Histogram,

    /// Partitions within tolerance per request
    pub candidates: Histogram,

    /// Time spent enumerating partitions
    pub partition_duration: Histogram,
}

/// Skill rating metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Rounds folded into ratings
    pub rounds_processed_total: IntCounter,

    /// Rounds skipped as anomalous
    pub rounds_skipped_total: IntCounter,

    /// Players on the most recent leaderboard
    pub leaderboard_size: IntGauge,

    /// Time spent replaying the history
    pub rating_calculation_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let team_metrics = TeamMetrics::new(&registry)?;
        let rating_metrics = RatingMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            team_metrics,
            rating_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get team metrics
    pub fn teams(&self) -> &TeamMetrics {
        &self.team_metrics
    }

    /// Get rating metrics
    pub fn rating(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    /// Record a handled command
    pub fn record_command(&self, command: &str, success: bool, duration: Duration) {
        let status = if success { "success" } else { "error" };

        self.service_metrics
            .commands_total
            .with_label_values(&[command, status])
            .inc();

        self.service_metrics
            .command_duration
            .observe(duration.as_secs_f64());
    }

    /// Record one optimizer run
    pub fn record_partitioning(
        &self,
        roster_size: usize,
        partitions: usize,
        candidates: usize,
        duration: Duration,
    ) {
        self.team_metrics
            .partitions_evaluated_total
            .inc_by(partitions as u64);
        self.team_metrics.roster_size.observe(roster_size as f64);
        self.team_metrics.candidates.observe(candidates as f64);
        self.team_metrics
            .partition_duration
            .observe(duration.as_secs_f64());
    }

    /// Record one history replay
    pub fn record_ranking(&self, report: &RankingReport, duration: Duration) {
        self.rating_metrics
            .rounds_processed_total
            .inc_by(report.rounds_processed as u64);
        self.rating_metrics
            .rounds_skipped_total
            .inc_by(report.rounds_skipped as u64);
        self.rating_metrics
            .leaderboard_size
            .set(report.leaderboard.len() as i64);
        self.rating_metrics
            .rating_calculation_duration
            .observe(duration.as_secs_f64());
    }

    /// Record a detected game start or end
    pub fn record_game_event(&self, started: bool) {
        let event = if started { "started" } else { "ended" };

        self.service_metrics
            .games_total
            .with_label_values(&[event])
            .inc();
        self.service_metrics
            .game_active
            .set(if started { 1 } else { 0 });
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("fragstats_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let commands_total = IntCounterVec::new(
            Opts::new("fragstats_commands_total", "Total chat commands handled"),
            &["command", "status"],
        )?;
        registry.register(Box::new(commands_total.clone()))?;

        let command_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fragstats_command_duration_seconds",
                "Command handling time",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(command_duration.clone()))?;

        let health_status = IntGauge::new(
            "fragstats_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let games_total = IntCounterVec::new(
            Opts::new("fragstats_games_total", "Detected game starts and ends"),
            &["event"],
        )?;
        registry.register(Box::new(games_total.clone()))?;

        let game_active = IntGauge::new("fragstats_game_active", "Whether a game is in progress")?;
        registry.register(Box::new(game_active.clone()))?;

        Ok(Self {
            uptime_seconds,
            commands_total,
            command_duration,
            health_status,
            games_total,
            game_active,
        })
    }
}

impl TeamMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let partitions_evaluated_total = IntCounter::new(
            "fragstats_partitions_evaluated_total",
            "Total partitions scored by the optimizer",
        )?;
        registry.register(Box::new(partitions_evaluated_total.clone()))?;

        let roster_size = Histogram::with_opts(
            HistogramOpts::new("fragstats_roster_size", "Players per team request")
                .buckets(vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 20.0, 24.0]),
        )?;
        registry.register(Box::new(roster_size.clone()))?;

        let candidates = Histogram::with_opts(
            HistogramOpts::new(
                "fragstats_partition_candidates",
                "Partitions within tolerance per request",
            )
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 1000.0, 10000.0]),
        )?;
        registry.register(Box::new(candidates.clone()))?;

        let partition_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fragstats_partition_duration_seconds",
                "Partition enumeration time",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(partition_duration.clone()))?;

        Ok(Self {
            partitions_evaluated_total,
            roster_size,
            candidates,
            partition_duration,
        })
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rounds_processed_total = IntCounter::new(
            "fragstats_rounds_processed_total",
            "Total rounds folded into ratings",
        )?;
        registry.register(Box::new(rounds_processed_total.clone()))?;

        let rounds_skipped_total = IntCounter::new(
            "fragstats_rounds_skipped_total",
            "Total rounds skipped as empty or overlapping",
        )?;
        registry.register(Box::new(rounds_skipped_total.clone()))?;

        let leaderboard_size = IntGauge::new(
            "fragstats_leaderboard_size",
            "Players on the latest skill leaderboard",
        )?;
        registry.register(Box::new(leaderboard_size.clone()))?;

        let rating_calculation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fragstats_rating_calculation_duration_seconds",
                "History replay time",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(rating_calculation_duration.clone()))?;

        Ok(Self {
            rounds_processed_total,
            rounds_skipped_total,
            leaderboard_size,
            rating_calculation_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Encoder;

    fn render(collector: &MetricsCollector) -> String {
        let mut buffer = Vec::new();
        prometheus::TextEncoder::new()
            .encode(&collector.registry().gather(), &mut buffer)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_record_command() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_command("teams", true, Duration::from_millis(3));
        collector.record_command("teams", false, Duration::from_millis(1));
        collector.record_command("skill", true, Duration::from_millis(1));

        let commands = &collector.service().commands_total;
        assert_eq!(commands.with_label_values(&["teams", "success"]).get(), 1);
        assert_eq!(commands.with_label_values(&["teams", "error"]).get(), 1);
        assert_eq!(collector.service().command_duration.get_sample_count(), 3);
    }

    #[test]
    fn test_record_ranking() {
        let collector = MetricsCollector::new().unwrap();
        let report = RankingReport {
            leaderboard: Vec::new(),
            rounds_processed: 40,
            rounds_skipped: 2,
        };
        collector.record_ranking(&report, Duration::from_millis(2));

        assert_eq!(collector.rating().rounds_processed_total.get(), 40);
        assert_eq!(collector.rating().rounds_skipped_total.get(), 2);
        assert!(render(&collector).contains("fragstats_rounds_skipped_total 2"));
    }

    #[test]
    fn test_record_partitioning_and_games() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_partitioning(10, 512, 7, Duration::from_micros(300));
        collector.record_game_event(true);

        assert_eq!(collector.teams().partitions_evaluated_total.get(), 512);
        assert_eq!(collector.service().game_active.get(), 1);

        collector.record_game_event(false);
        assert_eq!(collector.service().game_active.get(), 0);
        assert_eq!(
            collector
                .service()
                .games_total
                .with_label_values(&["ended"])
                .get(),
            1
        );
    }

    #[test]
    fn test_separate_registries() {
        // Each collector owns its registry, so names never collide
        assert!(MetricsCollector::new().is_ok());
        assert!(MetricsCollector::new().is_ok());
    }
}
