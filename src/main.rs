//! Main entry point for the fragstats assistant
//!
//! Reads chat messages line by line from stdin, answers the ones addressed to
//! the assistant on stdout, watches the scoreboard for game activity and
//! serves health and metrics over HTTP until shut down.

use anyhow::Result;
use clap::Parser;
use fragstats::config::AppConfig;
use fragstats::metrics::{HealthServer, HealthServerConfig, MetricsCollector};
use fragstats::rating::history::{JsonMatchHistory, MatchHistoryProvider};
use fragstats::service::{serve, CommandDispatcher, LineTransport};
use fragstats::teams::roster::{JsonRosterProvider, RosterProvider};
use fragstats::tracker::{ActivityEvent, ActivityTracker};
use fragstats::utils::current_timestamp;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Fragstats - match statistics and team balancing for a shooter community
#[derive(Parser)]
#[command(
    name = "fragstats",
    version,
    about = "Chat assistant for balanced teams and skill rankings",
    long_about = "Fragstats answers chat commands for balanced team splits and TrueSkill-style \
                 skill leaderboards computed from round history. Messages are read from stdin, \
                 one per line, and replies are written to stdout."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Roster file override
    #[arg(long, value_name = "FILE", help = "Override roster JSON file")]
    roster: Option<PathBuf>,

    /// Round history file override
    #[arg(long, value_name = "FILE", help = "Override round history JSON file")]
    rounds: Option<PathBuf>,

    /// Mention token override
    #[arg(long, value_name = "TOKEN", help = "Token that addresses the assistant")]
    mention: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override health and metrics port")]
    health_port: Option<u16>,

    /// Run a single command and exit
    #[arg(
        long,
        value_name = "COMMAND",
        help = "Answer one command (e.g. \"teams exclude bob\") and exit"
    )]
    command: Option<String>,

    /// Disable game activity tracking
    #[arg(long, help = "Do not poll the roster for game activity")]
    no_tracker: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level.
/// Logs go to stderr since stdout carries replies.
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Poll the roster total and log game starts and ends
async fn activity_task(
    roster: Arc<dyn RosterProvider>,
    metrics: Arc<MetricsCollector>,
    config: AppConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut tracker = ActivityTracker::new(config.inactivity_timeout());
    let mut interval = tokio::time::interval(config.poll_interval());

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = interval.tick() => {
                let roster = roster.clone();
                let total = match tokio::task::spawn_blocking(move || roster.total_score()).await {
                    Ok(Ok(total)) => total,
                    Ok(Err(e)) => {
                        warn!("Could not read scoreboard total: {}", e);
                        continue;
                    }
                    Err(e) => {
                        error!("Scoreboard poll task failed: {}", e);
                        continue;
                    }
                };

                let (next, event) = tracker.observe(total, current_timestamp());
                tracker = next;

                match event {
                    Some(ActivityEvent::GameStarted { at }) => {
                        info!("Game started at {}", at);
                        metrics.record_game_event(true);
                    }
                    Some(ActivityEvent::GameEnded { at }) => {
                        info!("Game ended at {}", at);
                        metrics.record_game_event(false);
                    }
                    None => {}
                }
            }
        }
    }

    info!("Activity tracker stopped");
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("Fragstats statistics assistant");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Health port: {}", config.service.health_port);
    info!("   Mention: {}", config.service.mention);
    info!("   Roster: {}", config.data.roster_path.display());
    info!("   Rounds: {}", config.data.rounds_path.display());
    info!("   Rating model: {:?}", config.rating.model);
    info!("   Max roster size: {}", config.teams.max_roster_size);
    info!("   Activity tracker: {}", config.tracker.enabled);
}

/// Load and merge configuration from file or environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(roster) = &args.roster {
        config.data.roster_path = roster.clone();
    }

    if let Some(rounds) = &args.rounds {
        config.data.rounds_path = rounds.clone();
    }

    if let Some(mention) = &args.mention {
        config.service.mention = mention.clone();
    }

    if let Some(port) = args.health_port {
        config.service.health_port = port;
    }

    if args.no_tracker {
        config.tracker.enabled = false;
    }

    fragstats::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    let roster: Arc<dyn RosterProvider> =
        Arc::new(JsonRosterProvider::new(config.data.roster_path.clone()));
    let history: Arc<dyn MatchHistoryProvider> =
        Arc::new(JsonMatchHistory::new(config.data.rounds_path.clone()));
    let metrics = Arc::new(MetricsCollector::new()?);
    let dispatcher = Arc::new(CommandDispatcher::new(
        &config,
        roster.clone(),
        history.clone(),
        metrics.clone(),
    )?);

    if let Some(command) = &args.command {
        let dispatcher = dispatcher.clone();
        let command = command.clone();
        let reply = tokio::task::spawn_blocking(move || dispatcher.handle(&command)).await?;
        println!("{}", reply);
        return Ok(());
    }

    display_startup_banner(&config);

    let (shutdown_tx, _) = broadcast::channel::<()>(4);

    // Health and metrics endpoints
    let health_server = Arc::new(
        HealthServer::new(
            HealthServerConfig {
                port: config.service.health_port,
                ..Default::default()
            },
            metrics.clone(),
        )
        .with_sources(roster.clone(), history.clone()),
    );
    let health_task = {
        let health_server = health_server.clone();
        tokio::spawn(async move {
            if let Err(e) = health_server.start().await {
                error!("Health server failed: {}", e);
            }
        })
    };

    // Game activity tracking
    let activity = config.tracker.enabled.then(|| {
        tokio::spawn(activity_task(
            roster.clone(),
            metrics.clone(),
            config.clone(),
            shutdown_tx.subscribe(),
        ))
    });

    // Signals feed the same shutdown channel as end of input
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            let _ = shutdown_tx.send(());
        });
    }

    info!("Fragstats is running, listening for '{}' on stdin", config.service.mention);

    let mut transport = LineTransport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    match serve(
        &mut transport,
        dispatcher,
        &config.service.mention,
        config.service.max_concurrent_operations,
        shutdown_tx.subscribe(),
    )
    .await
    {
        Ok(stats) => info!(
            "Transport finished - {} messages, {} commands, {} ignored",
            stats.received, stats.handled, stats.ignored
        ),
        Err(e) => error!("Transport failed: {}", e),
    }

    // Begin graceful shutdown
    info!("Beginning graceful shutdown...");
    let _ = shutdown_tx.send(());
    health_server.stop().await?;

    let shutdown = async {
        if let Some(activity) = activity {
            let _ = activity.await;
        }
        let _ = health_task.await;
    };

    match tokio::time::timeout(config.shutdown_timeout(), shutdown).await {
        Ok(()) => info!("Graceful shutdown completed successfully"),
        Err(_) => warn!("Shutdown timeout exceeded, forcing exit"),
    }

    info!("Fragstats stopped");
    Ok(())
}
