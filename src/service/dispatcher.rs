//! Command dispatch
//!
//! Turns a parsed [`Command`] into reply text by driving the resolver,
//! optimizer, selection policy and rating engine. Failures never escape
//! [`CommandDispatcher::handle`]; they become a user-facing message instead.

use crate::command::Command;
use crate::config::AppConfig;
use crate::error::{Result, StatsError};
use crate::metrics::MetricsCollector;
use crate::rating::engine::SkillRatingEngine;
use crate::rating::history::MatchHistoryProvider;
use crate::rating::model::create_model;
use crate::render;
use crate::teams::partition::PartitionOptimizer;
use crate::teams::resolver::{TeamRequest, TeamRequestResolver, WeightSource};
use crate::teams::roster::RosterProvider;
use crate::teams::selection::SelectionPolicy;
use crate::types::Weighting;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct CommandDispatcher {
    roster: Arc<dyn RosterProvider>,
    history: Arc<dyn MatchHistoryProvider>,
    engine: SkillRatingEngine,
    optimizer: PartitionOptimizer,
    resolver: TeamRequestResolver,
    score_policy: SelectionPolicy,
    skill_policy: SelectionPolicy,
    metrics: Arc<MetricsCollector>,
}

impl CommandDispatcher {
    pub fn new(
        config: &AppConfig,
        roster: Arc<dyn RosterProvider>,
        history: Arc<dyn MatchHistoryProvider>,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self> {
        let teams = &config.teams;
        let model = create_model(&config.rating)?;
        let score_policy = SelectionPolicy::new(teams.score_tolerance, teams.side_names.clone())?;
        let skill_policy = score_policy.with_tolerance(teams.skill_tolerance)?;
        let engine = SkillRatingEngine::new(model, config.rating.conservative_k)?;
        let optimizer = PartitionOptimizer::new(teams.skill_exponent, teams.penalty)?;
        let resolver = TeamRequestResolver::new(teams.default_guest_weight, teams.max_roster_size);

        info!(
            "Teams: exponent {}, penalty {:?}, tolerance {} (score) / {} (skill), at most {} players",
            optimizer.skill_exponent(),
            optimizer.penalty(),
            score_policy.per_player_tolerance(),
            skill_policy.per_player_tolerance(),
            resolver.max_roster_size()
        );
        info!(
            "Ratings: {} model, conservative k {}",
            engine.model().name(),
            engine.conservative_k()
        );

        Ok(Self {
            roster,
            history,
            engine,
            optimizer,
            resolver,
            score_policy,
            skill_policy,
            metrics,
        })
    }

    /// Parse and run a command, always producing reply text
    pub fn handle(&self, text: &str) -> String {
        self.handle_with_rng(text, &mut rand::thread_rng())
    }

    pub fn handle_with_rng<R: Rng>(&self, text: &str, rng: &mut R) -> String {
        let timer = self.metrics.start_timer();

        let command = match text.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                debug!("Could not parse '{}': {}", text, e);
                self.metrics.record_command("unparsed", false, timer.stop());
                return render::render_error(&anyhow::Error::from(e));
            }
        };

        let result = self.execute(&command, rng);
        let duration = timer.stop();
        self.metrics
            .record_command(command.name(), result.is_ok(), duration);

        match result {
            Ok(reply) => {
                info!(
                    "Handled {} command in {:.2}ms",
                    command.name(),
                    duration.as_secs_f64() * 1000.0
                );
                reply
            }
            Err(e) => {
                match e.downcast_ref::<StatsError>() {
                    Some(StatsError::DataSource { .. })
                    | Some(StatsError::InternalError { .. })
                    | Some(StatsError::ConfigurationError { .. })
                    | None => error!("{} command failed: {:#}", command.name(), e),
                    Some(_) => warn!("{} command rejected: {}", command.name(), e),
                }
                render::render_error(&e)
            }
        }
    }

    /// Run an already parsed command
    pub fn execute<R: Rng>(&self, command: &Command, rng: &mut R) -> Result<String> {
        match command {
            Command::Teams(request) => self.teams(request, rng),
            Command::Skill { limit } => self.skill(*limit),
            Command::Ranking => self.ranking(),
            Command::Headshots => self.headshots(),
            Command::Help => Ok(render::HELP_TEXT.to_string()),
        }
    }

    fn teams<R: Rng>(&self, request: &TeamRequest, rng: &mut R) -> Result<String> {
        let roster = self.roster.roster()?;

        let (entries, policy) = match request.weighting {
            Weighting::Score => (
                self.resolver.resolve(request, &roster, WeightSource::Score)?,
                &self.score_policy,
            ),
            Weighting::Skill => {
                let rounds = self.history.rounds()?;
                let replay = self.engine.ratings(&rounds);
                let source = WeightSource::Skill {
                    ratings: &replay.ratings,
                    prior_mu: self.engine.model().default_rating().mu,
                };
                (
                    self.resolver.resolve(request, &roster, source)?,
                    &self.skill_policy,
                )
            }
        };

        let timer = self.metrics.start_timer();
        let partitions = self.optimizer.optimize(&entries);
        let split = policy
            .select(&partitions, entries.len(), rng)
            .ok_or_else(|| StatsError::InternalError {
                message: "No partitions generated".to_string(),
            })?;
        self.metrics.record_partitioning(
            entries.len(),
            partitions.len(),
            split.candidates,
            timer.stop(),
        );

        debug!(
            "Picked split with diff {} out of {} candidates",
            split.diff, split.candidates
        );
        Ok(render::render_team_split(&split))
    }

    fn skill(&self, limit: Option<usize>) -> Result<String> {
        let rounds = self.history.rounds()?;

        let timer = self.metrics.start_timer();
        let report = self.engine.rank(&rounds);
        self.metrics.record_ranking(&report, timer.stop());

        if report.rounds_skipped > 0 {
            warn!(
                "Skipped {} of {} rounds while ranking",
                report.rounds_skipped,
                rounds.len()
            );
        }

        let names: HashMap<String, String> = match self.roster.roster() {
            Ok(roster) => roster.into_iter().map(|e| (e.id, e.name)).collect(),
            Err(e) => {
                warn!("Showing player ids, roster unavailable: {}", e);
                HashMap::new()
            }
        };

        Ok(render::render_leaderboard(&report.leaderboard, &names, limit))
    }

    fn ranking(&self) -> Result<String> {
        let roster = self.roster.roster()?;
        Ok(render::render_ranking(&roster))
    }

    fn headshots(&self) -> Result<String> {
        let roster = self.roster.roster()?;
        Ok(render::render_headshots(&roster))
    }
}
