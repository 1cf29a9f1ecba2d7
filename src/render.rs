//! Plain-text replies
//!
//! Tables are wrapped in a fenced code block so chat clients keep the column
//! alignment. Team splits use chat markup for the side names instead.

use crate::error::StatsError;
use crate::teams::roster::RosterEntry;
use crate::teams::selection::{Side, TeamSplit};
use crate::types::{LeaderboardEntry, PlayerId};
use std::collections::HashMap;
use std::fmt::Write;

pub const UNKNOWN_COMMAND_HINT: &str = "Not sure what you mean. Try *teams* or *skill*.";

pub const HELP_TEXT: &str = "\
*teams* - balanced teams from the whole roster
*teams exclude a, b* - everybody except a and b
*teams include a, b; guests x 1200, y* - only a and b, plus two guests
*teams ...; by skill* - balance by skill instead of score
*skill [N]* - skill leaderboard, optionally the top N
*ranking* - roster by score
*headshots* - roster by headshot percentage";

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn render_side(out: &mut String, side: &Side) {
    let _ = writeln!(out, "*{}*:\n", side.name);
    for player in &side.players {
        let _ = writeln!(out, "* {}", player.name);
    }
    out.push('\n');
}

/// Both sides with their members, then the imbalance
pub fn render_team_split(split: &TeamSplit) -> String {
    let mut out = String::new();
    render_side(&mut out, &split.first);
    render_side(&mut out, &split.second);
    let _ = write!(out, "Team difference: {}", format_number(split.diff));
    out
}

/// Leaderboard table by conservative score; ids are shown as names when known
pub fn render_leaderboard(
    leaderboard: &[LeaderboardEntry],
    names: &HashMap<PlayerId, String>,
    limit: Option<usize>,
) -> String {
    if leaderboard.is_empty() {
        return "No rounds have been recorded yet.".to_string();
    }

    let mut out = String::from("```\n");
    let _ = writeln!(out, "{:>23}{:>6}", "Nick", "Skill");
    for (i, entry) in leaderboard.iter().take(limit.unwrap_or(usize::MAX)).enumerate() {
        let name = names.get(&entry.player_id).unwrap_or(&entry.player_id);
        let _ = writeln!(out, "{:>2}.{:>20}{:>6.0}", i + 1, name, entry.conservative_score);
    }
    out.push_str("```");
    out
}

/// Roster sorted by score, highest first, with per-round score and KDR
pub fn render_ranking(roster: &[RosterEntry]) -> String {
    if roster.is_empty() {
        return "No players on the roster yet.".to_string();
    }

    let mut sorted: Vec<&RosterEntry> = roster.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));

    let mut out = String::from("```\n");
    let _ = writeln!(out, "{:>23}{:>8}{:>6}{:>6}", "Nick", "Score/r", "Score", "KDR");
    for (i, entry) in sorted.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}.{:>20}{:>8.2}{:>6.0}{:>6.2}",
            i + 1,
            entry.name,
            entry.score_per_round(),
            entry.score,
            entry.kill_death_ratio()
        );
    }
    out.push_str("```");
    out
}

/// Roster sorted by headshot percentage
pub fn render_headshots(roster: &[RosterEntry]) -> String {
    if roster.is_empty() {
        return "No players on the roster yet.".to_string();
    }

    let mut sorted: Vec<&RosterEntry> = roster.iter().collect();
    sorted.sort_by(|a, b| {
        b.headshot_percentage()
            .total_cmp(&a.headshot_percentage())
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut out = String::from("```\n");
    let _ = writeln!(out, "{:>23}{:>6}{:>8}{:>6}", "Nick", "%", "HShot/r", "Total");
    for (i, entry) in sorted.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {:>19}{:>6.1}{:>8.2}{:>6}",
            i + 1,
            entry.name,
            entry.headshot_percentage(),
            entry.headshots_per_round(),
            entry.headshots
        );
    }
    out.push_str("```");
    out
}

/// User-facing text for a failed command
pub fn render_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<StatsError>() {
        Some(StatsError::UnknownCommand { .. }) => UNKNOWN_COMMAND_HINT.to_string(),
        Some(StatsError::InvalidCommand { reason }) => {
            format!("Could not make sense of that: {}.", reason)
        }
        Some(StatsError::RosterTooSmall { size, min }) => {
            format!("Need at least {} players to make teams, found {}.", min, size)
        }
        Some(StatsError::RosterTooLarge { size, max }) => format!(
            "{} players is too many, teams can be made for at most {}.",
            size, max
        ),
        Some(StatsError::PlayerNotFound { names }) => {
            format!("Don't know who {} is.", names)
        }
        _ => "Something went wrong, check the logs.".to_string(),
    }
}
