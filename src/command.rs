//! Chat command language
//!
//! Messages addressed to the assistant are parsed once into a closed
//! [`Command`] type:
//!
//! ```text
//! teams [exclude a, b] [; include a, b] [; guests x 1200, y] [; by skill]
//! skill [N]
//! ranking
//! headshots
//! help
//! ```

use crate::error::StatsError;
use crate::teams::resolver::{GuestSpec, RosterFilter, TeamRequest};
use crate::types::Weighting;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Split the roster into two balanced sides
    Teams(TeamRequest),
    /// Skill leaderboard, optionally limited to the top `limit` players
    Skill { limit: Option<usize> },
    /// Roster ordered by score
    Ranking,
    /// Roster ordered by headshot percentage
    Headshots,
    Help,
}

impl Command {
    /// Label used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            Command::Teams(_) => "teams",
            Command::Skill { .. } => "skill",
            Command::Ranking => "ranking",
            Command::Headshots => "headshots",
            Command::Help => "help",
        }
    }
}

impl FromStr for Command {
    type Err = StatsError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim().to_lowercase();
        let (word, rest) = match text.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (text.as_str(), ""),
        };

        match word {
            "teams" | "team" => parse_team_request(rest).map(Command::Teams),
            "skill" => parse_skill(rest),
            "ranking" => Ok(Command::Ranking),
            "headshots" => Ok(Command::Headshots),
            "help" => Ok(Command::Help),
            _ => Err(StatsError::UnknownCommand {
                command: word.to_string(),
            }),
        }
    }
}

/// The command text of a message addressed with `mention`, trimmed and
/// lowercased. `None` if the message does not contain the mention.
pub fn extract_directed_command(text: &str, mention: &str) -> Option<String> {
    let (_, after) = text.split_once(mention)?;
    let command = after.trim_start_matches(&[':', ','][..]).trim();
    Some(command.to_lowercase())
}

fn parse_skill(rest: &str) -> Result<Command, StatsError> {
    if rest.is_empty() {
        return Ok(Command::Skill { limit: None });
    }

    match rest.parse::<usize>() {
        Ok(0) | Err(_) => Err(StatsError::InvalidCommand {
            reason: format!("'{}' is not a positive number of players", rest),
        }),
        Ok(limit) => Ok(Command::Skill { limit: Some(limit) }),
    }
}

fn parse_team_request(rest: &str) -> Result<TeamRequest, StatsError> {
    let mut include: Vec<String> = Vec::new();
    let mut exclude: Vec<String> = Vec::new();
    let mut request = TeamRequest::default();

    for clause in rest.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        let (keyword, args) = match clause.split_once(char::is_whitespace) {
            Some((keyword, args)) => (keyword, args.trim()),
            None => (clause, ""),
        };

        match keyword {
            "exclude" | "excludes" => exclude.extend(parse_names(keyword, args)?),
            "include" | "includes" => include.extend(parse_names(keyword, args)?),
            "guest" | "guests" => request.guests.extend(parse_guests(args)?),
            "by" => {
                request.weighting = match args {
                    "skill" => Weighting::Skill,
                    "score" => Weighting::Score,
                    other => {
                        return Err(StatsError::InvalidCommand {
                            reason: format!("cannot balance by '{}', use score or skill", other),
                        })
                    }
                }
            }
            _ => {
                return Err(StatsError::InvalidCommand {
                    reason: format!("could not make sense of '{}'", clause),
                })
            }
        }
    }

    request.filter = match (include.is_empty(), exclude.is_empty()) {
        (true, true) => RosterFilter::All,
        (false, true) => RosterFilter::Include(include),
        (true, false) => RosterFilter::Exclude(exclude),
        (false, false) => {
            return Err(StatsError::InvalidCommand {
                reason: "include and exclude cannot be combined".to_string(),
            })
        }
    };

    Ok(request)
}

fn split_list(args: &str) -> impl Iterator<Item = &str> {
    args.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_names(keyword: &str, args: &str) -> Result<Vec<String>, StatsError> {
    let names: Vec<String> = split_list(args).map(str::to_string).collect();
    if names.is_empty() {
        return Err(StatsError::InvalidCommand {
            reason: format!("'{}' needs at least one name", keyword),
        });
    }
    Ok(names)
}

/// `name [weight]` items; an unparsable weight falls back to the default
fn parse_guests(args: &str) -> Result<Vec<GuestSpec>, StatsError> {
    let guests: Vec<GuestSpec> = split_list(args)
        .filter_map(|item| {
            let mut parts = item.split_whitespace();
            let name = parts.next()?;
            let weight = parts
                .next()
                .and_then(|w| w.parse::<f64>().ok())
                .filter(|w| w.is_finite() && *w >= 0.0);
            Some(GuestSpec::new(name, weight))
        })
        .collect();

    if guests.is_empty() {
        return Err(StatsError::InvalidCommand {
            reason: "'guests' needs at least one guest".to_string(),
        });
    }
    Ok(guests)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(text: &str) -> TeamRequest {
        match text.parse::<Command>().unwrap() {
            Command::Teams(request) => request,
            other => panic!("expected teams, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!("ranking".parse::<Command>().unwrap(), Command::Ranking);
        assert_eq!("  HELP ".parse::<Command>().unwrap(), Command::Help);
        assert_eq!("Headshots".parse::<Command>().unwrap(), Command::Headshots);
        assert_eq!(Command::Headshots.name(), "headshots");
        assert_eq!("skill".parse::<Command>().unwrap(), Command::Skill { limit: None });
        assert_eq!(
            "skill 5".parse::<Command>().unwrap(),
            Command::Skill { limit: Some(5) }
        );
        assert!(matches!(
            "skill lots".parse::<Command>(),
            Err(StatsError::InvalidCommand { .. })
        ));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            "dance now".parse::<Command>(),
            Err(StatsError::UnknownCommand {
                command: "dance".to_string()
            })
        );
        assert!(matches!(
            "".parse::<Command>(),
            Err(StatsError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_plain_teams() {
        let request = teams("teams");
        assert_eq!(request, TeamRequest::default());
        assert_eq!("teams".parse::<Command>().unwrap().name(), "teams");
    }

    #[test]
    fn test_teams_exclude() {
        let request = teams("teams exclude Alice, bob ,carol");
        assert_eq!(
            request.filter,
            RosterFilter::Exclude(vec!["alice".into(), "bob".into(), "carol".into()])
        );
        assert!(request.guests.is_empty());
    }

    #[test]
    fn test_teams_include_guests_and_weighting() {
        let request = teams("teams includes alice, bob; guests x 1200, y; by skill");
        assert_eq!(
            request.filter,
            RosterFilter::Include(vec!["alice".into(), "bob".into()])
        );
        assert_eq!(
            request.guests,
            vec![GuestSpec::new("x", Some(1200.0)), GuestSpec::new("y", None)]
        );
        assert_eq!(request.weighting, Weighting::Skill);
    }

    #[test]
    fn test_guest_with_unparsable_weight() {
        let request = teams("teams guest zed lots");
        assert_eq!(request.guests, vec![GuestSpec::new("zed", None)]);
    }

    #[test]
    fn test_guest_with_out_of_range_weight() {
        let request = teams("teams guests x inf, y 1e400, z nan, w -3, v 850");
        let weights: Vec<Option<f64>> = request.guests.iter().map(|g| g.weight).collect();
        assert_eq!(weights, vec![None, None, None, None, Some(850.0)]);
    }

    #[test]
    fn test_include_and_exclude_rejected() {
        let result = "teams include a; exclude b".parse::<Command>();
        assert!(matches!(result, Err(StatsError::InvalidCommand { .. })));
    }

    #[test]
    fn test_bad_clauses_rejected() {
        assert!("teams exclude".parse::<Command>().is_err());
        assert!("teams by luck".parse::<Command>().is_err());
        assert!("teams shuffle everyone".parse::<Command>().is_err());
    }

    #[test]
    fn test_extract_directed_command() {
        assert_eq!(
            extract_directed_command("<@U42>: Teams exclude Bob", "<@U42>"),
            Some("teams exclude bob".to_string())
        );
        assert_eq!(
            extract_directed_command("hey @fragstats   skill 3 ", "@fragstats"),
            Some("skill 3".to_string())
        );
        assert_eq!(extract_directed_command("teams please", "@fragstats"), None);
    }
}
