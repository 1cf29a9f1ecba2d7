//! Test fixtures and mock data sources for integration testing

use fragstats::config::AppConfig;
use fragstats::error::Result;
use fragstats::metrics::MetricsCollector;
use fragstats::rating::history::{InMemoryMatchHistory, MatchHistoryProvider};
use fragstats::service::CommandDispatcher;
use fragstats::teams::roster::{InMemoryRosterProvider, RosterEntry, RosterProvider};
use fragstats::types::Round;
use mockall::mock;
use std::path::PathBuf;
use std::sync::Arc;

mock! {
    pub Roster {}

    impl RosterProvider for Roster {
        fn roster(&self) -> Result<Vec<RosterEntry>>;
    }
}

mock! {
    pub History {}

    impl MatchHistoryProvider for History {
        fn rounds(&self) -> Result<Vec<Round>>;
    }
}

/// Six regulars with distinct scores
pub fn sample_roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::new("76561198000000001", "Alice", 1450.0),
        RosterEntry::new("76561198000000002", "Bob", 1320.0),
        RosterEntry::new("76561198000000003", "Carol", 1210.0),
        RosterEntry::new("76561198000000004", "Dave", 1100.0),
        RosterEntry::new("76561198000000005", "Erin", 980.0),
        RosterEntry::new("76561198000000006", "Frank", 870.0),
    ]
}

/// History in which Alice always wins and Frank always loses
pub fn sample_rounds() -> Vec<Round> {
    let id = |n: u8| format!("7656119800000000{}", n);

    vec![
        Round::new(0, [id(1), id(2), id(3)], [id(4), id(5), id(6)]),
        Round::new(1, [id(1), id(4), id(5)], [id(2), id(3), id(6)]),
        Round::new(2, [id(1), id(2), id(6)], [id(3), id(4), id(5)]),
        Round::new(3, [id(1), id(3), id(5)], [id(2), id(4), id(6)]),
    ]
}

pub fn in_memory_sources() -> (Arc<InMemoryRosterProvider>, Arc<InMemoryMatchHistory>) {
    (
        Arc::new(InMemoryRosterProvider::new(sample_roster())),
        Arc::new(InMemoryMatchHistory::new(sample_rounds())),
    )
}

/// Dispatcher with default configuration over the given sources
pub fn create_dispatcher(
    roster: Arc<dyn RosterProvider>,
    history: Arc<dyn MatchHistoryProvider>,
) -> (Arc<CommandDispatcher>, Arc<MetricsCollector>) {
    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let dispatcher =
        CommandDispatcher::new(&AppConfig::default(), roster, history, metrics.clone()).unwrap();
    (Arc::new(dispatcher), metrics)
}

/// Temporary JSON file removed on drop
pub struct TempJson {
    pub path: PathBuf,
}

impl TempJson {
    pub fn new(contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("fragstats-it-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        Self { path }
    }
}

impl Drop for TempJson {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
