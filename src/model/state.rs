use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::crisis::CrisisBook;
use super::diplomacy::{Diplomacy, default_relations};
use super::economy::Economy;
use super::log::EventLog;
use super::outcome::{Achievement, EndCondition, initial_achievements};
use super::politics::Politics;

/// The single source of truth. Owned by the turn scheduler and visited
/// sequentially by each engine's turn handler; there is no locking because
/// there is no parallelism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub country: String,
    pub clock: Clock,
    pub economy: Economy,
    pub politics: Politics,
    pub crises: CrisisBook,
    pub diplomacy: Diplomacy,
    pub log: EventLog,
    pub achievements: Vec<Achievement>,
    /// Set once by the outcome evaluator; never cleared.
    pub ended: Option<EndCondition>,
}

impl GameState {
    pub fn new(country: impl Into<String>, start_year: i32) -> Self {
        Self {
            country: country.into(),
            clock: Clock::new(start_year),
            economy: Economy::default(),
            politics: Politics::default(),
            crises: CrisisBook::default(),
            diplomacy: Diplomacy {
                relations: default_relations(),
                ..Default::default()
            },
            log: EventLog::default(),
            achievements: initial_achievements(),
            ended: None,
        }
    }

    pub fn game_over(&self) -> bool {
        self.ended.is_some()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new("Arcadia", 2026)
    }
}
