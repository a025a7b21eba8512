use serde::{Deserialize, Serialize};

/// Posture the opposition AI adapts each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OppositionStrategy {
    Balanced,
    Aggressive,
    Defensive,
    Opportunistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OppositionActionKind {
    Criticism,
    PolicyProposal,
    DebateCall,
}

/// A public debate called by an opposition party; a first-class entity
/// resolved by the player's declared response type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debate {
    pub id: u64,
    pub party_id: u32,
    pub topic: String,
    pub arguments: Vec<String>,
    /// 0..=100; scales the approval/support impact of the outcome.
    pub public_interest: f64,
    pub opened_week: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateResponseKind {
    Rebut,
    Counterattack,
    Concede,
    Ignore,
}

impl DebateResponseKind {
    /// Additive modifier on the random base score.
    pub fn score_modifier(&self) -> f64 {
        match self {
            DebateResponseKind::Rebut => 0.15,
            DebateResponseKind::Counterattack => 0.05,
            DebateResponseKind::Concede => -0.10,
            DebateResponseKind::Ignore => -0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateOutcome {
    PlayerVictory,
    Draw,
    OppositionVictory,
}
