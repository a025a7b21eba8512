use serde::{Deserialize, Serialize};

use super::clock::CalendarPoint;

/// One of the two party blocs partitioning the landscape; whatever support
/// neither bloc holds belongs to independents, computed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyBloc {
    pub name: String,
    /// Support, 0..=100.
    pub support: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ideology {
    Progressive,
    Conservative,
    Liberal,
    Nationalist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyArea {
    Economy,
    Labour,
    Welfare,
    Security,
    Environment,
    ForeignAffairs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OppositionParty {
    pub id: u32,
    pub name: String,
    /// Support, clamped to [5, 45].
    pub support: f64,
    /// Party leader approval, clamped to [15, 70].
    pub approval: f64,
    /// Baseline combativeness, 0..=1.
    pub aggressiveness: f64,
    pub ideology: Ideology,
    pub expertise: Vec<PolicyArea>,
}

impl OppositionParty {
    pub fn adjust_support(&mut self, delta: f64) {
        self.support = (self.support + delta).clamp(5.0, 45.0);
    }

    pub fn adjust_approval(&mut self, delta: f64) {
        self.approval = (self.approval + delta).clamp(15.0, 70.0);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledVote {
    pub topic: String,
    pub at: CalendarPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionOutcome {
    Victory,
    NarrowVictory,
    CoalitionRequired,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoliticalEventCategory {
    PolicyVote,
    CoalitionCrisis,
    OppositionMove,
    EconomicPolicy,
}

/// Declared impact of picking a political-event option. Applied with a
/// ±20% multiplicative variance at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectVector {
    pub approval: f64,
    pub gdp_growth: f64,
    pub debt: f64,
    pub coalition_support: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOption {
    pub id: u8,
    pub label: String,
    pub effects: EffectVector,
}

/// A generated political situation awaiting a player choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticalEvent {
    pub id: u64,
    pub category: PoliticalEventCategory,
    pub title: String,
    pub description: String,
    pub options: Vec<EventOption>,
    pub created_week: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Politics {
    /// Public approval of the government, 0..=100.
    pub approval: f64,
    /// Spendable goodwill; earned by resolving crises, spent on responses.
    pub political_capital: f64,
    pub coalition: PartyBloc,
    pub opposition: PartyBloc,
    pub opposition_parties: Vec<OppositionParty>,
    pub next_election: CalendarPoint,
    pub next_vote: Option<ScheduledVote>,
    pub active_events: Vec<PoliticalEvent>,
    pub last_election: Option<ElectionOutcome>,
    next_event_id: u64,
}

impl Politics {
    /// Residual support held by neither bloc. Computed on read, never stored.
    pub fn independents(&self) -> f64 {
        (100.0 - self.coalition.support - self.opposition.support).max(0.0)
    }

    /// Apply an approval change, clamped to [0, 100]. Returns the change
    /// actually applied after clamping.
    pub fn adjust_approval(&mut self, delta: f64) -> f64 {
        let before = self.approval;
        self.approval = (self.approval + delta).clamp(0.0, 100.0);
        self.approval - before
    }

    pub fn adjust_coalition_support(&mut self, delta: f64) {
        self.coalition.support = (self.coalition.support + delta).clamp(0.0, 100.0);
    }

    pub fn adjust_opposition_support(&mut self, delta: f64) {
        self.opposition.support = (self.opposition.support + delta).clamp(0.0, 100.0);
    }

    pub fn adjust_capital(&mut self, delta: f64) {
        self.political_capital = (self.political_capital + delta).clamp(0.0, 100.0);
    }

    pub fn next_event_id(&mut self) -> u64 {
        self.next_event_id += 1;
        self.next_event_id
    }

    pub fn take_event(&mut self, id: u64) -> Option<PoliticalEvent> {
        let idx = self.active_events.iter().position(|e| e.id == id)?;
        Some(self.active_events.remove(idx))
    }
}

impl Default for Politics {
    fn default() -> Self {
        Self {
            approval: 50.0,
            political_capital: 50.0,
            coalition: PartyBloc {
                name: "Governing Coalition".to_string(),
                support: 42.0,
            },
            opposition: PartyBloc {
                name: "Opposition Bloc".to_string(),
                support: 38.0,
            },
            opposition_parties: default_opposition(),
            next_election: CalendarPoint { week: 44, year: 4 },
            next_vote: None,
            active_events: Vec::new(),
            last_election: None,
            next_event_id: 0,
        }
    }
}

fn default_opposition() -> Vec<OppositionParty> {
    vec![
        OppositionParty {
            id: 1,
            name: "Social Renewal".to_string(),
            support: 22.0,
            approval: 45.0,
            aggressiveness: 0.5,
            ideology: Ideology::Progressive,
            expertise: vec![PolicyArea::Welfare, PolicyArea::Labour],
        },
        OppositionParty {
            id: 2,
            name: "National Front".to_string(),
            support: 10.0,
            approval: 35.0,
            aggressiveness: 0.7,
            ideology: Ideology::Nationalist,
            expertise: vec![PolicyArea::Security, PolicyArea::ForeignAffairs],
        },
        OppositionParty {
            id: 3,
            name: "Free Market Alliance".to_string(),
            support: 6.0,
            approval: 40.0,
            aggressiveness: 0.4,
            ideology: Ideology::Liberal,
            expertise: vec![PolicyArea::Economy],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independents_absorb_remainder() {
        let politics = Politics::default();
        let total =
            politics.coalition.support + politics.opposition.support + politics.independents();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn independents_never_negative() {
        let mut politics = Politics::default();
        politics.coalition.support = 70.0;
        politics.opposition.support = 50.0;
        assert_eq!(politics.independents(), 0.0);
    }

    #[test]
    fn approval_clamps_and_reports_applied_change() {
        let mut politics = Politics::default();
        politics.approval = 98.0;
        let applied = politics.adjust_approval(10.0);
        assert_eq!(politics.approval, 100.0);
        assert!((applied - 2.0).abs() < 1e-9);
    }

    #[test]
    fn party_support_clamps_to_declared_band() {
        let mut party = default_opposition().remove(0);
        party.adjust_support(100.0);
        assert_eq!(party.support, 45.0);
        party.adjust_support(-100.0);
        assert_eq!(party.support, 5.0);
        party.adjust_approval(100.0);
        assert_eq!(party.approval, 70.0);
    }
}
