use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// How many crisis history records are retained for analytics (two
/// simulated years).
pub const CRISIS_HISTORY_CAP: usize = 104;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisCategory {
    Economic,
    Political,
    Scandal,
    International,
    Security,
    Natural,
}

impl CrisisCategory {
    pub const ALL: [CrisisCategory; 6] = [
        CrisisCategory::Economic,
        CrisisCategory::Political,
        CrisisCategory::Scandal,
        CrisisCategory::International,
        CrisisCategory::Security,
        CrisisCategory::Natural,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisKind {
    MarketCrash,
    BankingRun,
    CoalitionRevolt,
    MinisterResignation,
    CorruptionScandal,
    MediaLeak,
    BorderDispute,
    TradeWar,
    TerrorThreat,
    CyberAttack,
    RiverFlood,
    Epidemic,
}

impl CrisisKind {
    pub fn category(&self) -> CrisisCategory {
        match self {
            CrisisKind::MarketCrash | CrisisKind::BankingRun => CrisisCategory::Economic,
            CrisisKind::CoalitionRevolt | CrisisKind::MinisterResignation => {
                CrisisCategory::Political
            }
            CrisisKind::CorruptionScandal | CrisisKind::MediaLeak => CrisisCategory::Scandal,
            CrisisKind::BorderDispute | CrisisKind::TradeWar => CrisisCategory::International,
            CrisisKind::TerrorThreat | CrisisKind::CyberAttack => CrisisCategory::Security,
            CrisisKind::RiverFlood | CrisisKind::Epidemic => CrisisCategory::Natural,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CrisisKind::MarketCrash => "market crash",
            CrisisKind::BankingRun => "banking run",
            CrisisKind::CoalitionRevolt => "coalition revolt",
            CrisisKind::MinisterResignation => "minister resignation",
            CrisisKind::CorruptionScandal => "corruption scandal",
            CrisisKind::MediaLeak => "media leak",
            CrisisKind::BorderDispute => "border dispute",
            CrisisKind::TradeWar => "trade war",
            CrisisKind::TerrorThreat => "terror threat",
            CrisisKind::CyberAttack => "cyber attack",
            CrisisKind::RiverFlood => "river flood",
            CrisisKind::Epidemic => "epidemic",
        }
    }
}

/// A named player action against an active crisis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisResponseKind {
    PressConference,
    EmergencyFunding,
    TaskForce,
    IndependentInquiry,
    LegislativePackage,
    InternationalMediation,
}

impl CrisisResponseKind {
    /// Political capital spent when the response is implemented.
    pub fn cost(&self) -> f64 {
        match self {
            CrisisResponseKind::PressConference => 5.0,
            CrisisResponseKind::EmergencyFunding => 15.0,
            CrisisResponseKind::TaskForce => 10.0,
            CrisisResponseKind::IndependentInquiry => 8.0,
            CrisisResponseKind::LegislativePackage => 20.0,
            CrisisResponseKind::InternationalMediation => 12.0,
        }
    }

    pub fn base_effectiveness(&self) -> f64 {
        match self {
            CrisisResponseKind::PressConference => 0.35,
            CrisisResponseKind::EmergencyFunding => 0.70,
            CrisisResponseKind::TaskForce => 0.55,
            CrisisResponseKind::IndependentInquiry => 0.45,
            CrisisResponseKind::LegislativePackage => 0.80,
            CrisisResponseKind::InternationalMediation => 0.60,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CrisisResponseKind::PressConference => "press conference",
            CrisisResponseKind::EmergencyFunding => "emergency funding",
            CrisisResponseKind::TaskForce => "task force",
            CrisisResponseKind::IndependentInquiry => "independent inquiry",
            CrisisResponseKind::LegislativePackage => "legislative package",
            CrisisResponseKind::InternationalMediation => "international mediation",
        }
    }
}

/// Discrete outcome tier of an implemented response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTier {
    HighlyEffective,
    Effective,
    PartiallyEffective,
    Ineffective,
}

impl ResponseTier {
    pub fn from_effectiveness(effectiveness: f64) -> Self {
        if effectiveness > 0.8 {
            ResponseTier::HighlyEffective
        } else if effectiveness >= 0.5 {
            ResponseTier::Effective
        } else if effectiveness >= 0.3 {
            ResponseTier::PartiallyEffective
        } else {
            ResponseTier::Ineffective
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub kind: CrisisResponseKind,
    pub effectiveness: f64,
    pub tier: ResponseTier,
    pub week: u32,
}

/// A first-class escalating/resolvable incident entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crisis {
    pub id: u64,
    pub kind: CrisisKind,
    pub title: String,
    /// 0..=100; >=90 triggers escalation.
    pub severity: f64,
    /// 0..=100.
    pub media_attention: f64,
    /// 0..=100.
    pub public_concern: f64,
    /// 0..=100; >=100 resolves the crisis.
    pub management_score: f64,
    /// Absolute week the crisis started.
    pub started_week: u32,
    pub weeks_active: u32,
    pub has_escalated: bool,
    pub responses: Vec<ResponseRecord>,
}

impl Crisis {
    pub fn set_severity(&mut self, value: f64) {
        self.severity = value.clamp(0.0, 100.0);
    }

    pub fn set_media_attention(&mut self, value: f64) {
        self.media_attention = value.clamp(0.0, 100.0);
    }

    pub fn set_public_concern(&mut self, value: f64) {
        self.public_concern = value.clamp(0.0, 100.0);
    }

    pub fn add_management(&mut self, delta: f64) {
        self.management_score = (self.management_score + delta).clamp(0.0, 100.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisDisposition {
    Opened,
    Resolved,
    Escalated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisRecord {
    pub crisis_id: u64,
    pub kind: CrisisKind,
    pub week: u32,
    pub year: u32,
    pub disposition: CrisisDisposition,
}

/// Active and resolved crises plus a bounded rolling history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrisisBook {
    pub active: Vec<Crisis>,
    pub resolved: Vec<Crisis>,
    pub history: VecDeque<CrisisRecord>,
    next_id: u64,
}

impl CrisisBook {
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn record(&mut self, record: CrisisRecord) {
        self.history.push_back(record);
        while self.history.len() > CRISIS_HISTORY_CAP {
            self.history.pop_front();
        }
    }

    pub fn active_mut(&mut self, id: u64) -> Option<&mut Crisis> {
        self.active.iter_mut().find(|c| c.id == id)
    }

    /// Active crises in the given category at or above the given severity.
    pub fn major_in_category(&self, category: CrisisCategory, min_severity: f64) -> usize {
        self.active
            .iter()
            .filter(|c| c.kind.category() == category && c.severity > min_severity)
            .count()
    }
}
