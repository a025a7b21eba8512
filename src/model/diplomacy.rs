use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A past diplomatic incident; its drag on the relationship decays with a
/// 12-week half-life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub description: String,
    /// Drag on the relation score while fresh, in score points.
    pub magnitude: f64,
    pub weeks_ago: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Relationship score, 0..=100 (50 = neutral).
    pub score: f64,
    /// Ideological alignment, -1..=1.
    pub alignment: f64,
    pub has_treaty: bool,
    pub under_sanctions: bool,
    pub incidents: Vec<Incident>,
}

impl Relation {
    pub fn set_score(&mut self, value: f64) {
        self.score = value.clamp(0.0, 100.0);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAgreement {
    pub country: String,
    pub weeks_remaining: u32,
    /// Per-turn nudge to GDP growth while active.
    pub gdp_bonus: f64,
    /// Per-turn nudge to the relation score while active.
    pub relation_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub country: String,
    pub weeks_active: u32,
    /// 0..=1; scales the per-turn growth/approval drag.
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diplomacy {
    /// Keyed by ISO-style country code.
    pub relations: BTreeMap<String, Relation>,
    pub agreements: Vec<TradeAgreement>,
    pub conflicts: Vec<Conflict>,
}

impl Diplomacy {
    pub fn relation_score(&self, country: &str) -> Option<f64> {
        self.relations.get(country).map(|r| r.score)
    }

    pub fn has_agreement_with(&self, country: &str) -> bool {
        self.agreements.iter().any(|a| a.country == country)
    }

    pub fn in_conflict_with(&self, country: &str) -> bool {
        self.conflicts.iter().any(|c| c.country == country)
    }

    pub fn record_incident(&mut self, country: &str, description: &str, magnitude: f64) {
        if let Some(rel) = self.relations.get_mut(country) {
            rel.incidents.push(Incident {
                description: description.to_string(),
                magnitude,
                weeks_ago: 0,
            });
        }
    }
}

/// Starting relations for a default session.
pub fn default_relations() -> BTreeMap<String, Relation> {
    let seed: [(&str, f64, f64); 6] = [
        ("USA", 62.0, 0.4),
        ("DEU", 70.0, 0.6),
        ("FRA", 66.0, 0.5),
        ("CHN", 48.0, -0.3),
        ("RUS", 35.0, -0.6),
        ("BRA", 55.0, 0.1),
    ];
    seed.iter()
        .map(|&(code, score, alignment)| {
            (
                code.to_string(),
                Relation {
                    score,
                    alignment,
                    has_treaty: score >= 60.0,
                    under_sanctions: false,
                    incidents: Vec::new(),
                },
            )
        })
        .collect()
}
