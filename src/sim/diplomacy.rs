use rand::Rng;

use super::context::TurnContext;
use super::engine::Engine;
use crate::bus::GameEvent;
use crate::model::{Conflict, LogSeverity, TradeAgreement};

// --- Relation score drivers, per turn ---
const TRADE_BONUS: f64 = 0.2;
const ALIGNMENT_WEIGHT: f64 = 0.1;
const TREATY_BONUS: f64 = 0.1;
const SANCTIONS_DRAG: f64 = 0.3;
const REGRESSION_RATE: f64 = 0.05;
const INCIDENT_HALF_LIFE_WEEKS: f64 = 12.0;
const INCIDENT_RETIRE_WEEKS: u32 = 104;

// --- Agreements and conflicts ---
const AGREEMENT_DISPUTE_CHANCE: f64 = 0.01;
const CONFLICT_OPEN_CHANCE: f64 = 0.02;
const CONFLICT_OPEN_BELOW: f64 = 20.0;
const CONFLICT_CLOSE_ABOVE: f64 = 40.0;
const CONFLICT_GDP_DRAG: f64 = 0.3;
const CONFLICT_APPROVAL_DRAG: f64 = 0.2;

const DEFAULT_AGREEMENT_WEEKS: u32 = 104;

/// Evolves bilateral relations, ticks trade agreements, and opens/closes
/// conflicts with severely hostile countries.
#[derive(Default)]
pub struct DiplomacyEngine;

impl Engine for DiplomacyEngine {
    fn name(&self) -> &str {
        "diplomacy"
    }

    fn on_turn(&mut self, ctx: &mut TurnContext) {
        update_relations(ctx);
        tick_agreements(ctx);
        update_conflicts(ctx);
    }

    fn react(&mut self, ctx: &mut TurnContext) {
        for event in ctx.inbox {
            // An international crisis at home sours every relationship a bit.
            if let GameEvent::CrisisGenerated { kind, severity, .. } = event
                && kind.category() == crate::model::CrisisCategory::International
            {
                let drag = severity / 40.0;
                for rel in ctx.state.diplomacy.relations.values_mut() {
                    rel.set_score(rel.score - drag);
                }
            }
        }
    }

    fn handle_intent(&mut self, ctx: &mut TurnContext, intent: &GameEvent) -> bool {
        let GameEvent::NegotiateAgreement { country } = intent else {
            return false;
        };
        negotiate_agreement(ctx, country);
        true
    }
}

fn update_relations(ctx: &mut TurnContext) {
    let countries: Vec<String> = ctx.state.diplomacy.relations.keys().cloned().collect();
    for country in countries {
        let trading = ctx.state.diplomacy.has_agreement_with(&country);
        let Some(rel) = ctx.state.diplomacy.relations.get_mut(&country) else {
            continue;
        };

        let mut delta = rel.alignment * ALIGNMENT_WEIGHT;
        if trading {
            delta += TRADE_BONUS;
        }
        if rel.has_treaty {
            delta += TREATY_BONUS;
        }
        if rel.under_sanctions {
            delta -= SANCTIONS_DRAG;
        }

        // Incidents drag with a 12-week half-life, then age out entirely.
        for incident in &mut rel.incidents {
            delta -= incident.magnitude
                * 0.5_f64.powf(incident.weeks_ago as f64 / INCIDENT_HALF_LIFE_WEEKS)
                / INCIDENT_HALF_LIFE_WEEKS;
            incident.weeks_ago += 1;
        }
        rel.incidents.retain(|i| i.weeks_ago < INCIDENT_RETIRE_WEEKS);

        // Mean reversion toward neutral.
        delta += REGRESSION_RATE * (50.0 - rel.score) / 50.0;

        let new_score = rel.score + delta;
        rel.set_score(new_score);
        ctx.outbox.push(GameEvent::InternationalUpdate {
            country: country.clone(),
            score: rel.score,
        });
    }
}

fn tick_agreements(ctx: &mut TurnContext) {
    let agreements = std::mem::take(&mut ctx.state.diplomacy.agreements);
    let mut kept = Vec::with_capacity(agreements.len());
    for mut agreement in agreements {
        let gdp = ctx.state.economy.gdp_growth;
        ctx.state.economy.set_gdp_growth(gdp + agreement.gdp_bonus);
        if let Some(rel) = ctx.state.diplomacy.relations.get_mut(&agreement.country) {
            rel.set_score(rel.score + agreement.relation_bonus);
        }

        if ctx.rng.random_range(0.0..1.0) < AGREEMENT_DISPUTE_CHANCE {
            ctx.state.diplomacy.record_incident(
                &agreement.country,
                "trade dispute over agreement terms",
                4.0,
            );
        }

        agreement.weeks_remaining = agreement.weeks_remaining.saturating_sub(1);
        if agreement.weeks_remaining > 0 {
            kept.push(agreement);
        } else {
            let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
            ctx.state.log.record(
                week,
                year,
                LogSeverity::Info,
                format!("Trade agreement with {} has expired", agreement.country),
            );
        }
    }
    ctx.state.diplomacy.agreements = kept;
}

fn update_conflicts(ctx: &mut TurnContext) {
    // Open a conflict with a country we are on terrible terms with.
    let hostile: Vec<String> = ctx
        .state
        .diplomacy
        .relations
        .iter()
        .filter(|(code, rel)| {
            rel.score < CONFLICT_OPEN_BELOW && !ctx.state.diplomacy.in_conflict_with(code)
        })
        .map(|(code, _)| code.clone())
        .collect();
    for country in hostile {
        if ctx.rng.random_range(0.0..1.0) < CONFLICT_OPEN_CHANCE {
            let intensity = ctx.rng.random_range(0.3..0.8);
            ctx.state.diplomacy.conflicts.push(Conflict {
                country: country.clone(),
                weeks_active: 0,
                intensity,
            });
            let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
            ctx.state.log.record(
                week,
                year,
                LogSeverity::Critical,
                format!("Open conflict with {country}"),
            );
        }
    }

    // Active conflicts drag the economy and approval until relations recover.
    let conflicts = std::mem::take(&mut ctx.state.diplomacy.conflicts);
    let mut kept = Vec::with_capacity(conflicts.len());
    for mut conflict in conflicts {
        conflict.weeks_active += 1;
        let gdp = ctx.state.economy.gdp_growth;
        ctx.state
            .economy
            .set_gdp_growth(gdp - CONFLICT_GDP_DRAG * conflict.intensity);
        ctx.state
            .politics
            .adjust_approval(-CONFLICT_APPROVAL_DRAG * conflict.intensity);

        let score = ctx
            .state
            .diplomacy
            .relation_score(&conflict.country)
            .unwrap_or(0.0);
        if score > CONFLICT_CLOSE_ABOVE {
            let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
            ctx.state.log.record(
                week,
                year,
                LogSeverity::Notice,
                format!("Conflict with {} has been settled", conflict.country),
            );
        } else {
            kept.push(conflict);
        }
    }
    ctx.state.diplomacy.conflicts = kept;
}

/// Success odds scale with the current relation score, the mutual benefit of
/// a deal, and how strong the government looks at home.
pub fn negotiation_probability(score: f64, approval: f64, already_trading: bool) -> f64 {
    let mutual_benefit = if already_trading { 0.05 } else { 0.2 };
    (score / 200.0 + mutual_benefit + approval / 400.0).clamp(0.1, 0.9)
}

fn negotiate_agreement(ctx: &mut TurnContext, country: &str) {
    let Some(score) = ctx.state.diplomacy.relation_score(country) else {
        tracing::debug!(country, "negotiation with unknown country ignored");
        return;
    };
    let already_trading = ctx.state.diplomacy.has_agreement_with(country);
    let p = negotiation_probability(score, ctx.state.politics.approval, already_trading);

    if ctx.rng.random_range(0.0..1.0) < p {
        ctx.state.diplomacy.agreements.push(TradeAgreement {
            country: country.to_string(),
            weeks_remaining: DEFAULT_AGREEMENT_WEEKS,
            gdp_bonus: 0.05,
            relation_bonus: 0.1,
        });
        if let Some(rel) = ctx.state.diplomacy.relations.get_mut(country) {
            rel.set_score(rel.score + 3.0);
        }
        ctx.outbox.push(GameEvent::AgreementSigned {
            country: country.to_string(),
            duration_weeks: DEFAULT_AGREEMENT_WEEKS,
        });
    } else {
        ctx.state
            .diplomacy
            .record_incident(country, "failed trade negotiation", 2.0);
        if let Some(new_score) = ctx.state.diplomacy.relation_score(country) {
            ctx.outbox.push(GameEvent::InternationalUpdate {
                country: country.to_string(),
                score: new_score,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GameState, Incident};
    use crate::testutil;

    #[test]
    fn sanctions_pull_the_score_down() {
        let mut state = GameState::default();
        if let Some(rel) = state.diplomacy.relations.get_mut("RUS") {
            rel.under_sanctions = true;
        }
        let before = state.diplomacy.relations["RUS"].score;
        let mut engine = DiplomacyEngine;
        testutil::tick_engine(&mut state, &mut engine, 3);
        assert!(state.diplomacy.relations["RUS"].score < before);
    }

    #[test]
    fn incidents_decay_and_age_out() {
        let mut state = GameState::default();
        if let Some(rel) = state.diplomacy.relations.get_mut("CHN") {
            rel.incidents.push(Incident {
                description: "old grievance".to_string(),
                magnitude: 6.0,
                weeks_ago: INCIDENT_RETIRE_WEEKS - 1,
            });
        }
        let mut engine = DiplomacyEngine;
        testutil::tick_engine(&mut state, &mut engine, 7);
        assert!(state.diplomacy.relations["CHN"].incidents.is_empty());
    }

    #[test]
    fn agreement_expires_and_boosts_growth_while_active() {
        let mut state = GameState::default();
        state.diplomacy.agreements.push(TradeAgreement {
            country: "DEU".to_string(),
            weeks_remaining: 1,
            gdp_bonus: 0.5,
            relation_bonus: 0.0,
        });
        let gdp_before = state.economy.gdp_growth;
        let mut engine = DiplomacyEngine;
        testutil::tick_engine(&mut state, &mut engine, 11);
        assert!(state.economy.gdp_growth > gdp_before - 0.1);
        assert!(state.diplomacy.agreements.is_empty());
    }

    #[test]
    fn conflict_closes_once_relations_recover() {
        let mut state = GameState::default();
        state.diplomacy.conflicts.push(Conflict {
            country: "RUS".to_string(),
            weeks_active: 10,
            intensity: 0.5,
        });
        if let Some(rel) = state.diplomacy.relations.get_mut("RUS") {
            rel.set_score(60.0);
        }
        let mut engine = DiplomacyEngine;
        testutil::tick_engine(&mut state, &mut engine, 13);
        assert!(state.diplomacy.conflicts.is_empty());
    }

    #[test]
    fn negotiation_probability_is_clamped() {
        assert_eq!(negotiation_probability(0.0, 0.0, true), 0.1);
        assert_eq!(negotiation_probability(100.0, 100.0, false), 0.9);
        let mid = negotiation_probability(60.0, 50.0, false);
        assert!(mid > 0.1 && mid < 0.9, "{mid}");
    }

    #[test]
    fn negotiation_with_unknown_country_is_a_noop() {
        let mut state = GameState::default();
        let before = state.clone();
        let mut engine = DiplomacyEngine;
        let intent = GameEvent::NegotiateAgreement {
            country: "ATL".to_string(),
        };
        assert!(testutil::send_intent(&mut state, &mut engine, &intent, 5));
        assert_eq!(state, before);
    }
}
