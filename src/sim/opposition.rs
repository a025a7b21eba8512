use rand::Rng;

use super::context::TurnContext;
use super::engine::Engine;
use crate::bus::GameEvent;
use crate::model::{
    Debate, DebateOutcome, DebateResponseKind, DecisionKind, GameState, LogSeverity,
    OppositionActionKind, OppositionStrategy, PendingDecision, PolicyArea,
};

// --- Action trial rates, each gated by aggressiveness x constant ---
const CRITICISM_RATE: f64 = 0.5;
const PROPOSAL_RATE: f64 = 0.3;
const DEBATE_RATE: f64 = 0.15;
const MAX_OPEN_DEBATES: usize = 2;

// --- Aggressiveness composition weights ---
const APPROVAL_WEIGHT: f64 = 0.5;
const ECONOMY_WEIGHT: f64 = 0.3;
const ELECTION_WEIGHT: f64 = 0.2;
const FULL_TERM_WEEKS: f64 = 208.0;

/// Adapts a strategy/aggressiveness posture from political and economic
/// signals and emits criticism, counter-proposals, and debate calls.
pub struct OppositionEngine {
    pub strategy: OppositionStrategy,
    pub aggressiveness: f64,
    debates: Vec<Debate>,
    next_debate_id: u64,
}

impl Default for OppositionEngine {
    fn default() -> Self {
        Self {
            strategy: OppositionStrategy::Balanced,
            aggressiveness: 0.4,
            debates: Vec::new(),
            next_debate_id: 0,
        }
    }
}

impl Engine for OppositionEngine {
    fn name(&self) -> &str {
        "opposition"
    }

    fn on_turn(&mut self, ctx: &mut TurnContext) {
        self.update_posture(ctx.state);
        update_party_standings(ctx);
        self.run_action_trials(ctx);
    }

    fn react(&mut self, ctx: &mut TurnContext) {
        for event in ctx.inbox {
            // Fresh crises embolden the opposition immediately.
            if matches!(event, GameEvent::CrisisGenerated { .. }) {
                self.aggressiveness = (self.aggressiveness + 0.05).min(1.0);
            }
        }
    }

    fn handle_intent(&mut self, ctx: &mut TurnContext, intent: &GameEvent) -> bool {
        let GameEvent::DebateResponse {
            debate_id,
            response,
        } = intent
        else {
            return false;
        };
        self.conclude_debate(ctx, *debate_id, *response);
        true
    }
}

/// Average of normalized unemployment/inflation/growth sub-scores, 0..=1
/// (1 = healthy).
pub fn economic_health(state: &GameState) -> f64 {
    let eco = &state.economy;
    let unemployment_score = (1.0 - (eco.unemployment - 3.0) / 9.0).clamp(0.0, 1.0);
    let inflation_score = (1.0 - (eco.inflation - 2.0).abs() / 6.0).clamp(0.0, 1.0);
    let growth_score = ((eco.gdp_growth + 2.0) / 7.0).clamp(0.0, 1.0);
    (unemployment_score + inflation_score + growth_score) / 3.0
}

impl OppositionEngine {
    fn update_posture(&mut self, state: &GameState) {
        let approval = state.politics.approval;
        let weeks_to_election = state
            .politics
            .next_election
            .absolute_week()
            .saturating_sub(state.clock.absolute_week());
        let election_proximity =
            (1.0 - weeks_to_election as f64 / FULL_TERM_WEEKS).clamp(0.0, 1.0);
        let health = economic_health(state);

        self.aggressiveness = ((1.0 - approval / 100.0) * APPROVAL_WEIGHT
            + (1.0 - health) * ECONOMY_WEIGHT
            + election_proximity * ELECTION_WEIGHT)
            .clamp(0.1, 1.0);

        self.strategy = if approval < 35.0 {
            OppositionStrategy::Aggressive
        } else if weeks_to_election < 26 && health < 0.5 {
            OppositionStrategy::Opportunistic
        } else if approval > 60.0 {
            OppositionStrategy::Defensive
        } else {
            OppositionStrategy::Balanced
        };
    }

    fn run_action_trials(&mut self, ctx: &mut TurnContext) {
        // Independent Bernoulli trials; several actions may land in one turn.
        if ctx.rng.random_range(0.0..1.0) < self.aggressiveness * CRITICISM_RATE {
            self.emit_criticism(ctx);
        }
        if ctx.rng.random_range(0.0..1.0) < self.aggressiveness * PROPOSAL_RATE {
            self.emit_proposal(ctx);
        }
        if self.debates.len() < MAX_OPEN_DEBATES
            && ctx.rng.random_range(0.0..1.0) < self.aggressiveness * DEBATE_RATE
        {
            self.open_debate(ctx);
        }
    }

    fn emit_criticism(&mut self, ctx: &mut TurnContext) {
        let pool = criticism_pool(ctx.state);
        let (area, message) = pool[ctx.rng.random_range(0..pool.len())].clone();
        let party = pick_speaker(ctx, area);
        ctx.state.politics.adjust_approval(-0.3 * self.aggressiveness);
        if let Some(p) = ctx
            .state
            .politics
            .opposition_parties
            .iter_mut()
            .find(|p| p.name == party)
        {
            p.adjust_support(0.2);
        }
        ctx.outbox.push(GameEvent::OppositionAction {
            party,
            action: OppositionActionKind::Criticism,
            message,
        });
    }

    fn emit_proposal(&mut self, ctx: &mut TurnContext) {
        let pool = proposal_pool(ctx.state);
        let (area, message) = pool[ctx.rng.random_range(0..pool.len())].clone();
        let party = pick_speaker(ctx, area);
        if let Some(p) = ctx
            .state
            .politics
            .opposition_parties
            .iter_mut()
            .find(|p| p.name == party)
        {
            p.adjust_approval(0.3);
        }
        ctx.outbox.push(GameEvent::OppositionAction {
            party,
            action: OppositionActionKind::PolicyProposal,
            message,
        });
    }

    fn open_debate(&mut self, ctx: &mut TurnContext) {
        let pool = criticism_pool(ctx.state);
        let (area, topic) = pool[ctx.rng.random_range(0..pool.len())].clone();
        let party = pick_speaker(ctx, area);
        let party_id = ctx
            .state
            .politics
            .opposition_parties
            .iter()
            .find(|p| p.name == party)
            .map(|p| p.id)
            .unwrap_or(0);

        self.next_debate_id += 1;
        let id = self.next_debate_id;
        let public_interest = (40.0
            + self.aggressiveness * 30.0
            + ctx.rng.random_range(0.0..20.0))
        .clamp(0.0, 100.0);
        let debate = Debate {
            id,
            party_id,
            topic: topic.clone(),
            arguments: debate_arguments(ctx.state),
            public_interest,
            opened_week: ctx.state.clock.absolute_week(),
        };
        ctx.state.log.push_decision(PendingDecision {
            id,
            kind: DecisionKind::Debate,
            summary: format!("{party} calls a debate: {topic}"),
        });
        ctx.outbox.push(GameEvent::DebateInitiated {
            id,
            topic,
            public_interest,
        });
        self.debates.push(debate);
    }

    fn conclude_debate(&mut self, ctx: &mut TurnContext, debate_id: u64, response: DebateResponseKind) {
        let Some(idx) = self.debates.iter().position(|d| d.id == debate_id) else {
            tracing::debug!(debate_id, "response to unknown debate ignored");
            return;
        };
        let debate = self.debates.remove(idx);
        let base: f64 = ctx.rng.random_range(0.0..1.0);
        let approval_edge = (ctx.state.politics.approval - 50.0) / 200.0;
        let score = base + response.score_modifier() + approval_edge;
        let outcome = if score > 0.6 {
            DebateOutcome::PlayerVictory
        } else if score >= 0.4 {
            DebateOutcome::Draw
        } else {
            DebateOutcome::OppositionVictory
        };

        let stake = debate.public_interest / 100.0;
        let approval_impact = match outcome {
            DebateOutcome::PlayerVictory => ctx.rng.random_range(1.0..3.0) * stake,
            DebateOutcome::Draw => 0.0,
            DebateOutcome::OppositionVictory => -ctx.rng.random_range(1.0..3.0) * stake,
        };
        ctx.state.politics.adjust_approval(approval_impact);
        if let Some(party) = ctx
            .state
            .politics
            .opposition_parties
            .iter_mut()
            .find(|p| p.id == debate.party_id)
        {
            match outcome {
                DebateOutcome::PlayerVictory => party.adjust_support(-0.5),
                DebateOutcome::Draw => {}
                DebateOutcome::OppositionVictory => party.adjust_support(1.0),
            }
        }
        ctx.state.log.take_decision(debate_id, DecisionKind::Debate);
        let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
        ctx.state.log.record(
            week,
            year,
            LogSeverity::Notice,
            format!("Debate on {} concluded: {outcome:?}", debate.topic),
        );
        ctx.outbox.push(GameEvent::DebateConcluded {
            id: debate_id,
            outcome,
            approval_impact,
        });
    }

    #[cfg(test)]
    fn open_debate_count(&self) -> usize {
        self.debates.len()
    }
}

// ---------------------------------------------------------------------------
// Content pools
// ---------------------------------------------------------------------------

/// Candidate criticisms filtered by which economic thresholds are breached;
/// falls back to a generic line when nothing is.
fn criticism_pool(state: &GameState) -> Vec<(PolicyArea, String)> {
    let eco = &state.economy;
    let mut pool = Vec::new();
    if eco.unemployment > 7.0 {
        pool.push((
            PolicyArea::Labour,
            format!(
                "Unemployment at {:.1}% shows this government has abandoned working people",
                eco.unemployment
            ),
        ));
    }
    if eco.inflation > 4.0 {
        pool.push((
            PolicyArea::Economy,
            format!(
                "Families cannot keep up with {:.1}% inflation",
                eco.inflation
            ),
        ));
    }
    if eco.gdp_growth < 1.0 {
        pool.push((
            PolicyArea::Economy,
            "The economy is stagnating under this government's watch".to_string(),
        ));
    }
    if state.politics.approval < 40.0 {
        pool.push((
            PolicyArea::Welfare,
            "The country has lost confidence in this government".to_string(),
        ));
    }
    if pool.is_empty() {
        pool.push((
            PolicyArea::Economy,
            "This government is out of ideas".to_string(),
        ));
    }
    pool
}

fn proposal_pool(state: &GameState) -> Vec<(PolicyArea, String)> {
    let eco = &state.economy;
    let mut pool = Vec::new();
    if eco.unemployment > 7.0 {
        pool.push((
            PolicyArea::Labour,
            "An emergency jobs programme for the regions".to_string(),
        ));
    }
    if eco.inflation > 4.0 {
        pool.push((
            PolicyArea::Economy,
            "Temporary caps on energy and staple prices".to_string(),
        ));
    }
    if eco.gdp_growth < 1.0 {
        pool.push((
            PolicyArea::Economy,
            "A front-loaded public investment package".to_string(),
        ));
    }
    if pool.is_empty() {
        pool.push((
            PolicyArea::Economy,
            "A comprehensive tax simplification plan".to_string(),
        ));
    }
    pool
}

fn debate_arguments(state: &GameState) -> Vec<String> {
    let eco = &state.economy;
    vec![
        format!("Growth is running at {:.1}%", eco.gdp_growth),
        format!("Unemployment stands at {:.1}%", eco.unemployment),
        format!(
            "Government approval has fallen to {:.0}",
            state.politics.approval
        ),
    ]
}

/// Prefer a party with matching expertise; fall back to a support-weighted
/// random draw across all opposition parties.
fn pick_speaker(ctx: &mut TurnContext, area: PolicyArea) -> String {
    let experts: Vec<&crate::model::OppositionParty> = ctx
        .state
        .politics
        .opposition_parties
        .iter()
        .filter(|p| p.expertise.contains(&area))
        .collect();
    if !experts.is_empty() {
        let idx = ctx.rng.random_range(0..experts.len());
        return experts[idx].name.clone();
    }

    let parties = &ctx.state.politics.opposition_parties;
    let total: f64 = parties.iter().map(|p| p.support).sum();
    if parties.is_empty() || total <= 0.0 {
        return "The opposition".to_string();
    }
    let mut roll = ctx.rng.random_range(0.0..total);
    for party in parties {
        if roll < party.support {
            return party.name.clone();
        }
        roll -= party.support;
    }
    parties[parties.len() - 1].name.clone()
}

fn update_party_standings(ctx: &mut TurnContext) {
    let approval = ctx.state.politics.approval;
    for i in 0..ctx.state.politics.opposition_parties.len() {
        let support_drift = (50.0 - approval) * 0.005 + ctx.rng.random_range(-0.2..0.2);
        let approval_drift = (50.0 - approval) * 0.01 + ctx.rng.random_range(-0.5..0.5);
        let party = &mut ctx.state.politics.opposition_parties[i];
        party.adjust_support(support_drift);
        party.adjust_approval(approval_drift);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameState;
    use crate::testutil;

    #[test]
    fn posture_turns_aggressive_when_government_is_weak() {
        let mut state = GameState::default();
        state.politics.approval = 25.0;
        let mut engine = OppositionEngine::default();
        engine.update_posture(&state);
        assert_eq!(engine.strategy, OppositionStrategy::Aggressive);
        assert!(engine.aggressiveness > 0.4, "{}", engine.aggressiveness);
    }

    #[test]
    fn posture_turns_defensive_when_government_is_popular() {
        let mut state = GameState::default();
        state.politics.approval = 70.0;
        let mut engine = OppositionEngine::default();
        engine.update_posture(&state);
        assert_eq!(engine.strategy, OppositionStrategy::Defensive);
    }

    #[test]
    fn opportunism_needs_a_close_election_and_a_weak_economy() {
        let mut state = GameState::default();
        state.politics.approval = 50.0;
        state.economy.unemployment = 11.0;
        state.economy.gdp_growth = -1.5;
        state.economy.inflation = 8.0;
        state.clock.year = 4;
        state.clock.week = 30;
        let mut engine = OppositionEngine::default();
        engine.update_posture(&state);
        assert_eq!(engine.strategy, OppositionStrategy::Opportunistic);
    }

    #[test]
    fn economic_health_is_normalized() {
        let mut state = GameState::default();
        assert!((0.0..=1.0).contains(&economic_health(&state)));
        state.economy.unemployment = 12.0;
        state.economy.inflation = 14.0;
        state.economy.gdp_growth = -8.0;
        assert!(economic_health(&state) < 0.2);
    }

    #[test]
    fn criticism_pool_tracks_breached_thresholds() {
        let mut state = GameState::default();
        state.economy.unemployment = 6.0;
        state.economy.inflation = 2.0;
        state.economy.gdp_growth = 2.5;
        state.politics.approval = 55.0;
        assert_eq!(criticism_pool(&state).len(), 1, "generic fallback only");

        state.economy.unemployment = 8.5;
        state.economy.inflation = 5.0;
        assert_eq!(criticism_pool(&state).len(), 2);
    }

    #[test]
    fn debate_response_to_unknown_debate_is_a_noop() {
        let mut state = GameState::default();
        let mut engine = OppositionEngine::default();
        let before = state.clone();
        let intent = GameEvent::DebateResponse {
            debate_id: 17,
            response: DebateResponseKind::Rebut,
        };
        assert!(testutil::send_intent(&mut state, &mut engine, &intent, 1));
        assert_eq!(state, before);
    }

    #[test]
    fn concluded_debate_is_removed_and_announced() {
        let mut state = GameState::default();
        let mut engine = OppositionEngine::default();
        engine.aggressiveness = 1.0;

        // Force a debate open by running trials until one appears.
        let mut seed = 0;
        while engine.open_debate_count() == 0 {
            testutil::tick_engine(&mut state, &mut engine, seed);
            seed += 1;
            assert!(seed < 500, "debate should open eventually");
        }
        let debate_id = engine.debates[0].id;
        let intent = GameEvent::DebateResponse {
            debate_id,
            response: DebateResponseKind::Rebut,
        };
        let events = testutil::send_intent_events(&mut state, &mut engine, &intent, 9);
        assert!(engine.debates.is_empty());
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::DebateConcluded { id, .. } if *id == debate_id))
        );
    }
}
