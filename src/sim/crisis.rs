use rand::Rng;

use super::context::TurnContext;
use super::engine::Engine;
use crate::bus::GameEvent;
use crate::model::{
    Crisis, CrisisCategory, CrisisDisposition, CrisisKind, CrisisRecord, CrisisResponseKind,
    GameState, LogSeverity, ResponseRecord, ResponseTier,
};

// --- Generation (tunables carried from the source model) ---
const GENERATION_BASE_CHANCE: f64 = 0.04;
const CROWDING_DAMPER: f64 = 0.4;
const CROWDING_THRESHOLD: usize = 2;

// --- Feedback update rates ---
const MEDIA_PULL: f64 = 0.3;
const MEDIA_TARGET_OF_SEVERITY: f64 = 0.9;
const CONCERN_PULL: f64 = 0.25;
const CONCERN_TARGET_OF_MEDIA: f64 = 0.8;

// --- Responses ---
const MANAGEMENT_PER_EFFECTIVENESS: f64 = 30.0;
const UNDERFUNDED_RESOURCE_FACTOR: f64 = 0.7;

// --- Terminal thresholds ---
const RESOLUTION_MANAGEMENT: f64 = 100.0;
const ESCALATION_SEVERITY: f64 = 90.0;
const RESOLUTION_APPROVAL_REWARD: f64 = 3.0;
const RESOLUTION_CAPITAL_REWARD: f64 = 5.0;

struct CrisisTemplate {
    kind: CrisisKind,
    title: &'static str,
    base_escalation: f64,
    media_weight: f64,
    public_weight: f64,
    opposition_weight: f64,
    management_weight: f64,
    severity_range: (f64, f64),
    possible_escalations: &'static [CrisisKind],
}

const TEMPLATES: [CrisisTemplate; 12] = [
    CrisisTemplate {
        kind: CrisisKind::MarketCrash,
        title: "Stock market crash",
        base_escalation: 0.12,
        media_weight: 0.20,
        public_weight: 0.12,
        opposition_weight: 0.08,
        management_weight: 0.45,
        severity_range: (30.0, 55.0),
        possible_escalations: &[CrisisKind::BankingRun],
    },
    CrisisTemplate {
        kind: CrisisKind::BankingRun,
        title: "Run on the banks",
        base_escalation: 0.16,
        media_weight: 0.22,
        public_weight: 0.18,
        opposition_weight: 0.06,
        management_weight: 0.42,
        severity_range: (35.0, 60.0),
        possible_escalations: &[CrisisKind::MarketCrash],
    },
    CrisisTemplate {
        kind: CrisisKind::CoalitionRevolt,
        title: "Open revolt in the coalition",
        base_escalation: 0.10,
        media_weight: 0.18,
        public_weight: 0.10,
        opposition_weight: 0.15,
        management_weight: 0.40,
        severity_range: (25.0, 45.0),
        possible_escalations: &[CrisisKind::MinisterResignation],
    },
    CrisisTemplate {
        kind: CrisisKind::MinisterResignation,
        title: "Senior minister resigns",
        base_escalation: 0.08,
        media_weight: 0.20,
        public_weight: 0.08,
        opposition_weight: 0.12,
        management_weight: 0.45,
        severity_range: (20.0, 40.0),
        possible_escalations: &[CrisisKind::CoalitionRevolt],
    },
    CrisisTemplate {
        kind: CrisisKind::CorruptionScandal,
        title: "Corruption allegations",
        base_escalation: 0.14,
        media_weight: 0.25,
        public_weight: 0.15,
        opposition_weight: 0.14,
        management_weight: 0.38,
        severity_range: (25.0, 50.0),
        possible_escalations: &[CrisisKind::MinisterResignation, CrisisKind::CoalitionRevolt],
    },
    CrisisTemplate {
        kind: CrisisKind::MediaLeak,
        title: "Leaked cabinet papers",
        base_escalation: 0.10,
        media_weight: 0.28,
        public_weight: 0.10,
        opposition_weight: 0.10,
        management_weight: 0.42,
        severity_range: (20.0, 40.0),
        possible_escalations: &[CrisisKind::CorruptionScandal],
    },
    CrisisTemplate {
        kind: CrisisKind::BorderDispute,
        title: "Border dispute flares",
        base_escalation: 0.11,
        media_weight: 0.16,
        public_weight: 0.12,
        opposition_weight: 0.06,
        management_weight: 0.40,
        severity_range: (25.0, 45.0),
        possible_escalations: &[CrisisKind::TradeWar],
    },
    CrisisTemplate {
        kind: CrisisKind::TradeWar,
        title: "Trade war",
        base_escalation: 0.09,
        media_weight: 0.14,
        public_weight: 0.12,
        opposition_weight: 0.05,
        management_weight: 0.38,
        severity_range: (30.0, 50.0),
        possible_escalations: &[CrisisKind::MarketCrash],
    },
    CrisisTemplate {
        kind: CrisisKind::TerrorThreat,
        title: "Credible terror threat",
        base_escalation: 0.15,
        media_weight: 0.24,
        public_weight: 0.20,
        opposition_weight: 0.04,
        management_weight: 0.45,
        severity_range: (35.0, 60.0),
        possible_escalations: &[CrisisKind::CyberAttack],
    },
    CrisisTemplate {
        kind: CrisisKind::CyberAttack,
        title: "Cyber attack on infrastructure",
        base_escalation: 0.13,
        media_weight: 0.20,
        public_weight: 0.14,
        opposition_weight: 0.05,
        management_weight: 0.42,
        severity_range: (30.0, 55.0),
        possible_escalations: &[CrisisKind::TerrorThreat],
    },
    CrisisTemplate {
        kind: CrisisKind::RiverFlood,
        title: "Severe river flooding",
        base_escalation: 0.10,
        media_weight: 0.18,
        public_weight: 0.18,
        opposition_weight: 0.03,
        management_weight: 0.48,
        severity_range: (30.0, 55.0),
        possible_escalations: &[CrisisKind::Epidemic],
    },
    CrisisTemplate {
        kind: CrisisKind::Epidemic,
        title: "Epidemic outbreak",
        base_escalation: 0.14,
        media_weight: 0.20,
        public_weight: 0.22,
        opposition_weight: 0.04,
        management_weight: 0.44,
        severity_range: (35.0, 60.0),
        possible_escalations: &[CrisisKind::RiverFlood],
    },
];

fn template(kind: CrisisKind) -> &'static CrisisTemplate {
    TEMPLATES
        .iter()
        .find(|t| t.kind == kind)
        .unwrap_or(&TEMPLATES[0])
}

/// Escalation targets declared for a crisis kind.
pub fn possible_escalations(kind: CrisisKind) -> &'static [CrisisKind] {
    template(kind).possible_escalations
}

/// Generates, escalates, and resolves crisis entities with severity, media
/// attention, and public-concern feedback, plus player-chosen responses.
pub struct CrisisEngine;

impl Engine for CrisisEngine {
    fn name(&self) -> &str {
        "crisis"
    }

    fn on_turn(&mut self, ctx: &mut TurnContext) {
        update_active_crises(ctx);
        // Resolution is checked before escalation: a crisis that qualifies
        // for both in the same tick resolves.
        resolve_completed(ctx);
        escalate_runaway(ctx);
        maybe_generate(ctx);
    }

    fn react(&mut self, ctx: &mut TurnContext) {
        for event in ctx.inbox {
            if let GameEvent::EconomicEvent { severity, .. } = event
                && *severity == LogSeverity::Critical
            {
                // Critical economic headlines amplify coverage of ongoing
                // economic crises.
                for crisis in &mut ctx.state.crises.active {
                    if crisis.kind.category() == CrisisCategory::Economic {
                        crisis.set_media_attention(crisis.media_attention + 3.0);
                    }
                }
            }
        }
    }

    fn handle_intent(&mut self, ctx: &mut TurnContext, intent: &GameEvent) -> bool {
        let GameEvent::CrisisRespond {
            crisis_id,
            response,
        } = intent
        else {
            return false;
        };
        respond(ctx, *crisis_id, *response);
        true
    }
}

/// Support-weighted average aggressiveness across opposition parties.
fn opposition_pressure(state: &GameState) -> f64 {
    let parties = &state.politics.opposition_parties;
    let total_support: f64 = parties.iter().map(|p| p.support).sum();
    if total_support <= 0.0 {
        return 0.3;
    }
    parties
        .iter()
        .map(|p| p.aggressiveness * (p.support / total_support))
        .sum()
}

// ---------------------------------------------------------------------------
// Per-turn feedback updates
// ---------------------------------------------------------------------------

fn update_active_crises(ctx: &mut TurnContext) {
    let pressure = opposition_pressure(ctx.state);
    for i in 0..ctx.state.crises.active.len() {
        let (severity_noise, media_noise, concern_noise) = (
            ctx.rng.random_range(-1.0..1.0),
            ctx.rng.random_range(-3.0..3.0),
            ctx.rng.random_range(-2.0..2.0),
        );
        let crisis = &mut ctx.state.crises.active[i];
        crisis.weeks_active += 1;
        let t = template(crisis.kind);

        let media_factor = crisis.media_attention / 100.0 * t.media_weight;
        let public_factor = crisis.public_concern / 100.0 * t.public_weight;
        let opposition_factor = pressure * t.opposition_weight;
        let management_factor = crisis.management_score / 100.0 * t.management_weight;
        let delta = 10.0
            * (t.base_escalation + media_factor + public_factor + opposition_factor
                - management_factor);
        crisis.set_severity(crisis.severity + delta + severity_noise);

        // Media chases severity; the public chases the media. Both damped.
        let media_target = crisis.severity * MEDIA_TARGET_OF_SEVERITY;
        crisis.set_media_attention(
            crisis.media_attention
                + MEDIA_PULL * (media_target - crisis.media_attention)
                + media_noise,
        );
        let concern_target = crisis.media_attention * CONCERN_TARGET_OF_MEDIA;
        crisis.set_public_concern(
            crisis.public_concern
                + CONCERN_PULL * (concern_target - crisis.public_concern)
                + concern_noise,
        );
    }
}

// ---------------------------------------------------------------------------
// Terminal transitions
// ---------------------------------------------------------------------------

fn resolve_completed(ctx: &mut TurnContext) {
    let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
    let mut i = 0;
    while i < ctx.state.crises.active.len() {
        if ctx.state.crises.active[i].management_score < RESOLUTION_MANAGEMENT {
            i += 1;
            continue;
        }
        let crisis = ctx.state.crises.active.remove(i);
        ctx.state.politics.adjust_approval(RESOLUTION_APPROVAL_REWARD);
        ctx.state.politics.adjust_capital(RESOLUTION_CAPITAL_REWARD);
        ctx.state.crises.record(CrisisRecord {
            crisis_id: crisis.id,
            kind: crisis.kind,
            week,
            year,
            disposition: CrisisDisposition::Resolved,
        });
        ctx.state.log.record(
            week,
            year,
            LogSeverity::Notice,
            format!("Crisis resolved: {}", crisis.title),
        );
        ctx.outbox.push(GameEvent::CrisisResolved {
            id: crisis.id,
            kind: crisis.kind,
        });
        ctx.state.crises.resolved.push(crisis);
    }
}

fn escalate_runaway(ctx: &mut TurnContext) {
    let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
    let candidates: Vec<(u64, CrisisKind)> = ctx
        .state
        .crises
        .active
        .iter()
        .filter(|c| c.severity >= ESCALATION_SEVERITY && !c.has_escalated)
        .map(|c| (c.id, c.kind))
        .collect();

    for (id, kind) in candidates {
        let escalations = possible_escalations(kind);
        let spawned_kind = escalations[ctx.rng.random_range(0..escalations.len())];
        let spawned = spawn_crisis(ctx, spawned_kind);
        let spawned_id = spawned.id;

        if let Some(parent) = ctx.state.crises.active_mut(id) {
            parent.has_escalated = true;
        }
        ctx.state.crises.record(CrisisRecord {
            crisis_id: id,
            kind,
            week,
            year,
            disposition: CrisisDisposition::Escalated,
        });
        ctx.state.log.record(
            week,
            year,
            LogSeverity::Critical,
            format!("Crisis escalated into {}", spawned_kind.label()),
        );
        push_generated(ctx, spawned);
        ctx.outbox.push(GameEvent::CrisisEscalated {
            id,
            spawned_id,
            spawned_kind,
        });
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

fn generation_chance(state: &GameState) -> f64 {
    let eco = &state.economy;
    let mut chance = GENERATION_BASE_CHANCE;
    if eco.gdp_growth < 0.0 {
        chance += 0.03;
    } else if eco.gdp_growth < 1.0 {
        chance += 0.02;
    }
    if state.politics.approval < 35.0 {
        chance += 0.03;
    }
    if eco.unemployment > 8.0 {
        chance += 0.02;
    }
    if eco.confidence < 30.0 {
        chance += 0.02;
    }
    if state.crises.active.len() >= CROWDING_THRESHOLD {
        chance *= CROWDING_DAMPER;
    }
    chance
}

fn category_weights(state: &GameState) -> [(CrisisCategory, f64); 6] {
    let eco = &state.economy;
    let mut economic = 1.0;
    if eco.gdp_growth < 1.0 {
        economic += 1.0;
    }
    let mut political = 0.9;
    if state.politics.coalition.support < 35.0 {
        political += 0.8;
    }
    let mut international = 0.6;
    if state
        .diplomacy
        .relations
        .values()
        .any(|r| r.score < 30.0)
    {
        international += 0.8;
    }
    [
        (CrisisCategory::Economic, economic),
        (CrisisCategory::Political, political),
        (CrisisCategory::Scandal, 0.7),
        (CrisisCategory::International, international),
        (CrisisCategory::Security, 0.6),
        (CrisisCategory::Natural, 0.5),
    ]
}

fn maybe_generate(ctx: &mut TurnContext) {
    if ctx.rng.random_range(0.0..1.0) >= generation_chance(ctx.state) {
        return;
    }
    let weights = category_weights(ctx.state);
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut roll = ctx.rng.random_range(0.0..total);
    let mut category = CrisisCategory::Economic;
    for (candidate, weight) in weights {
        if roll < weight {
            category = candidate;
            break;
        }
        roll -= weight;
    }
    let pool: Vec<&CrisisTemplate> = TEMPLATES
        .iter()
        .filter(|t| t.kind.category() == category)
        .collect();
    let chosen = pool[ctx.rng.random_range(0..pool.len())].kind;
    let crisis = spawn_crisis(ctx, chosen);
    push_generated(ctx, crisis);
}

fn spawn_crisis(ctx: &mut TurnContext, kind: CrisisKind) -> Crisis {
    let t = template(kind);
    let severity = ctx.rng.random_range(t.severity_range.0..t.severity_range.1);
    Crisis {
        id: ctx.state.crises.next_id(),
        kind,
        title: t.title.to_string(),
        severity,
        media_attention: ctx.rng.random_range(25.0..45.0),
        public_concern: ctx.rng.random_range(20.0..40.0),
        management_score: 0.0,
        started_week: ctx.state.clock.absolute_week(),
        weeks_active: 0,
        has_escalated: false,
        responses: Vec::new(),
    }
}

fn push_generated(ctx: &mut TurnContext, crisis: Crisis) {
    let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
    ctx.state.crises.record(CrisisRecord {
        crisis_id: crisis.id,
        kind: crisis.kind,
        week,
        year,
        disposition: CrisisDisposition::Opened,
    });
    ctx.state.log.record(
        week,
        year,
        LogSeverity::Warning,
        format!("New crisis: {}", crisis.title),
    );
    ctx.outbox.push(GameEvent::CrisisGenerated {
        id: crisis.id,
        kind: crisis.kind,
        severity: crisis.severity,
    });
    ctx.state.crises.active.push(crisis);
}

// ---------------------------------------------------------------------------
// Player responses
// ---------------------------------------------------------------------------

/// Timing reward ladder: fast responses land harder.
fn timing_factor(weeks_active: u32) -> f64 {
    match weeks_active {
        0..=1 => 1.2,
        2..=3 => 1.0,
        4..=6 => 0.8,
        _ => 0.6,
    }
}

fn respond(ctx: &mut TurnContext, crisis_id: u64, response: CrisisResponseKind) {
    let Some((weeks_active, public_concern)) = ctx
        .state
        .crises
        .active
        .iter()
        .find(|c| c.id == crisis_id)
        .map(|c| (c.weeks_active, c.public_concern))
    else {
        // The crisis resolved or escalated away before the response landed.
        tracing::debug!(crisis_id, "response to unknown crisis ignored");
        return;
    };

    let timing = timing_factor(weeks_active);
    let public_support =
        (0.5 + ctx.state.politics.approval / 200.0 - public_concern / 400.0).clamp(0.4, 1.2);
    let cost = response.cost();
    let funded = ctx.state.politics.political_capital >= cost;
    let resource = if funded { 1.0 } else { UNDERFUNDED_RESOURCE_FACTOR };

    let effectiveness = response.base_effectiveness() * timing * resource * public_support;
    let tier = ResponseTier::from_effectiveness(effectiveness);
    let (approval_delta, severity_delta, media_delta) = match tier {
        ResponseTier::HighlyEffective => (2.0, -10.0, -8.0),
        ResponseTier::Effective => (1.0, -5.0, -4.0),
        ResponseTier::PartiallyEffective => (0.0, -2.0, -1.0),
        ResponseTier::Ineffective => (-1.0, 2.0, 2.0),
    };

    let week = ctx.state.clock.absolute_week();
    if let Some(crisis) = ctx.state.crises.active_mut(crisis_id) {
        crisis.add_management(effectiveness * MANAGEMENT_PER_EFFECTIVENESS);
        crisis.set_severity(crisis.severity + severity_delta);
        crisis.set_media_attention(crisis.media_attention + media_delta);
        crisis.responses.push(ResponseRecord {
            kind: response,
            effectiveness,
            tier,
            week,
        });
    }

    ctx.state.politics.adjust_capital(-cost);
    ctx.state.politics.adjust_approval(approval_delta);
    ctx.outbox.push(GameEvent::CrisisResponseImplemented {
        id: crisis_id,
        response,
        tier,
    });
}
