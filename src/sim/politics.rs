use rand::Rng;

use super::context::TurnContext;
use super::engine::Engine;
use crate::bus::GameEvent;
use crate::model::{
    CalendarPoint, DecisionKind, EffectVector, ElectionOutcome, EventOption, LogSeverity,
    PendingDecision, PoliticalEvent, PoliticalEventCategory, ScheduledVote,
};

// --- Approval update weights ---
const APPROVAL_GDP_WEIGHT: f64 = 0.3;
const APPROVAL_UNEMPLOYMENT_WEIGHT: f64 = 0.25;
const APPROVAL_NOISE: f64 = 0.8;
const HIGH_INFLATION_THRESHOLD: f64 = 4.0;
const LOW_INFLATION_THRESHOLD: f64 = 1.0;

// --- Support drift bands ---
const DRIFT_HIGH_APPROVAL: f64 = 60.0;
const DRIFT_LOW_APPROVAL: f64 = 40.0;

// --- Event generation ---
const EVENT_BASE_CHANCE: f64 = 0.12;
const MAX_ACTIVE_EVENTS: usize = 2;
const EFFECT_VARIANCE: f64 = 0.2;

// --- Elections ---
const ELECTION_TERM_YEARS: u32 = 4;

/// Computes approval deltas, coalition/opposition drift, scheduled votes,
/// political events, and election-cycle resolution.
pub struct PoliticsEngine;

impl Engine for PoliticsEngine {
    fn name(&self) -> &str {
        "politics"
    }

    fn on_turn(&mut self, ctx: &mut TurnContext) {
        update_approval(ctx);
        drift_bloc_support(ctx.state);
        resolve_due_vote(ctx);
        maybe_generate_event(ctx);
        check_election(ctx);
    }

    fn react(&mut self, ctx: &mut TurnContext) {
        for event in ctx.inbox {
            // Critical economic headlines cost the government directly,
            // beyond their metric effects next turn.
            if let GameEvent::EconomicEvent { severity, .. } = event
                && *severity == LogSeverity::Critical
            {
                ctx.state.politics.adjust_approval(-0.4);
            }
        }
    }

    fn handle_intent(&mut self, ctx: &mut TurnContext, intent: &GameEvent) -> bool {
        let GameEvent::PoliticalEventResponse { event_id, option } = intent else {
            return false;
        };
        let Some(event) = ctx.state.politics.take_event(*event_id) else {
            // Stale reference: the event expired or was already resolved.
            tracing::debug!(event_id, "response to unknown political event ignored");
            return true;
        };
        let Some(choice) = event.options.iter().find(|o| o.id == *option) else {
            tracing::debug!(event_id, option, "unknown option ignored");
            ctx.state.politics.active_events.push(event);
            return true;
        };
        let effects = choice.effects;
        let variance = ctx
            .rng
            .random_range(1.0 - EFFECT_VARIANCE..1.0 + EFFECT_VARIANCE);
        apply_effects(ctx, &effects, variance);
        ctx.state
            .log
            .take_decision(*event_id, DecisionKind::PoliticalEvent);
        ctx.outbox.push(GameEvent::PoliticalEventResolved {
            id: *event_id,
            option: *option,
            title: event.title,
        });
        true
    }
}

fn apply_effects(ctx: &mut TurnContext, effects: &EffectVector, variance: f64) {
    ctx.state.politics.adjust_approval(effects.approval * variance);
    ctx.state
        .politics
        .adjust_coalition_support(effects.coalition_support * variance);
    let eco = &mut ctx.state.economy;
    eco.set_gdp_growth(eco.gdp_growth + effects.gdp_growth * variance);
    eco.adjust_debt(effects.debt * variance);
}

// ---------------------------------------------------------------------------
// Approval and support
// ---------------------------------------------------------------------------

fn update_approval(ctx: &mut TurnContext) {
    let eco = &ctx.state.economy;
    let inflation_term = if eco.inflation > HIGH_INFLATION_THRESHOLD {
        -0.5 * (eco.inflation - HIGH_INFLATION_THRESHOLD)
    } else if eco.inflation < LOW_INFLATION_THRESHOLD {
        -0.2 * (LOW_INFLATION_THRESHOLD - eco.inflation)
    } else {
        0.1
    };
    let delta = APPROVAL_GDP_WEIGHT * (eco.gdp_growth - 2.0)
        + APPROVAL_UNEMPLOYMENT_WEIGHT * (6.0 - eco.unemployment)
        + inflation_term
        + ctx.rng.random_range(-APPROVAL_NOISE..APPROVAL_NOISE);
    let applied = ctx.state.politics.adjust_approval(delta);
    ctx.outbox.push(GameEvent::ApprovalChange {
        change: applied,
        new_approval: ctx.state.politics.approval,
    });
}

/// Coalition support drifts up and opposition down while approval holds
/// above 60, and the reverse below 40. Independents are the residual,
/// computed on read.
fn drift_bloc_support(state: &mut crate::model::GameState) {
    let approval = state.politics.approval;
    if approval > DRIFT_HIGH_APPROVAL {
        state.politics.adjust_coalition_support(0.15);
        state.politics.adjust_opposition_support(-0.1);
    } else if approval < DRIFT_LOW_APPROVAL {
        state.politics.adjust_coalition_support(-0.2);
        state.politics.adjust_opposition_support(0.15);
    }
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// Pass probability for a scheduled vote, clamped to [0.1, 0.9].
pub fn vote_pass_probability(state: &crate::model::GameState) -> f64 {
    let coalition_fraction = state.politics.coalition.support / 100.0;
    let approval_bonus = (state.politics.approval - 50.0) / 200.0;
    let stability_bonus = if state.politics.coalition.support > 50.0 {
        0.05
    } else {
        0.0
    };
    (coalition_fraction + approval_bonus + stability_bonus).clamp(0.1, 0.9)
}

fn resolve_due_vote(ctx: &mut TurnContext) {
    let Some(vote) = ctx.state.politics.next_vote.clone() else {
        return;
    };
    if ctx.state.clock.absolute_week() < vote.at.absolute_week() {
        return;
    }
    ctx.state.politics.next_vote = None;
    let passed = ctx.rng.random_range(0.0..1.0) < vote_pass_probability(ctx.state);
    if passed {
        ctx.state.politics.adjust_approval(2.0);
        ctx.state.politics.adjust_capital(3.0);
    } else {
        ctx.state.politics.adjust_approval(-3.0);
        ctx.state.politics.adjust_coalition_support(-1.0);
    }
    let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
    ctx.state.log.record(
        week,
        year,
        if passed {
            LogSeverity::Notice
        } else {
            LogSeverity::Warning
        },
        format!(
            "Vote on {} {}",
            vote.topic,
            if passed { "passed" } else { "failed" }
        ),
    );
    ctx.outbox.push(GameEvent::VoteHeld {
        topic: vote.topic,
        passed,
    });
}

// ---------------------------------------------------------------------------
// Event generation (two-stage weighted draw)
// ---------------------------------------------------------------------------

fn category_weights(state: &crate::model::GameState) -> [(PoliticalEventCategory, f64); 4] {
    let politics = &state.politics;
    let mut coalition_crisis = 0.8;
    if politics.coalition.support < 35.0 {
        coalition_crisis += 1.2;
    }
    let mut opposition_move = 0.7;
    if politics.approval < 40.0 {
        opposition_move += 1.0;
    }
    [
        (PoliticalEventCategory::PolicyVote, 1.0),
        (PoliticalEventCategory::CoalitionCrisis, coalition_crisis),
        (PoliticalEventCategory::OppositionMove, opposition_move),
        (PoliticalEventCategory::EconomicPolicy, 0.9),
    ]
}

fn pick_category(ctx: &mut TurnContext) -> PoliticalEventCategory {
    let weights = category_weights(ctx.state);
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut roll = ctx.rng.random_range(0.0..total);
    for (category, weight) in weights {
        if roll < weight {
            return category;
        }
        roll -= weight;
    }
    PoliticalEventCategory::PolicyVote
}

struct EventTemplate {
    title: &'static str,
    description: &'static str,
    options: &'static [(&'static str, EffectVector)],
}

const fn fx(approval: f64, gdp_growth: f64, debt: f64, coalition_support: f64) -> EffectVector {
    EffectVector {
        approval,
        gdp_growth,
        debt,
        coalition_support,
    }
}

const POLICY_VOTE_TEMPLATES: &[EventTemplate] = &[
    EventTemplate {
        title: "Labour market reform bill",
        description: "The cabinet wants a floor vote on loosening dismissal rules.",
        options: &[
            ("Push the bill to a vote", fx(-1.0, 0.3, 0.0, -1.0)),
            ("Water it down first", fx(0.5, 0.1, 0.0, 0.5)),
            ("Shelve it", fx(0.0, -0.1, 0.0, 1.0)),
        ],
    },
    EventTemplate {
        title: "Pension age adjustment",
        description: "Actuaries say the pension system needs a higher retirement age.",
        options: &[
            ("Raise the age by two years", fx(-3.0, 0.2, -2.0, -1.0)),
            ("Phase it in over a decade", fx(-1.0, 0.1, -0.5, 0.0)),
        ],
    },
];

const COALITION_CRISIS_TEMPLATES: &[EventTemplate] = &[
    EventTemplate {
        title: "Junior partner ultimatum",
        description: "The junior coalition partner threatens to walk over spending cuts.",
        options: &[
            ("Concede a ministry", fx(-1.0, 0.0, 0.5, 3.0)),
            ("Call their bluff", fx(1.0, 0.0, 0.0, -4.0)),
        ],
    },
    EventTemplate {
        title: "Backbench rebellion",
        description: "A dozen backbenchers refuse to support the government line.",
        options: &[
            ("Offer committee posts", fx(-0.5, 0.0, 0.3, 2.5)),
            ("Threaten deselection", fx(-1.5, 0.0, 0.0, -2.0)),
            ("Ignore them", fx(0.0, 0.0, 0.0, -1.0)),
        ],
    },
];

const OPPOSITION_MOVE_TEMPLATES: &[EventTemplate] = &[
    EventTemplate {
        title: "No-confidence motion filed",
        description: "The opposition tables a symbolic no-confidence motion.",
        options: &[
            ("Debate it head-on", fx(1.5, 0.0, 0.0, -0.5)),
            ("Use procedure to delay", fx(-1.0, 0.0, 0.0, 0.5)),
        ],
    },
    EventTemplate {
        title: "Shadow budget released",
        description: "The opposition publishes a fully-costed alternative budget.",
        options: &[
            ("Rebut line by line", fx(1.0, 0.0, 0.0, 0.0)),
            ("Dismiss it as fantasy", fx(-0.5, 0.0, 0.0, 0.0)),
        ],
    },
];

const ECONOMIC_POLICY_TEMPLATES: &[EventTemplate] = &[
    EventTemplate {
        title: "Industry bailout request",
        description: "A strategic employer requests emergency state support.",
        options: &[
            ("Bail it out", fx(1.0, 0.2, 2.0, 0.0)),
            ("Offer loan guarantees only", fx(0.0, 0.1, 0.5, 0.0)),
            ("Let the market decide", fx(-2.0, -0.3, 0.0, -0.5)),
        ],
    },
    EventTemplate {
        title: "Windfall tax proposal",
        description: "Treasury drafts a windfall tax on energy profits.",
        options: &[
            ("Levy the tax", fx(2.0, -0.2, -1.5, 0.0)),
            ("Negotiate voluntary contributions", fx(0.5, 0.0, -0.3, 0.0)),
        ],
    },
];

fn templates(category: PoliticalEventCategory) -> &'static [EventTemplate] {
    match category {
        PoliticalEventCategory::PolicyVote => POLICY_VOTE_TEMPLATES,
        PoliticalEventCategory::CoalitionCrisis => COALITION_CRISIS_TEMPLATES,
        PoliticalEventCategory::OppositionMove => OPPOSITION_MOVE_TEMPLATES,
        PoliticalEventCategory::EconomicPolicy => ECONOMIC_POLICY_TEMPLATES,
    }
}

fn maybe_generate_event(ctx: &mut TurnContext) {
    if ctx.state.politics.active_events.len() >= MAX_ACTIVE_EVENTS {
        return;
    }
    if ctx.rng.random_range(0.0..1.0) >= EVENT_BASE_CHANCE {
        return;
    }
    let category = pick_category(ctx);
    let pool = templates(category);
    let template = &pool[ctx.rng.random_range(0..pool.len())];

    let id = ctx.state.politics.next_event_id();
    let event = PoliticalEvent {
        id,
        category,
        title: template.title.to_string(),
        description: template.description.to_string(),
        options: template
            .options
            .iter()
            .enumerate()
            .map(|(i, (label, effects))| EventOption {
                id: i as u8,
                label: label.to_string(),
                effects: *effects,
            })
            .collect(),
        created_week: ctx.state.clock.absolute_week(),
    };

    // A policy-vote situation also puts a floor vote on the calendar.
    if category == PoliticalEventCategory::PolicyVote && ctx.state.politics.next_vote.is_none() {
        let mut at = CalendarPoint {
            week: ctx.state.clock.week + 4,
            year: ctx.state.clock.year,
        };
        if at.week > crate::model::WEEKS_PER_YEAR {
            at.week -= crate::model::WEEKS_PER_YEAR;
            at.year += 1;
        }
        ctx.state.politics.next_vote = Some(ScheduledVote {
            topic: template.title.to_string(),
            at,
        });
    }

    ctx.state.log.push_decision(PendingDecision {
        id,
        kind: DecisionKind::PoliticalEvent,
        summary: event.title.clone(),
    });
    ctx.outbox.push(GameEvent::PoliticalEventTriggered {
        id,
        category,
        title: event.title.clone(),
    });
    ctx.state.politics.active_events.push(event);
}

// ---------------------------------------------------------------------------
// Elections
// ---------------------------------------------------------------------------

/// Classify an election outcome from the approval bands.
pub fn classify_election(approval: f64) -> ElectionOutcome {
    if approval >= 55.0 {
        ElectionOutcome::Victory
    } else if approval >= 45.0 {
        ElectionOutcome::NarrowVictory
    } else if approval >= 35.0 {
        ElectionOutcome::CoalitionRequired
    } else {
        ElectionOutcome::Defeat
    }
}

fn check_election(ctx: &mut TurnContext) {
    let due =
        ctx.state.clock.absolute_week() >= ctx.state.politics.next_election.absolute_week();
    if !due {
        return;
    }
    let outcome = classify_election(ctx.state.politics.approval);
    let politics = &mut ctx.state.politics;
    match outcome {
        ElectionOutcome::Victory => {
            politics.adjust_approval(5.0);
            politics.adjust_coalition_support(5.0);
            politics.adjust_capital(20.0);
        }
        ElectionOutcome::NarrowVictory => {
            politics.adjust_approval(2.0);
            politics.adjust_coalition_support(2.0);
            politics.adjust_capital(10.0);
        }
        ElectionOutcome::CoalitionRequired => {
            politics.adjust_coalition_support(-3.0);
            politics.adjust_capital(5.0);
        }
        ElectionOutcome::Defeat => {}
    }
    politics.last_election = Some(outcome);
    politics.next_election = CalendarPoint {
        week: politics.next_election.week,
        year: politics.next_election.year + ELECTION_TERM_YEARS,
    };
    let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
    ctx.state.log.record(
        week,
        year,
        LogSeverity::Critical,
        format!("General election held: {outcome:?}"),
    );
    ctx.outbox.push(GameEvent::ElectionHeld {
        outcome,
        approval: ctx.state.politics.approval,
    });
}
