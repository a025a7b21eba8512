use rand::Rng;

use super::context::TurnContext;
use super::engine::Engine;
use crate::bus::GameEvent;
use crate::model::{
    CyclePhase, EconomicCondition, Economy, LogSeverity, Policy, PolicyKind, SectorKind, Shock,
    ShockKind,
};

// --- Smoothing factors ---
const GDP_SMOOTHING: f64 = 0.3;
const UNEMPLOYMENT_SMOOTHING: f64 = 0.2;
const INFLATION_SMOOTHING: f64 = 0.25;

// --- GDP target weights ---
const PRODUCTIVITY_WEIGHT: f64 = 0.05;
const CONFIDENCE_WEIGHT: f64 = 0.02;

// --- Okun / Phillips constants ---
const NATURAL_UNEMPLOYMENT: f64 = 6.0;
const TREND_GROWTH: f64 = 2.0;
const OKUN_COEFFICIENT: f64 = 0.4;
const DEMAND_PULL_BASE: f64 = 2.0;
const DEMAND_PULL_SLOPE: f64 = 0.35;
const MONETARY_SLOPE: f64 = 0.25;
const NEUTRAL_RATE: f64 = 3.0;

// --- Cycle transition thresholds ---
const EXPANSION_MAX_WEEKS: u32 = 104;
const EXPANSION_INFLATION_LIMIT: f64 = 4.5;
const PEAK_MAX_WEEKS: u32 = 8;
const PEAK_UNEMPLOYMENT_LIMIT: f64 = 7.5;
const RECESSION_MAX_WEEKS: u32 = 52;
const TROUGH_MAX_WEEKS: u32 = 12;
const TROUGH_CONFIDENCE_EXIT: f64 = 60.0;

// --- Event detector trial rates (tunables carried from the source model) ---
const RANDOM_SHOCK_CHANCE: f64 = 0.02;
const RANDOM_SHOCK_MIN_MAGNITUDE: f64 = 0.5;
const RANDOM_SHOCK_MAX_MAGNITUDE: f64 = 1.5;

/// Computes GDP growth, unemployment, inflation, sector performance, the
/// business-cycle phase, and policy/shock effects. Runs first each turn so
/// downstream engines see fresh metrics.
pub struct EconomyEngine;

impl Engine for EconomyEngine {
    fn name(&self) -> &str {
        "economy"
    }

    fn on_turn(&mut self, ctx: &mut TurnContext) {
        advance_cycle(ctx);
        update_sectors(ctx);
        update_gdp(&mut ctx.state.economy);
        update_unemployment(&mut ctx.state.economy);
        update_inflation(&mut ctx.state.economy);
        update_confidence(ctx);
        update_debt_and_productivity(ctx);
        tick_policies(ctx.state);
        run_event_detector(ctx);
        maybe_random_shock(ctx);

        let eco = &ctx.state.economy;
        ctx.outbox.push(GameEvent::EconomicUpdate {
            gdp_growth: eco.gdp_growth,
            unemployment: eco.unemployment,
            inflation: eco.inflation,
            confidence: eco.confidence,
            phase: eco.cycle.phase,
        });
    }

    fn react(&mut self, ctx: &mut TurnContext) {
        // Crises dent confidence the week they surface; resolutions repair
        // a little of it.
        for event in ctx.inbox {
            match event {
                GameEvent::CrisisGenerated { severity, .. } => {
                    ctx.state.economy.adjust_confidence(-(severity / 20.0));
                }
                GameEvent::CrisisResolved { .. } => {
                    ctx.state.economy.adjust_confidence(1.5);
                }
                _ => {}
            }
        }
    }

    fn handle_intent(&mut self, ctx: &mut TurnContext, intent: &GameEvent) -> bool {
        match intent {
            GameEvent::PolicyImplemented {
                kind,
                magnitude,
                duration_weeks,
            } => {
                let policy = Policy::new(*kind, *magnitude, *duration_weeks);
                apply_policy_immediate(&mut ctx.state.economy, &policy);
                ctx.state.economy.active_policies.push(policy);
                let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
                ctx.state.log.record(
                    week,
                    year,
                    LogSeverity::Notice,
                    format!("Government implemented {}", kind.label()),
                );
                true
            }
            GameEvent::ShockRequested { kind, magnitude } => {
                apply_shock(
                    ctx.state,
                    Shock {
                        kind: *kind,
                        magnitude: *magnitude,
                    },
                );
                ctx.outbox.push(GameEvent::ShockApplied {
                    kind: *kind,
                    magnitude: *magnitude,
                });
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Business cycle
// ---------------------------------------------------------------------------

/// Next phase as a total function of (phase, weeks in phase, relevant
/// metric). Pure so transitions are deterministic given fixed inputs.
pub fn next_phase(eco: &Economy) -> Option<CyclePhase> {
    let weeks = eco.cycle.weeks_in_phase;
    match eco.cycle.phase {
        CyclePhase::Expansion
            if weeks > EXPANSION_MAX_WEEKS || eco.inflation > EXPANSION_INFLATION_LIMIT =>
        {
            Some(CyclePhase::Peak)
        }
        CyclePhase::Peak if weeks > PEAK_MAX_WEEKS || eco.unemployment > PEAK_UNEMPLOYMENT_LIMIT => {
            Some(CyclePhase::Recession)
        }
        CyclePhase::Recession if weeks > RECESSION_MAX_WEEKS || eco.gdp_growth > 0.0 => {
            Some(CyclePhase::Trough)
        }
        CyclePhase::Trough if weeks > TROUGH_MAX_WEEKS || eco.confidence > TROUGH_CONFIDENCE_EXIT => {
            Some(CyclePhase::Expansion)
        }
        _ => None,
    }
}

fn advance_cycle(ctx: &mut TurnContext) {
    ctx.state.economy.cycle.weeks_in_phase += 1;
    if let Some(next) = next_phase(&ctx.state.economy) {
        let intensity = ctx.rng.random_range(0.3..0.9);
        ctx.state.economy.cycle.transition(next, intensity);
    }
}

fn phase_growth_multiplier(phase: CyclePhase) -> f64 {
    match phase {
        CyclePhase::Expansion => 1.25,
        CyclePhase::Peak => 1.0,
        CyclePhase::Recession => 0.55,
        CyclePhase::Trough => 0.8,
    }
}

fn sector_volatility(kind: SectorKind) -> f64 {
    match kind {
        SectorKind::Manufacturing => 0.6,
        SectorKind::Services => 0.4,
        SectorKind::Agriculture => 0.9,
        SectorKind::Technology => 1.2,
        SectorKind::Finance => 0.8,
    }
}

// ---------------------------------------------------------------------------
// Metric updates
// ---------------------------------------------------------------------------

fn update_sectors(ctx: &mut TurnContext) {
    let multiplier = phase_growth_multiplier(ctx.state.economy.cycle.phase);
    let intensity = ctx.state.economy.cycle.intensity;
    for sector in &mut ctx.state.economy.sectors {
        let volatility = sector_volatility(sector.kind) * (0.5 + intensity);
        let noise = ctx.rng.random_range(-volatility..volatility);
        sector.growth = sector.kind.base_growth() * multiplier + noise;
    }
}

fn update_gdp(eco: &mut Economy) {
    let weighted = eco.weighted_sector_growth();
    let productivity_term = (eco.productivity - 100.0) * PRODUCTIVITY_WEIGHT;
    let confidence_term = (eco.confidence - 50.0) * CONFIDENCE_WEIGHT;
    let target = weighted + productivity_term + confidence_term;
    eco.set_gdp_growth(eco.gdp_growth + GDP_SMOOTHING * (target - eco.gdp_growth));
}

fn update_unemployment(eco: &mut Economy) {
    let phase_adjust = match eco.cycle.phase {
        CyclePhase::Expansion => -0.2,
        CyclePhase::Peak => -0.4,
        CyclePhase::Recession => 1.2,
        CyclePhase::Trough => 0.6,
    };
    let target =
        NATURAL_UNEMPLOYMENT - OKUN_COEFFICIENT * (eco.gdp_growth - TREND_GROWTH) + phase_adjust;
    eco.set_unemployment(eco.unemployment + UNEMPLOYMENT_SMOOTHING * (target - eco.unemployment));
}

fn update_inflation(eco: &mut Economy) {
    let demand_pull = DEMAND_PULL_BASE + DEMAND_PULL_SLOPE * (eco.gdp_growth - TREND_GROWTH);
    let cost_push = match eco.cycle.phase {
        CyclePhase::Expansion => 0.3,
        CyclePhase::Peak => 0.9,
        CyclePhase::Recession => -0.6,
        CyclePhase::Trough => -0.3,
    };
    let monetary = MONETARY_SLOPE * (NEUTRAL_RATE - eco.interest_rate);
    let target = demand_pull + cost_push + monetary;
    eco.set_inflation(eco.inflation + INFLATION_SMOOTHING * (target - eco.inflation));
}

fn update_confidence(ctx: &mut TurnContext) {
    let eco = &ctx.state.economy;
    let phase_bonus = match eco.cycle.phase {
        CyclePhase::Expansion => 0.3,
        CyclePhase::Peak => 0.0,
        CyclePhase::Recession => -0.8,
        CyclePhase::Trough => -0.2,
    };
    let delta = 0.8 * (eco.gdp_growth - TREND_GROWTH) - 0.5 * (eco.unemployment - NATURAL_UNEMPLOYMENT)
        - 0.4 * (eco.inflation - 2.0)
        + phase_bonus
        + ctx.rng.random_range(-1.5..1.5);
    ctx.state.economy.adjust_confidence(delta);
}

fn update_debt_and_productivity(ctx: &mut TurnContext) {
    let eco = &ctx.state.economy;
    // Weak growth widens the deficit; strong growth pays some debt down.
    let deficit_drift = 0.05 + 0.04 * (TREND_GROWTH - eco.gdp_growth);
    let productivity_drift =
        0.02 * (100.0 - eco.productivity) + ctx.rng.random_range(-0.15..0.2);
    ctx.state.economy.adjust_debt(deficit_drift);
    ctx.state.economy.productivity =
        (ctx.state.economy.productivity + productivity_drift).clamp(70.0, 140.0);
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Instantaneous leg of a policy, applied once on implementation.
fn apply_policy_immediate(eco: &mut Economy, policy: &Policy) {
    let m = policy.magnitude;
    match policy.kind {
        PolicyKind::RateCut => eco.set_interest_rate(eco.interest_rate - m),
        PolicyKind::RateHike => eco.set_interest_rate(eco.interest_rate + m),
        PolicyKind::FiscalStimulus => eco.adjust_confidence(2.0 * m),
        PolicyKind::TaxCut => eco.adjust_confidence(1.5 * m),
        PolicyKind::TaxRise => eco.adjust_confidence(-2.0 * m),
        PolicyKind::AusterityPackage => eco.adjust_confidence(-2.5 * m),
        PolicyKind::InfrastructureInvestment => {}
    }
}

/// Incremental leg, applied every turn until expiry, then the elapsed
/// counter advances and expired policies are dropped.
fn tick_policies(state: &mut crate::model::GameState) {
    let policies = state.economy.active_policies.clone();
    for policy in &policies {
        let m = policy.magnitude;
        let eco = &mut state.economy;
        match policy.kind {
            PolicyKind::FiscalStimulus => {
                eco.set_gdp_growth(eco.gdp_growth + 0.08 * m);
                eco.adjust_debt(0.15 * m);
            }
            PolicyKind::TaxCut => {
                eco.set_gdp_growth(eco.gdp_growth + 0.05 * m);
                eco.adjust_debt(0.12 * m);
            }
            PolicyKind::TaxRise => {
                eco.set_gdp_growth(eco.gdp_growth - 0.04 * m);
                eco.adjust_debt(-0.15 * m);
            }
            PolicyKind::InfrastructureInvestment => {
                eco.productivity = (eco.productivity + 0.06 * m).clamp(70.0, 140.0);
                eco.adjust_debt(0.1 * m);
            }
            PolicyKind::AusterityPackage => {
                eco.set_gdp_growth(eco.gdp_growth - 0.06 * m);
                eco.adjust_debt(-0.2 * m);
            }
            // Rate moves are purely instantaneous.
            PolicyKind::RateCut | PolicyKind::RateHike => {}
        }
    }
    for policy in &mut state.economy.active_policies {
        policy.weeks_elapsed += 1;
    }
    state.economy.active_policies.retain(|p| !p.expired());
}

// ---------------------------------------------------------------------------
// Shocks
// ---------------------------------------------------------------------------

pub fn apply_shock(state: &mut crate::model::GameState, shock: Shock) {
    let m = shock.magnitude;
    let eco = &mut state.economy;
    match shock.kind {
        ShockKind::FinancialCrisis => {
            eco.cycle.transition(CyclePhase::Recession, (0.6 * m).clamp(0.0, 1.0));
            eco.adjust_confidence(-15.0 * m);
            eco.set_gdp_growth(eco.gdp_growth - 1.5 * m);
            eco.adjust_debt(2.0 * m);
            if let Some(finance) = eco.sector_mut(SectorKind::Finance) {
                finance.growth -= 4.0 * m;
            }
        }
        ShockKind::OilPriceSpike => {
            eco.set_inflation(eco.inflation + 1.2 * m);
            eco.set_gdp_growth(eco.gdp_growth - 0.5 * m);
            if let Some(manufacturing) = eco.sector_mut(SectorKind::Manufacturing) {
                manufacturing.growth -= 1.5 * m;
            }
        }
        ShockKind::TradeCollapse => {
            eco.set_gdp_growth(eco.gdp_growth - 1.0 * m);
            eco.adjust_confidence(-8.0 * m);
            if let Some(manufacturing) = eco.sector_mut(SectorKind::Manufacturing) {
                manufacturing.growth -= 2.0 * m;
            }
            if let Some(agriculture) = eco.sector_mut(SectorKind::Agriculture) {
                agriculture.growth -= 1.0 * m;
            }
        }
        ShockKind::TechBoom => {
            eco.adjust_confidence(6.0 * m);
            eco.set_gdp_growth(eco.gdp_growth + 0.5 * m);
            if let Some(tech) = eco.sector_mut(SectorKind::Technology) {
                tech.growth += 3.0 * m;
            }
        }
        ShockKind::CurrencyRun => {
            eco.set_inflation(eco.inflation + 2.0 * m);
            eco.set_interest_rate(eco.interest_rate + 1.0 * m);
            eco.adjust_confidence(-10.0 * m);
        }
    }
    let (week, year) = (state.clock.week, state.clock.year);
    state.log.record(
        week,
        year,
        LogSeverity::Critical,
        format!("Economic shock: {}", shock.kind.label()),
    );
}

// ---------------------------------------------------------------------------
// Threshold event detector
// ---------------------------------------------------------------------------

const DETECTOR_CONDITIONS: [EconomicCondition; 13] = [
    EconomicCondition::HighInflation,
    EconomicCondition::DeflationRisk,
    EconomicCondition::RecessionDeclared,
    EconomicCondition::Boom,
    EconomicCondition::Stagflation,
    EconomicCondition::HighUnemployment,
    EconomicCondition::LabourShortage,
    EconomicCondition::ZeroRates,
    EconomicCondition::RatePressure,
    EconomicCondition::SectorBoom,
    EconomicCondition::SectorDecline,
    EconomicCondition::ConfidenceCollapse,
    EconomicCondition::ConfidenceEuphoria,
];

fn condition_met(condition: EconomicCondition, eco: &Economy) -> bool {
    match condition {
        EconomicCondition::HighInflation => eco.inflation > 5.0,
        EconomicCondition::DeflationRisk => eco.inflation < 0.5,
        EconomicCondition::RecessionDeclared => {
            eco.cycle.phase == CyclePhase::Recession && eco.gdp_growth < 0.0
        }
        EconomicCondition::Boom => eco.gdp_growth > 4.0,
        EconomicCondition::Stagflation => eco.inflation > 4.0 && eco.unemployment > 7.0,
        EconomicCondition::HighUnemployment => eco.unemployment > 9.0,
        EconomicCondition::LabourShortage => eco.unemployment < 3.5,
        EconomicCondition::ZeroRates => eco.interest_rate < 0.5,
        EconomicCondition::RatePressure => eco.inflation > 4.5 && eco.interest_rate < 3.0,
        EconomicCondition::SectorBoom => eco.sectors.iter().any(|s| s.growth > 6.0),
        EconomicCondition::SectorDecline => eco.sectors.iter().any(|s| s.growth < -3.0),
        EconomicCondition::ConfidenceCollapse => eco.confidence < 25.0,
        EconomicCondition::ConfidenceEuphoria => eco.confidence > 85.0,
    }
}

/// Per-condition trial rate once the threshold is met. Independent trials;
/// multiple conditions may fire in the same turn.
fn condition_probability(condition: EconomicCondition) -> f64 {
    match condition {
        EconomicCondition::HighInflation => 0.30,
        EconomicCondition::DeflationRisk => 0.20,
        EconomicCondition::RecessionDeclared => 0.25,
        EconomicCondition::Boom => 0.20,
        EconomicCondition::Stagflation => 0.30,
        EconomicCondition::HighUnemployment => 0.30,
        EconomicCondition::LabourShortage => 0.15,
        EconomicCondition::ZeroRates => 0.15,
        EconomicCondition::RatePressure => 0.20,
        EconomicCondition::SectorBoom => 0.20,
        EconomicCondition::SectorDecline => 0.20,
        EconomicCondition::ConfidenceCollapse => 0.25,
        EconomicCondition::ConfidenceEuphoria => 0.15,
    }
}

fn condition_report(condition: EconomicCondition, eco: &Economy) -> (LogSeverity, String) {
    match condition {
        EconomicCondition::HighInflation => (
            LogSeverity::Warning,
            format!("Inflation running hot at {:.1}%", eco.inflation),
        ),
        EconomicCondition::DeflationRisk => (
            LogSeverity::Warning,
            format!("Prices nearly flat ({:.1}%); deflation risk", eco.inflation),
        ),
        EconomicCondition::RecessionDeclared => (
            LogSeverity::Critical,
            format!("Economy contracting at {:.1}%", eco.gdp_growth),
        ),
        EconomicCondition::Boom => (
            LogSeverity::Notice,
            format!("Growth surging at {:.1}%", eco.gdp_growth),
        ),
        EconomicCondition::Stagflation => (
            LogSeverity::Critical,
            "Stagflation: high inflation with high unemployment".to_string(),
        ),
        EconomicCondition::HighUnemployment => (
            LogSeverity::Warning,
            format!("Unemployment at {:.1}%", eco.unemployment),
        ),
        EconomicCondition::LabourShortage => (
            LogSeverity::Notice,
            "Employers report widespread labour shortages".to_string(),
        ),
        EconomicCondition::ZeroRates => (
            LogSeverity::Notice,
            "Interest rates at the zero lower bound".to_string(),
        ),
        EconomicCondition::RatePressure => (
            LogSeverity::Warning,
            "Markets expect the central bank to raise rates".to_string(),
        ),
        EconomicCondition::SectorBoom => {
            let sector = eco
                .sectors
                .iter()
                .max_by(|a, b| a.growth.total_cmp(&b.growth))
                .map(|s| s.kind.label())
                .unwrap_or("a sector");
            (LogSeverity::Notice, format!("Boom in {sector}"))
        }
        EconomicCondition::SectorDecline => {
            let sector = eco
                .sectors
                .iter()
                .min_by(|a, b| a.growth.total_cmp(&b.growth))
                .map(|s| s.kind.label())
                .unwrap_or("a sector");
            (LogSeverity::Warning, format!("Sharp decline in {sector}"))
        }
        EconomicCondition::ConfidenceCollapse => (
            LogSeverity::Critical,
            format!("Confidence collapsed to {:.0}", eco.confidence),
        ),
        EconomicCondition::ConfidenceEuphoria => (
            LogSeverity::Notice,
            format!("Confidence euphoric at {:.0}", eco.confidence),
        ),
    }
}

fn run_event_detector(ctx: &mut TurnContext) {
    for &condition in &DETECTOR_CONDITIONS {
        if !condition_met(condition, &ctx.state.economy) {
            continue;
        }
        if ctx.rng.random_range(0.0..1.0) >= condition_probability(condition) {
            continue;
        }
        let (severity, message) = condition_report(condition, &ctx.state.economy);
        let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
        ctx.state.log.record(week, year, severity, message.clone());
        ctx.outbox.push(GameEvent::EconomicEvent {
            condition,
            message,
            severity,
        });
    }
}

fn maybe_random_shock(ctx: &mut TurnContext) {
    if ctx.rng.random_range(0.0..1.0) >= RANDOM_SHOCK_CHANCE {
        return;
    }
    let kind = ShockKind::ALL[ctx.rng.random_range(0..ShockKind::ALL.len())];
    let magnitude = ctx
        .rng
        .random_range(RANDOM_SHOCK_MIN_MAGNITUDE..RANDOM_SHOCK_MAX_MAGNITUDE);
    apply_shock(ctx.state, Shock { kind, magnitude });
    ctx.outbox.push(GameEvent::ShockApplied { kind, magnitude });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameState;
    use crate::testutil;

    #[test]
    fn phase_transitions_are_deterministic_given_inputs() {
        let mut eco = Economy::default();
        eco.cycle.phase = CyclePhase::Expansion;
        eco.cycle.weeks_in_phase = 10;
        eco.inflation = 2.0;
        assert_eq!(next_phase(&eco), None);

        eco.inflation = 4.6;
        assert_eq!(next_phase(&eco), Some(CyclePhase::Peak));

        eco.cycle.phase = CyclePhase::Peak;
        eco.cycle.weeks_in_phase = 9;
        assert_eq!(next_phase(&eco), Some(CyclePhase::Recession));

        eco.cycle.phase = CyclePhase::Recession;
        eco.cycle.weeks_in_phase = 1;
        eco.gdp_growth = 0.5;
        assert_eq!(next_phase(&eco), Some(CyclePhase::Trough));

        eco.cycle.phase = CyclePhase::Trough;
        eco.gdp_growth = -1.0;
        eco.cycle.weeks_in_phase = 13;
        assert_eq!(next_phase(&eco), Some(CyclePhase::Expansion));
    }

    #[test]
    fn financial_crisis_shock_forces_recession_immediately() {
        let mut state = GameState::default();
        assert_eq!(state.economy.cycle.phase, CyclePhase::Expansion);
        apply_shock(
            &mut state,
            Shock {
                kind: ShockKind::FinancialCrisis,
                magnitude: 1.5,
            },
        );
        assert_eq!(state.economy.cycle.phase, CyclePhase::Recession);
        assert_eq!(state.economy.cycle.weeks_in_phase, 0);
    }

    #[test]
    fn policy_with_duration_two_expires_after_two_turns() {
        let mut state = GameState::default();
        let mut engine = EconomyEngine;
        let intent = GameEvent::PolicyImplemented {
            kind: PolicyKind::FiscalStimulus,
            magnitude: 1.0,
            duration_weeks: 2,
        };
        testutil::send_intent(&mut state, &mut engine, &intent, 1);
        assert_eq!(state.economy.active_policies.len(), 1);

        testutil::tick_engine(&mut state, &mut engine, 2);
        assert_eq!(state.economy.active_policies.len(), 1, "alive after 1 turn");

        testutil::tick_engine(&mut state, &mut engine, 3);
        testutil::tick_engine(&mut state, &mut engine, 4);
        assert!(state.economy.active_policies.is_empty(), "gone after 3 turns");
    }

    #[test]
    fn a_tick_recomputes_the_core_metrics() {
        let mut state = GameState::default();
        let mut engine = EconomyEngine;
        let before = (
            state.economy.gdp_growth,
            state.economy.unemployment,
            state.economy.inflation,
        );
        let events = testutil::tick_engine(&mut state, &mut engine, 42);
        let update = events
            .iter()
            .find_map(|e| match e {
                GameEvent::EconomicUpdate {
                    gdp_growth,
                    unemployment,
                    inflation,
                    ..
                } => Some((*gdp_growth, *unemployment, *inflation)),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            update,
            (
                state.economy.gdp_growth,
                state.economy.unemployment,
                state.economy.inflation
            )
        );
        assert_ne!(update, before, "all three metrics should move");
    }

    #[test]
    fn metrics_stay_in_bounds_over_many_turns() {
        let mut state = GameState::default();
        let mut engine = EconomyEngine;
        for seed in 0..200 {
            testutil::tick_engine(&mut state, &mut engine, seed);
            let eco = &state.economy;
            assert!((3.0..=12.0).contains(&eco.unemployment), "{}", eco.unemployment);
            assert!((0.0..=100.0).contains(&eco.confidence), "{}", eco.confidence);
            assert!((-2.0..=15.0).contains(&eco.inflation), "{}", eco.inflation);
        }
    }

    #[test]
    fn rate_cut_is_instantaneous() {
        let mut state = GameState::default();
        let mut engine = EconomyEngine;
        let before = state.economy.interest_rate;
        let intent = GameEvent::PolicyImplemented {
            kind: PolicyKind::RateCut,
            magnitude: 0.5,
            duration_weeks: 1,
        };
        testutil::send_intent(&mut state, &mut engine, &intent, 1);
        assert!((state.economy.interest_rate - (before - 0.5)).abs() < 1e-9);
    }

    #[test]
    fn stagflation_condition_requires_both_thresholds() {
        let mut eco = Economy::default();
        eco.inflation = 4.5;
        eco.unemployment = 6.0;
        assert!(!condition_met(EconomicCondition::Stagflation, &eco));
        eco.unemployment = 7.5;
        assert!(condition_met(EconomicCondition::Stagflation, &eco));
    }
}
