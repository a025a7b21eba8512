use super::context::TurnContext;
use super::engine::Engine;
use crate::bus::GameEvent;
use crate::model::{
    AchievementKind, AchievementProgress, CrisisCategory, ElectionOutcome, EndCondition,
    LogSeverity,
};

// --- Loss thresholds ---
const COLLAPSE_APPROVAL: f64 = 15.0;
const RUIN_UNEMPLOYMENT: f64 = 15.0;
const RUIN_GROWTH: f64 = -5.0;
const MAJOR_SCANDAL_SEVERITY: f64 = 60.0;
const SCANDAL_OVERLOAD_COUNT: usize = 2;

// --- Victory thresholds ---
const TERM_COMPLETE_YEAR: u32 = 8;
const TERM_COMPLETE_APPROVAL: f64 = 50.0;
const LANDSLIDE_APPROVAL: f64 = 80.0;
const LANDSLIDE_WEEKS: u32 = 12;
const LANDSLIDE_MIN_YEAR: u32 = 4;

// --- Achievement thresholds ---
const STEADY_HAND_APPROVAL: f64 = 60.0;
const STEADY_HAND_WEEKS: u32 = 26;
const CRISIS_MANAGER_COUNT: u32 = 5;
const MIRACLE_GROWTH: f64 = 4.0;
const MIRACLE_WEEKS: u32 = 12;
const FULL_EMPLOYMENT_BELOW: f64 = 4.0;
const DIPLOMAT_COUNT: u32 = 3;
const SURVIVOR_WEEKS: u32 = 104;

/// Checks end conditions and achievement progress. Runs last so it sees the
/// turn's final state; losses are checked before victories.
#[derive(Default)]
pub struct OutcomeEngine {
    /// Approval-streak toward LandslideLegacy. Engine-local; a loaded game
    /// restarts the streak.
    landslide_weeks: u32,
}

impl Engine for OutcomeEngine {
    fn name(&self) -> &str {
        "outcome"
    }

    fn on_turn(&mut self, ctx: &mut TurnContext) {
        if ctx.state.game_over() {
            return;
        }
        update_achievements(ctx);
        if let Some(condition) = self.end_condition(ctx) {
            declare_end(ctx, condition);
        }
    }

    fn react(&mut self, ctx: &mut TurnContext) {
        for event in ctx.inbox.to_vec() {
            match event {
                GameEvent::CrisisResolved { .. } => {
                    bump_count(ctx, AchievementKind::CrisisManager, CRISIS_MANAGER_COUNT);
                }
                GameEvent::AgreementSigned { .. } => {
                    bump_count(ctx, AchievementKind::Diplomat, DIPLOMAT_COUNT);
                }
                // A lost election ends the game even mid-turn.
                GameEvent::ElectionHeld {
                    outcome: ElectionOutcome::Defeat,
                    ..
                } if !ctx.state.game_over() => {
                    declare_end(ctx, EndCondition::ElectionLost);
                }
                _ => {}
            }
        }
    }
}

impl OutcomeEngine {
    fn end_condition(&mut self, ctx: &mut TurnContext) -> Option<EndCondition> {
        let state = &ctx.state;

        // Losses first.
        if state.politics.approval < COLLAPSE_APPROVAL {
            return Some(EndCondition::ApprovalCollapse);
        }
        if state.economy.unemployment > RUIN_UNEMPLOYMENT
            && state.economy.gdp_growth < RUIN_GROWTH
        {
            return Some(EndCondition::EconomicRuin);
        }
        if state
            .crises
            .major_in_category(CrisisCategory::Scandal, MAJOR_SCANDAL_SEVERITY)
            >= SCANDAL_OVERLOAD_COUNT
        {
            return Some(EndCondition::ScandalOverload);
        }
        if state.politics.last_election == Some(ElectionOutcome::Defeat) {
            return Some(EndCondition::ElectionLost);
        }

        // Victories.
        if state.politics.approval >= LANDSLIDE_APPROVAL {
            self.landslide_weeks += 1;
        } else {
            self.landslide_weeks = 0;
        }
        if state.clock.year >= LANDSLIDE_MIN_YEAR && self.landslide_weeks >= LANDSLIDE_WEEKS {
            return Some(EndCondition::LandslideLegacy);
        }
        if state.clock.year >= TERM_COMPLETE_YEAR
            && state.politics.approval >= TERM_COMPLETE_APPROVAL
        {
            return Some(EndCondition::TermCompleted);
        }
        None
    }
}

fn declare_end(ctx: &mut TurnContext, condition: EndCondition) {
    ctx.state.ended = Some(condition);
    let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
    let severity = if condition.is_victory() {
        LogSeverity::Notice
    } else {
        LogSeverity::Critical
    };
    ctx.state
        .log
        .record(week, year, severity, format!("Game over: {condition:?}"));
    ctx.outbox.push(GameEvent::GameEnd { condition });
}

fn update_achievements(ctx: &mut TurnContext) {
    let approval = ctx.state.politics.approval;
    let gdp = ctx.state.economy.gdp_growth;
    let unemployment = ctx.state.economy.unemployment;
    let weeks_in_office = ctx.state.clock.absolute_week();

    let mut unlocked = Vec::new();
    for achievement in &mut ctx.state.achievements {
        if achievement.unlocked {
            continue;
        }
        match (&achievement.kind, &mut achievement.progress) {
            (AchievementKind::SteadyHand, AchievementProgress::ConsecutiveWeeks { weeks }) => {
                *weeks = if approval >= STEADY_HAND_APPROVAL {
                    *weeks + 1
                } else {
                    0
                };
                if *weeks >= STEADY_HAND_WEEKS {
                    achievement.unlocked = true;
                }
            }
            (AchievementKind::EconomicMiracle, AchievementProgress::ConsecutiveWeeks { weeks }) => {
                *weeks = if gdp >= MIRACLE_GROWTH { *weeks + 1 } else { 0 };
                if *weeks >= MIRACLE_WEEKS {
                    achievement.unlocked = true;
                }
            }
            (AchievementKind::FullEmployment, AchievementProgress::Reached { reached }) => {
                if unemployment < FULL_EMPLOYMENT_BELOW {
                    *reached = true;
                    achievement.unlocked = true;
                }
            }
            (AchievementKind::Survivor, AchievementProgress::Count { count }) => {
                *count = weeks_in_office;
                if *count >= SURVIVOR_WEEKS {
                    achievement.unlocked = true;
                }
            }
            // Counter achievements advance from events in `react`.
            _ => {}
        }
        if achievement.unlocked {
            unlocked.push(achievement.kind);
        }
    }
    announce_unlocked(ctx, unlocked);
}

/// Advance a count-based achievement by one occurrence.
fn bump_count(ctx: &mut TurnContext, kind: AchievementKind, target: u32) {
    let mut unlocked = Vec::new();
    if let Some(achievement) = ctx
        .state
        .achievements
        .iter_mut()
        .find(|a| a.kind == kind && !a.unlocked)
        && let AchievementProgress::Count { count } = &mut achievement.progress
    {
        *count += 1;
        if *count >= target {
            achievement.unlocked = true;
            unlocked.push(kind);
        }
    }
    announce_unlocked(ctx, unlocked);
}

fn announce_unlocked(ctx: &mut TurnContext, unlocked: Vec<AchievementKind>) {
    for kind in unlocked {
        let (week, year) = (ctx.state.clock.week, ctx.state.clock.year);
        ctx.state.log.record(
            week,
            year,
            LogSeverity::Notice,
            format!("Achievement unlocked: {}", kind.label()),
        );
        ctx.outbox.push(GameEvent::AchievementUnlocked { kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameState;
    use crate::testutil;

    fn tick(state: &mut GameState, engine: &mut OutcomeEngine) -> Vec<GameEvent> {
        testutil::tick_engine(state, engine, 1)
    }

    #[test]
    fn approval_collapse_ends_the_game() {
        let mut state = GameState::default();
        state.politics.approval = 10.0;
        let mut engine = OutcomeEngine::default();
        let events = tick(&mut state, &mut engine);
        assert_eq!(state.ended, Some(EndCondition::ApprovalCollapse));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::GameEnd {
                condition: EndCondition::ApprovalCollapse
            }
        )));
    }

    #[test]
    fn economic_ruin_needs_both_legs() {
        let mut state = GameState::default();
        state.economy.unemployment = 12.0;
        state.economy.gdp_growth = -8.0;
        let mut engine = OutcomeEngine::default();
        tick(&mut state, &mut engine);
        assert_eq!(state.ended, None, "unemployment alone is survivable");

        // set_unemployment clamps at 12, so write the field directly.
        state.economy.unemployment = 15.5;
        tick(&mut state, &mut engine);
        assert_eq!(state.ended, Some(EndCondition::EconomicRuin));
    }

    #[test]
    fn end_is_declared_once() {
        let mut state = GameState::default();
        state.politics.approval = 5.0;
        let mut engine = OutcomeEngine::default();
        assert!(!tick(&mut state, &mut engine).is_empty());
        assert!(tick(&mut state, &mut engine).is_empty());
    }

    #[test]
    fn term_completion_requires_majority_approval() {
        let mut state = GameState::default();
        state.clock.year = 9;
        state.politics.approval = 45.0;
        let mut engine = OutcomeEngine::default();
        tick(&mut state, &mut engine);
        assert_eq!(state.ended, None);

        state.politics.approval = 55.0;
        tick(&mut state, &mut engine);
        assert_eq!(state.ended, Some(EndCondition::TermCompleted));
    }

    #[test]
    fn term_completes_at_the_start_of_year_eight() {
        let mut state = GameState::default();
        state.clock.year = TERM_COMPLETE_YEAR;
        state.clock.week = 1;
        state.politics.approval = 60.0;
        let mut engine = OutcomeEngine::default();
        tick(&mut state, &mut engine);
        assert_eq!(state.ended, Some(EndCondition::TermCompleted));
    }

    #[test]
    fn landslide_streak_counts_from_year_four() {
        let mut state = GameState::default();
        state.clock.year = LANDSLIDE_MIN_YEAR;
        state.politics.approval = 85.0;
        let mut engine = OutcomeEngine::default();
        for _ in 0..LANDSLIDE_WEEKS - 1 {
            tick(&mut state, &mut engine);
            assert_eq!(state.ended, None);
        }
        tick(&mut state, &mut engine);
        assert_eq!(state.ended, Some(EndCondition::LandslideLegacy));
    }

    #[test]
    fn landslide_needs_a_sustained_streak() {
        let mut state = GameState::default();
        state.clock.year = 5;
        state.politics.approval = 85.0;
        let mut engine = OutcomeEngine::default();
        for _ in 0..LANDSLIDE_WEEKS - 1 {
            tick(&mut state, &mut engine);
            assert_eq!(state.ended, None);
        }
        tick(&mut state, &mut engine);
        assert_eq!(state.ended, Some(EndCondition::LandslideLegacy));
    }

    #[test]
    fn survivor_unlocks_after_two_years() {
        let mut state = GameState::default();
        state.clock.year = 3;
        state.clock.week = 1;
        let mut engine = OutcomeEngine::default();
        let events = tick(&mut state, &mut engine);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::AchievementUnlocked {
                kind: AchievementKind::Survivor
            }
        )));
        assert!(
            state
                .achievements
                .iter()
                .find(|a| a.kind == AchievementKind::Survivor)
                .is_some_and(|a| a.unlocked)
        );
    }

    #[test]
    fn crisis_manager_counts_resolutions() {
        let mut state = GameState::default();
        let mut engine = OutcomeEngine::default();
        let inbox = vec![GameEvent::CrisisResolved {
            id: 1,
            kind: crate::model::CrisisKind::MarketCrash,
        }];
        for _ in 0..CRISIS_MANAGER_COUNT {
            testutil::react_engine(&mut state, &mut engine, &inbox, 1);
        }
        assert!(
            state
                .achievements
                .iter()
                .find(|a| a.kind == AchievementKind::CrisisManager)
                .is_some_and(|a| a.unlocked)
        );
    }
}
