use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::RngCore;

use super::context::TurnContext;
use super::crisis::CrisisEngine;
use super::diplomacy::DiplomacyEngine;
use super::economy::EconomyEngine;
use super::engine::Engine;
use super::opposition::OppositionEngine;
use super::outcome::OutcomeEngine;
use super::politics::PoliticsEngine;
use crate::bus::{EventBus, GameEvent};
use crate::model::GameState;
use crate::save::SaveError;

const MIN_TURN_INTERVAL_MS: u64 = 100;
const MAX_TURN_INTERVAL_MS: u64 = 5_000;
const DEFAULT_TURN_INTERVAL_MS: u64 = 1_000;
const AUTOSAVE_EVERY_WEEKS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Stopped,
}

pub type AutosaveHook = Box<dyn FnMut(&GameState) -> Result<(), SaveError>>;

/// Owns the state, the engines, and the turn loop.
///
/// A turn is: advance the clock, publish `TurnStart`, run every engine's
/// `on_turn` in registration order (phase 1), publish the phase-1 outbox and
/// redeliver it to every engine's `react` (phase 2), publish `TurnEnd`, then
/// drain queued intents. Continuous play is driven by [`Scheduler::poll`];
/// nothing here blocks or spawns threads.
pub struct Scheduler {
    state: GameState,
    engines: Vec<Box<dyn Engine>>,
    rng: Box<dyn RngCore>,
    bus: Rc<EventBus>,
    run_state: RunState,
    turn_interval: Duration,
    next_turn_at: Option<Instant>,
    autosave: Option<AutosaveHook>,
    in_turn: bool,
}

impl Scheduler {
    pub fn new(state: GameState, rng: Box<dyn RngCore>, bus: Rc<EventBus>) -> Self {
        Self::with_engines(state, rng, bus, default_engines())
    }

    pub fn with_engines(
        state: GameState,
        rng: Box<dyn RngCore>,
        bus: Rc<EventBus>,
        engines: Vec<Box<dyn Engine>>,
    ) -> Self {
        Self {
            state,
            engines,
            rng,
            bus,
            run_state: RunState::Idle,
            turn_interval: Duration::from_millis(DEFAULT_TURN_INTERVAL_MS),
            next_turn_at: None,
            autosave: None,
            in_turn: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Replace the live state wholesale, as after loading a save. Playback
    /// stops until resumed.
    pub fn replace_state(&mut self, state: GameState) {
        self.state = state;
        self.run_state = RunState::Idle;
        self.next_turn_at = None;
    }

    pub fn set_autosave(&mut self, hook: AutosaveHook) {
        self.autosave = Some(hook);
    }

    pub fn set_turn_interval_ms(&mut self, ms: u64) {
        let clamped = ms.clamp(MIN_TURN_INTERVAL_MS, MAX_TURN_INTERVAL_MS);
        self.turn_interval = Duration::from_millis(clamped);
    }

    /// Run exactly one turn. A no-op once the game has ended.
    ///
    /// The clock advances before anything is published, so `TurnStart` and
    /// `TurnEnd` both carry the week the turn produces: the first turn of a
    /// fresh game brackets week 2.
    pub fn advance_turn(&mut self) {
        if self.state.game_over() {
            self.run_state = RunState::Stopped;
            return;
        }
        self.in_turn = true;
        self.state.clock.advance();
        let (week, year) = (self.state.clock.week, self.state.clock.year);
        self.bus.publish(&GameEvent::TurnStart { week, year });

        // Phase 1: every engine acts on the pre-turn state.
        let mut outbox = Vec::new();
        for engine in &mut self.engines {
            let mut ctx = TurnContext {
                state: &mut self.state,
                rng: self.rng.as_mut(),
                outbox: &mut outbox,
                inbox: &[],
            };
            engine.on_turn(&mut ctx);
        }
        for event in &outbox {
            self.bus.publish(event);
        }

        // Phase 2: single-pass redelivery. Reactions are published but not
        // redelivered, so reaction chains cannot cascade within a turn.
        if !outbox.is_empty() {
            let mut reactions = Vec::new();
            for engine in &mut self.engines {
                let mut ctx = TurnContext {
                    state: &mut self.state,
                    rng: self.rng.as_mut(),
                    outbox: &mut reactions,
                    inbox: &outbox,
                };
                engine.react(&mut ctx);
            }
            for event in &reactions {
                self.bus.publish(event);
            }
        }

        self.bus.publish(&GameEvent::TurnEnd { week, year });
        self.in_turn = false;

        self.process_intents();
        self.maybe_autosave();
        if self.state.game_over() {
            self.run_state = RunState::Stopped;
            self.next_turn_at = None;
        }
    }

    pub fn advance_turns(&mut self, count: u32) {
        for _ in 0..count {
            if self.state.game_over() {
                break;
            }
            self.advance_turn();
        }
    }

    /// Queue a consumer intent. Processed immediately unless a turn is in
    /// flight, in which case it is handled when the turn completes.
    pub fn submit(&mut self, intent: GameEvent) {
        if !intent.is_intent() {
            tracing::debug!(topic = ?intent.topic(), "ignoring non-intent submission");
            return;
        }
        self.bus.enqueue(intent);
        if !self.in_turn {
            self.process_intents();
        }
    }

    fn process_intents(&mut self) {
        for intent in self.bus.drain() {
            let mut outbox = Vec::new();
            let mut consumed = false;
            for engine in &mut self.engines {
                let mut ctx = TurnContext {
                    state: &mut self.state,
                    rng: self.rng.as_mut(),
                    outbox: &mut outbox,
                    inbox: &[],
                };
                if engine.handle_intent(&mut ctx, &intent) {
                    consumed = true;
                    break;
                }
            }
            if !consumed {
                tracing::debug!(topic = ?intent.topic(), "intent had no handler");
            }
            for event in &outbox {
                self.bus.publish(event);
            }
        }
    }

    fn maybe_autosave(&mut self) {
        if self.state.clock.week % AUTOSAVE_EVERY_WEEKS != 0 {
            return;
        }
        if let Some(hook) = &mut self.autosave
            && let Err(err) = hook(&self.state)
        {
            // Persistence failures never abort the turn.
            tracing::warn!(%err, "autosave failed");
        }
    }

    // -- Continuous play --

    pub fn start(&mut self, now: Instant) {
        if self.run_state == RunState::Stopped {
            return;
        }
        self.run_state = RunState::Running;
        self.next_turn_at = Some(now + self.turn_interval);
    }

    /// Non-blocking pump; call it from the host's own loop. Runs at most one
    /// turn per call, when the deadline has passed. Returns whether a turn
    /// ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.run_state != RunState::Running {
            return false;
        }
        let Some(deadline) = self.next_turn_at else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.advance_turn();
        if self.run_state == RunState::Running {
            self.next_turn_at = Some(now + self.turn_interval);
        }
        true
    }

    /// Idempotent; pausing an idle or stopped scheduler changes nothing.
    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
            self.next_turn_at = None;
        }
    }

    /// Re-arms the timer without replaying turns missed while paused.
    pub fn resume(&mut self, now: Instant) {
        if self.run_state == RunState::Paused {
            self.run_state = RunState::Running;
            self.next_turn_at = Some(now + self.turn_interval);
        }
    }

    pub fn stop(&mut self) {
        self.run_state = RunState::Stopped;
        self.next_turn_at = None;
    }
}

/// Engines in their canonical run order. Outcome runs last so it evaluates
/// the turn's final state.
pub fn default_engines() -> Vec<Box<dyn Engine>> {
    vec![
        Box::new(EconomyEngine),
        Box::new(PoliticsEngine),
        Box::new(CrisisEngine),
        Box::new(OppositionEngine::default()),
        Box::new(DiplomacyEngine),
        Box::new(OutcomeEngine::default()),
    ]
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::bus::Topic;
    use crate::model::PolicyKind;

    fn scheduler_with_seed(seed: u64) -> Scheduler {
        Scheduler::new(
            GameState::default(),
            Box::new(SmallRng::seed_from_u64(seed)),
            EventBus::new(),
        )
    }

    #[test]
    fn a_turn_advances_the_clock_and_brackets_with_start_and_end() {
        let bus = EventBus::new();
        let log: Rc<RefCell<Vec<&str>>> = Rc::new(RefCell::new(Vec::new()));
        let l1 = log.clone();
        let l2 = log.clone();
        let _start = bus.subscribe(Topic::TurnStart, move |_| {
            l1.borrow_mut().push("start");
            Ok(())
        });
        let _end = bus.subscribe(Topic::TurnEnd, move |_| {
            l2.borrow_mut().push("end");
            Ok(())
        });

        let mut scheduler = Scheduler::new(
            GameState::default(),
            Box::new(SmallRng::seed_from_u64(1)),
            bus,
        );
        scheduler.advance_turn();
        assert_eq!(scheduler.state().clock.week, 2);
        assert_eq!(log.borrow().first(), Some(&"start"));
        assert_eq!(log.borrow().last(), Some(&"end"));
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let mut a = scheduler_with_seed(42);
        let mut b = scheduler_with_seed(42);
        a.advance_turns(20);
        b.advance_turns(20);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn submitted_policy_reaches_the_economy() {
        let mut scheduler = scheduler_with_seed(7);
        scheduler.submit(GameEvent::PolicyImplemented {
            kind: PolicyKind::InfrastructureInvestment,
            magnitude: 1.0,
            duration_weeks: 26,
        });
        assert_eq!(scheduler.state().economy.active_policies.len(), 1);
    }

    #[test]
    fn non_intent_submission_is_ignored() {
        let mut scheduler = scheduler_with_seed(7);
        scheduler.submit(GameEvent::TurnStart { week: 1, year: 1 });
        assert_eq!(scheduler.bus.pending(), 0);
    }

    #[test]
    fn poll_respects_the_deadline_and_pause() {
        let mut scheduler = scheduler_with_seed(3);
        scheduler.set_turn_interval_ms(200);
        let t0 = Instant::now();
        scheduler.start(t0);

        assert!(!scheduler.poll(t0 + Duration::from_millis(50)));
        assert!(scheduler.poll(t0 + Duration::from_millis(250)));
        assert_eq!(scheduler.state().clock.week, 2);

        scheduler.pause();
        assert!(!scheduler.poll(t0 + Duration::from_secs(60)));
        scheduler.pause(); // idempotent
        assert_eq!(scheduler.run_state(), RunState::Paused);

        // Resume does not replay missed turns.
        let t1 = t0 + Duration::from_secs(120);
        scheduler.resume(t1);
        assert!(!scheduler.poll(t1 + Duration::from_millis(50)));
        assert!(scheduler.poll(t1 + Duration::from_millis(250)));
        assert_eq!(scheduler.state().clock.week, 3);
    }

    #[test]
    fn turn_interval_is_clamped() {
        let mut scheduler = scheduler_with_seed(3);
        scheduler.set_turn_interval_ms(7);
        assert_eq!(scheduler.turn_interval, Duration::from_millis(100));
        scheduler.set_turn_interval_ms(60_000);
        assert_eq!(scheduler.turn_interval, Duration::from_millis(5_000));
    }

    #[test]
    fn autosave_fires_on_fourth_weeks_and_failure_does_not_abort() {
        let saves = Rc::new(RefCell::new(0u32));
        let counter = saves.clone();
        let mut scheduler = scheduler_with_seed(5);
        scheduler.set_autosave(Box::new(move |_state| {
            *counter.borrow_mut() += 1;
            Err(SaveError::NotFound("disk gone".to_string()))
        }));
        scheduler.advance_turns(8);
        // Weeks 4 and 8 autosave; the failing hook never stops the loop.
        assert_eq!(*saves.borrow(), 2);
        assert_eq!(scheduler.state().clock.week, 9);
    }

    #[test]
    fn scheduler_stops_once_the_game_ends() {
        let mut scheduler = scheduler_with_seed(11);
        let mut state = GameState::default();
        state.politics.approval = 5.0;
        scheduler.replace_state(state);
        scheduler.advance_turn();
        assert!(scheduler.state().game_over());
        assert_eq!(scheduler.run_state(), RunState::Stopped);

        let week = scheduler.state().clock.week;
        scheduler.advance_turn();
        assert_eq!(scheduler.state().clock.week, week, "no further turns run");
    }
}
