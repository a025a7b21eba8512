use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::bus::{EventBus, GameEvent, HandlerResult, Subscription, Topic};
use crate::model::{
    CrisisResponseKind, DebateResponseKind, GameState, PolicyKind, ShockKind,
};
use crate::save::{SaveError, SaveStore, SaveSummary};
use crate::sim::{RunState, Scheduler};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub country: String,
    pub start_year: i32,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub turn_interval_ms: u64,
    pub autosave: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            country: "Arcadia".to_string(),
            start_year: 2026,
            seed: None,
            turn_interval_ms: 1_000,
            autosave: true,
        }
    }
}

/// Facade tying the bus, the scheduler, and a save store into one playable
/// session. Consumers observe through bus subscriptions and act through the
/// intent methods; they never touch [`GameState`] directly.
pub struct GameSession {
    bus: Rc<EventBus>,
    scheduler: Scheduler,
    store: Rc<RefCell<dyn SaveStore>>,
    subscriptions: Vec<Subscription>,
}

impl GameSession {
    pub fn new(config: SessionConfig, store: Rc<RefCell<dyn SaveStore>>) -> Self {
        let bus = EventBus::new();
        let rng: Box<dyn rand::RngCore> = match config.seed {
            Some(seed) => Box::new(SmallRng::seed_from_u64(seed)),
            None => Box::new(SmallRng::from_os_rng()),
        };
        let state = GameState::new(config.country.clone(), config.start_year);
        let mut scheduler = Scheduler::new(state, rng, bus.clone());
        scheduler.set_turn_interval_ms(config.turn_interval_ms);
        if config.autosave {
            let autosave_store = store.clone();
            scheduler.set_autosave(Box::new(move |state| {
                autosave_store.borrow_mut().autosave(state)
            }));
        }
        Self {
            bus,
            scheduler,
            store,
            subscriptions: Vec::new(),
        }
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn state(&self) -> &GameState {
        self.scheduler.state()
    }

    pub fn run_state(&self) -> RunState {
        self.scheduler.run_state()
    }

    /// Subscribe a handler whose lifetime is tied to the session.
    pub fn observe<F>(&mut self, topic: Topic, handler: F)
    where
        F: FnMut(&GameEvent) -> HandlerResult + 'static,
    {
        let subscription = self.bus.subscribe(topic, handler);
        self.subscriptions.push(subscription);
    }

    // -- Turn control --

    pub fn advance_turn(&mut self) {
        self.scheduler.advance_turn();
    }

    pub fn advance_turns(&mut self, count: u32) {
        self.scheduler.advance_turns(count);
    }

    pub fn start(&mut self, now: Instant) {
        self.scheduler.start(now);
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        self.scheduler.poll(now)
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume(&mut self, now: Instant) {
        self.scheduler.resume(now);
    }

    // -- Intents --

    pub fn apply_policy(&mut self, kind: PolicyKind, magnitude: f64, duration_weeks: u32) {
        self.scheduler.submit(GameEvent::PolicyImplemented {
            kind,
            magnitude,
            duration_weeks,
        });
    }

    pub fn apply_shock(&mut self, kind: ShockKind, magnitude: f64) {
        self.scheduler
            .submit(GameEvent::ShockRequested { kind, magnitude });
    }

    pub fn respond_to_event(&mut self, event_id: u64, option: u8) {
        self.scheduler
            .submit(GameEvent::PoliticalEventResponse { event_id, option });
    }

    pub fn respond_to_crisis(&mut self, crisis_id: u64, response: CrisisResponseKind) {
        self.scheduler
            .submit(GameEvent::CrisisRespond {
                crisis_id,
                response,
            });
    }

    pub fn respond_to_debate(&mut self, debate_id: u64, response: DebateResponseKind) {
        self.scheduler
            .submit(GameEvent::DebateResponse {
                debate_id,
                response,
            });
    }

    pub fn negotiate_agreement(&mut self, country: &str) {
        self.scheduler.submit(GameEvent::NegotiateAgreement {
            country: country.to_string(),
        });
    }

    // -- Persistence --

    pub fn save(&self, name: &str) -> Result<(), SaveError> {
        self.store.borrow_mut().save(name, self.scheduler.state())
    }

    /// Replace the live state with a saved one. Playback stops; resume or
    /// advance explicitly to continue.
    pub fn load(&mut self, name: &str) -> Result<(), SaveError> {
        let state = self.store.borrow().load(name)?;
        self.scheduler.replace_state(state);
        Ok(())
    }

    pub fn list_saves(&self) -> Result<Vec<SaveSummary>, SaveError> {
        self.store.borrow().list()
    }

    pub fn delete_save(&mut self, name: &str) -> Result<(), SaveError> {
        self.store.borrow_mut().delete(name)
    }

    pub fn export_save(&self, name: &str) -> Result<String, SaveError> {
        self.store.borrow().export(name)
    }

    pub fn import_save(&mut self, name: &str, payload: &str) -> Result<(), SaveError> {
        self.store.borrow_mut().import(name, payload)
    }

    /// Stop playback and release all session-owned subscriptions.
    pub fn dispose(mut self) {
        self.scheduler.stop();
        self.subscriptions.clear();
    }
}
