//! Helpers for exercising a single engine against a seeded random source,
//! outside the full scheduler loop.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::bus::GameEvent;
use crate::model::GameState;
use crate::sim::{Engine, TurnContext};

/// Run one `on_turn` for a single engine with a seeded rng; returns the
/// events the engine emitted.
pub fn tick_engine(
    state: &mut GameState,
    engine: &mut dyn Engine,
    seed: u64,
) -> Vec<GameEvent> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut outbox = Vec::new();
    let mut ctx = TurnContext {
        state,
        rng: &mut rng,
        outbox: &mut outbox,
        inbox: &[],
    };
    engine.on_turn(&mut ctx);
    outbox
}

/// Deliver a phase-2 inbox to a single engine's `react`.
pub fn react_engine(
    state: &mut GameState,
    engine: &mut dyn Engine,
    inbox: &[GameEvent],
    seed: u64,
) -> Vec<GameEvent> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut outbox = Vec::new();
    let mut ctx = TurnContext {
        state,
        rng: &mut rng,
        outbox: &mut outbox,
        inbox,
    };
    engine.react(&mut ctx);
    outbox
}

/// Route one intent to a single engine. Returns whether it was consumed.
pub fn send_intent(
    state: &mut GameState,
    engine: &mut dyn Engine,
    intent: &GameEvent,
    seed: u64,
) -> bool {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut outbox = Vec::new();
    let mut ctx = TurnContext {
        state,
        rng: &mut rng,
        outbox: &mut outbox,
        inbox: &[],
    };
    engine.handle_intent(&mut ctx, intent)
}

/// Like [`send_intent`], but returns the events emitted while handling.
pub fn send_intent_events(
    state: &mut GameState,
    engine: &mut dyn Engine,
    intent: &GameEvent,
    seed: u64,
) -> Vec<GameEvent> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut outbox = Vec::new();
    let mut ctx = TurnContext {
        state,
        rng: &mut rng,
        outbox: &mut outbox,
        inbox: &[],
    };
    engine.handle_intent(&mut ctx, intent);
    outbox
}
