use rand::RngCore;

use crate::bus::GameEvent;
use crate::model::GameState;

/// Context handed to each engine on every turn.
///
/// Bundled so fields can be added later without touching the `Engine`
/// trait signature. The random source is injected so tests can supply a
/// deterministic sequence.
pub struct TurnContext<'a> {
    pub state: &'a mut GameState,
    pub rng: &'a mut dyn RngCore,
    /// Engines push events here; the scheduler publishes them on the bus
    /// and redelivers them as the phase-2 inbox.
    pub outbox: &'a mut Vec<GameEvent>,
    /// Events emitted by other engines during phase 1 (read-only).
    pub inbox: &'a [GameEvent],
}
