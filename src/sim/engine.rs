use super::context::TurnContext;
use crate::bus::GameEvent;

/// A pluggable simulation engine driven by the turn scheduler.
///
/// Dispatch is two-phase and single-pass: every engine's `on_turn` runs in
/// registration order, then — if anything was emitted — every engine's
/// `react` runs with the full phase-1 outbox as `ctx.inbox`. Events emitted
/// during `react` are published but never redelivered, so a reaction cannot
/// trigger further reactions within the same turn.
///
/// Object-safe so engines can be stored as `Box<dyn Engine>`.
pub trait Engine {
    fn name(&self) -> &str;

    fn on_turn(&mut self, ctx: &mut TurnContext);

    /// React to events emitted by other engines during phase 1. Default:
    /// no-op.
    fn react(&mut self, ctx: &mut TurnContext) {
        let _ = ctx;
    }

    /// Handle a consumer intent drained from the deferred queue. Returns
    /// `true` if this engine consumed the intent. Default: not handled.
    fn handle_intent(&mut self, ctx: &mut TurnContext, intent: &GameEvent) -> bool {
        let _ = (ctx, intent);
        false
    }
}
