use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    AchievementKind, CrisisKind, CrisisResponseKind, CyclePhase, DebateOutcome, DebateResponseKind,
    EconomicCondition, ElectionOutcome, EndCondition, LogSeverity, OppositionActionKind,
    PolicyKind, PoliticalEventCategory, ResponseTier, ShockKind,
};

/// Everything published on the bus: notifications emitted by the engines and
/// intent events with which consumers request mutations. Consumers never
/// touch `GameState` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    TurnStart {
        week: u32,
        year: u32,
    },
    TurnEnd {
        week: u32,
        year: u32,
    },
    EconomicUpdate {
        gdp_growth: f64,
        unemployment: f64,
        inflation: f64,
        confidence: f64,
        phase: CyclePhase,
    },
    EconomicEvent {
        condition: EconomicCondition,
        message: String,
        severity: LogSeverity,
    },
    ShockApplied {
        kind: ShockKind,
        magnitude: f64,
    },
    ApprovalChange {
        change: f64,
        new_approval: f64,
    },
    PoliticalEventTriggered {
        id: u64,
        category: PoliticalEventCategory,
        title: String,
    },
    PoliticalEventResolved {
        id: u64,
        option: u8,
        title: String,
    },
    VoteHeld {
        topic: String,
        passed: bool,
    },
    ElectionHeld {
        outcome: ElectionOutcome,
        approval: f64,
    },
    CrisisGenerated {
        id: u64,
        kind: CrisisKind,
        severity: f64,
    },
    CrisisResponseImplemented {
        id: u64,
        response: CrisisResponseKind,
        tier: ResponseTier,
    },
    CrisisResolved {
        id: u64,
        kind: CrisisKind,
    },
    CrisisEscalated {
        id: u64,
        spawned_id: u64,
        spawned_kind: CrisisKind,
    },
    OppositionAction {
        party: String,
        action: OppositionActionKind,
        message: String,
    },
    DebateInitiated {
        id: u64,
        topic: String,
        public_interest: f64,
    },
    DebateConcluded {
        id: u64,
        outcome: DebateOutcome,
        approval_impact: f64,
    },
    InternationalUpdate {
        country: String,
        score: f64,
    },
    AgreementSigned {
        country: String,
        duration_weeks: u32,
    },
    AchievementUnlocked {
        kind: AchievementKind,
    },
    GameEnd {
        condition: EndCondition,
    },

    // -- Intent events (consumer -> core) --
    PolicyImplemented {
        kind: PolicyKind,
        magnitude: f64,
        duration_weeks: u32,
    },
    ShockRequested {
        kind: ShockKind,
        magnitude: f64,
    },
    PoliticalEventResponse {
        event_id: u64,
        option: u8,
    },
    CrisisRespond {
        crisis_id: u64,
        response: CrisisResponseKind,
    },
    DebateResponse {
        debate_id: u64,
        response: DebateResponseKind,
    },
    NegotiateAgreement {
        country: String,
    },
}

/// Fieldless discriminant used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    TurnStart,
    TurnEnd,
    EconomicUpdate,
    EconomicEvent,
    ShockApplied,
    ApprovalChange,
    PoliticalEventTriggered,
    PoliticalEventResolved,
    VoteHeld,
    ElectionHeld,
    CrisisGenerated,
    CrisisResponseImplemented,
    CrisisResolved,
    CrisisEscalated,
    OppositionAction,
    DebateInitiated,
    DebateConcluded,
    InternationalUpdate,
    AgreementSigned,
    AchievementUnlocked,
    GameEnd,
    PolicyImplemented,
    ShockRequested,
    PoliticalEventResponse,
    CrisisRespond,
    DebateResponse,
    NegotiateAgreement,
}

impl GameEvent {
    pub fn topic(&self) -> Topic {
        match self {
            GameEvent::TurnStart { .. } => Topic::TurnStart,
            GameEvent::TurnEnd { .. } => Topic::TurnEnd,
            GameEvent::EconomicUpdate { .. } => Topic::EconomicUpdate,
            GameEvent::EconomicEvent { .. } => Topic::EconomicEvent,
            GameEvent::ShockApplied { .. } => Topic::ShockApplied,
            GameEvent::ApprovalChange { .. } => Topic::ApprovalChange,
            GameEvent::PoliticalEventTriggered { .. } => Topic::PoliticalEventTriggered,
            GameEvent::PoliticalEventResolved { .. } => Topic::PoliticalEventResolved,
            GameEvent::VoteHeld { .. } => Topic::VoteHeld,
            GameEvent::ElectionHeld { .. } => Topic::ElectionHeld,
            GameEvent::CrisisGenerated { .. } => Topic::CrisisGenerated,
            GameEvent::CrisisResponseImplemented { .. } => Topic::CrisisResponseImplemented,
            GameEvent::CrisisResolved { .. } => Topic::CrisisResolved,
            GameEvent::CrisisEscalated { .. } => Topic::CrisisEscalated,
            GameEvent::OppositionAction { .. } => Topic::OppositionAction,
            GameEvent::DebateInitiated { .. } => Topic::DebateInitiated,
            GameEvent::DebateConcluded { .. } => Topic::DebateConcluded,
            GameEvent::InternationalUpdate { .. } => Topic::InternationalUpdate,
            GameEvent::AgreementSigned { .. } => Topic::AgreementSigned,
            GameEvent::AchievementUnlocked { .. } => Topic::AchievementUnlocked,
            GameEvent::GameEnd { .. } => Topic::GameEnd,
            GameEvent::PolicyImplemented { .. } => Topic::PolicyImplemented,
            GameEvent::ShockRequested { .. } => Topic::ShockRequested,
            GameEvent::PoliticalEventResponse { .. } => Topic::PoliticalEventResponse,
            GameEvent::CrisisRespond { .. } => Topic::CrisisRespond,
            GameEvent::DebateResponse { .. } => Topic::DebateResponse,
            GameEvent::NegotiateAgreement { .. } => Topic::NegotiateAgreement,
        }
    }

    /// Whether this is a consumer intent rather than an engine notification.
    pub fn is_intent(&self) -> bool {
        matches!(
            self.topic(),
            Topic::PolicyImplemented
                | Topic::ShockRequested
                | Topic::PoliticalEventResponse
                | Topic::CrisisRespond
                | Topic::DebateResponse
                | Topic::NegotiateAgreement
        )
    }
}

/// Error returned by a subscriber. Caught at the bus boundary, logged, and
/// never propagated to remaining subscribers.
#[derive(Debug, Error)]
#[error("listener fault: {0}")]
pub struct ListenerError(pub String);

pub type HandlerResult = Result<(), ListenerError>;

type Handler = Rc<RefCell<dyn FnMut(&GameEvent) -> HandlerResult>>;

#[derive(Clone)]
struct HandlerEntry {
    id: u64,
    handler: Handler,
}

/// Synchronous publish/subscribe hub. Single-threaded by design; dispatch
/// runs over a snapshot of the handler list, so handlers added or removed
/// mid-dispatch do not affect the in-flight dispatch.
pub struct EventBus {
    handlers: RefCell<HashMap<Topic, Vec<HandlerEntry>>>,
    next_id: Cell<u64>,
    deferred: RefCell<VecDeque<GameEvent>>,
}

impl EventBus {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            handlers: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            deferred: RefCell::new(VecDeque::new()),
        })
    }

    /// Register a handler for a topic. The returned handle must be retained;
    /// dropping it unsubscribes.
    pub fn subscribe<F>(self: &Rc<Self>, topic: Topic, handler: F) -> Subscription
    where
        F: FnMut(&GameEvent) -> HandlerResult + 'static,
    {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.handlers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push(HandlerEntry {
                id,
                handler: Rc::new(RefCell::new(handler)),
            });
        Subscription {
            bus: Rc::downgrade(self),
            topic,
            id,
        }
    }

    /// Invoke all current handlers for the event's topic, in subscription
    /// order. A faulting handler is logged and skipped; the rest still run.
    pub fn publish(&self, event: &GameEvent) {
        let snapshot: Vec<HandlerEntry> = self
            .handlers
            .borrow()
            .get(&event.topic())
            .cloned()
            .unwrap_or_default();

        for entry in snapshot {
            match entry.handler.try_borrow_mut() {
                Ok(mut handler) => {
                    if let Err(err) = handler(event) {
                        tracing::warn!(topic = ?event.topic(), %err, "subscriber failed");
                    }
                }
                // A handler publishing an event it is itself subscribed to.
                Err(_) => {
                    tracing::warn!(topic = ?event.topic(), "re-entrant handler skipped");
                }
            }
        }
    }

    /// Buffer an event for deferred, same-thread replay.
    pub fn enqueue(&self, event: GameEvent) {
        self.deferred.borrow_mut().push_back(event);
    }

    /// Take everything currently buffered. Events enqueued while processing
    /// the returned batch land in the next drain.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.deferred.borrow_mut().drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.deferred.borrow().len()
    }

    fn unsubscribe(&self, topic: Topic, id: u64) {
        if let Some(entries) = self.handlers.borrow_mut().get_mut(&topic) {
            entries.retain(|e| e.id != id);
        }
    }
}

/// Handle tying a subscription to its bus. Unsubscribes on drop (or
/// explicitly via [`Subscription::unsubscribe`]).
pub struct Subscription {
    bus: Weak<EventBus>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop impl does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.topic, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn turn_start() -> GameEvent {
        GameEvent::TurnStart { week: 1, year: 1 }
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = log.clone();
        let l2 = log.clone();
        let _a = bus.subscribe(Topic::TurnStart, move |_| {
            l1.borrow_mut().push("a");
            Ok(())
        });
        let _b = bus.subscribe(Topic::TurnStart, move |_| {
            l2.borrow_mut().push("b");
            Ok(())
        });
        bus.publish(&turn_start());
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = bus.subscribe(Topic::TurnStart, move |_| {
            c.set(c.get() + 1);
            Ok(())
        });
        bus.publish(&turn_start());
        sub.unsubscribe();
        bus.publish(&turn_start());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn faulting_handler_does_not_stop_dispatch() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let _bad = bus.subscribe(Topic::TurnStart, |_| {
            Err(ListenerError("boom".to_string()))
        });
        let _good = bus.subscribe(Topic::TurnStart, move |_| {
            c.set(c.get() + 1);
            Ok(())
        });
        bus.publish(&turn_start());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscribe_during_dispatch_does_not_affect_in_flight_dispatch() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let late_holder: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let bus2 = bus.clone();
        let holder = late_holder.clone();
        let c = count.clone();
        let _sub = bus.subscribe(Topic::TurnStart, move |_| {
            let c2 = c.clone();
            let late = bus2.subscribe(Topic::TurnStart, move |_| {
                c2.set(c2.get() + 1);
                Ok(())
            });
            holder.borrow_mut().push(late);
            Ok(())
        });

        bus.publish(&turn_start());
        // The late handler was added mid-dispatch and must not have run.
        assert_eq!(count.get(), 0);
        bus.publish(&turn_start());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn deferred_queue_drains_once() {
        let bus = EventBus::new();
        bus.enqueue(turn_start());
        bus.enqueue(GameEvent::TurnEnd { week: 1, year: 1 });
        assert_eq!(bus.pending(), 2);
        assert_eq!(bus.drain().len(), 2);
        assert!(bus.drain().is_empty());
    }
}
