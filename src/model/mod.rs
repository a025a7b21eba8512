pub mod clock;
pub mod crisis;
pub mod diplomacy;
pub mod economy;
pub mod log;
pub mod opposition;
pub mod outcome;
pub mod politics;
pub mod state;

pub use clock::{CalendarPoint, Clock, WEEKS_PER_YEAR};
pub use crisis::{
    CRISIS_HISTORY_CAP, Crisis, CrisisBook, CrisisCategory, CrisisDisposition, CrisisKind,
    CrisisRecord, CrisisResponseKind, ResponseRecord, ResponseTier,
};
pub use diplomacy::{Conflict, Diplomacy, Incident, Relation, TradeAgreement};
pub use economy::{
    BusinessCycle, CyclePhase, EconomicCondition, Economy, Policy, PolicyKind, Sector, SectorKind,
    Shock, ShockKind,
};
pub use opposition::{
    Debate, DebateOutcome, DebateResponseKind, OppositionActionKind, OppositionStrategy,
};
pub use log::{DecisionKind, EventLog, LogEntry, LogSeverity, PendingDecision, RECENT_EVENTS_CAP};
pub use outcome::{
    Achievement, AchievementKind, AchievementProgress, EndCondition, initial_achievements,
};
pub use politics::{
    EffectVector, ElectionOutcome, EventOption, Ideology, OppositionParty, PartyBloc, PolicyArea,
    PoliticalEvent, PoliticalEventCategory, Politics, ScheduledVote,
};
pub use state::GameState;
