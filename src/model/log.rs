use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Most recent events kept for display.
pub const RECENT_EVENTS_CAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSeverity {
    Info,
    Notice,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub week: u32,
    pub year: u32,
    pub severity: LogSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    PoliticalEvent,
    Debate,
}

/// Something awaiting a player choice, queued for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub id: u64,
    pub kind: DecisionKind,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub recent: VecDeque<LogEntry>,
    pub pending_decisions: VecDeque<PendingDecision>,
}

impl EventLog {
    pub fn record(&mut self, week: u32, year: u32, severity: LogSeverity, message: impl Into<String>) {
        self.recent.push_back(LogEntry {
            week,
            year,
            severity,
            message: message.into(),
        });
        while self.recent.len() > RECENT_EVENTS_CAP {
            self.recent.pop_front();
        }
    }

    pub fn push_decision(&mut self, decision: PendingDecision) {
        self.pending_decisions.push_back(decision);
    }

    /// Remove a pending decision by id and kind. Returns `None` when the
    /// reference is stale (already resolved or never existed).
    pub fn take_decision(&mut self, id: u64, kind: DecisionKind) -> Option<PendingDecision> {
        let idx = self
            .pending_decisions
            .iter()
            .position(|d| d.id == id && d.kind == kind)?;
        self.pending_decisions.remove(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_log_is_bounded() {
        let mut log = EventLog::default();
        for i in 0..25 {
            log.record(1, 1, LogSeverity::Info, format!("event {i}"));
        }
        assert_eq!(log.recent.len(), RECENT_EVENTS_CAP);
        assert_eq!(log.recent.front().unwrap().message, "event 15");
    }

    #[test]
    fn stale_decision_reference_is_a_noop() {
        let mut log = EventLog::default();
        log.push_decision(PendingDecision {
            id: 7,
            kind: DecisionKind::Debate,
            summary: "debate".to_string(),
        });
        assert!(log.take_decision(7, DecisionKind::PoliticalEvent).is_none());
        assert!(log.take_decision(7, DecisionKind::Debate).is_some());
        assert!(log.take_decision(7, DecisionKind::Debate).is_none());
    }
}
