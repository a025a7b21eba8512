use serde::{Deserialize, Serialize};

/// How the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    /// Approval collapsed below 15.
    ApprovalCollapse,
    /// Unemployment above 15 with growth below -5.
    EconomicRuin,
    /// Two or more concurrent major scandals.
    ScandalOverload,
    /// Lost the scheduled election outright.
    ElectionLost,
    /// Reached year 8 with approval at or above 50.
    TermCompleted,
    /// Sustained approval of 80+ from year 4 on.
    LandslideLegacy,
}

impl EndCondition {
    pub fn is_victory(&self) -> bool {
        matches!(self, EndCondition::TermCompleted | EndCondition::LandslideLegacy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// 26 consecutive weeks with approval >= 60.
    SteadyHand,
    /// Resolve 5 crises.
    CrisisManager,
    /// 12 consecutive weeks with GDP growth >= 4.
    EconomicMiracle,
    /// Unemployment below 4 at any point.
    FullEmployment,
    /// Sign 3 trade agreements.
    Diplomat,
    /// 104 weeks in office.
    Survivor,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 6] = [
        AchievementKind::SteadyHand,
        AchievementKind::CrisisManager,
        AchievementKind::EconomicMiracle,
        AchievementKind::FullEmployment,
        AchievementKind::Diplomat,
        AchievementKind::Survivor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AchievementKind::SteadyHand => "Steady Hand",
            AchievementKind::CrisisManager => "Crisis Manager",
            AchievementKind::EconomicMiracle => "Economic Miracle",
            AchievementKind::FullEmployment => "Full Employment",
            AchievementKind::Diplomat => "Diplomat",
            AchievementKind::Survivor => "Survivor",
        }
    }
}

/// Per-achievement progress, explicit per type and initialized at
/// construction rather than lazily on first check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementProgress {
    /// Consecutive weeks a threshold has held; resets on a miss.
    ConsecutiveWeeks { weeks: u32 },
    /// Monotone counter of qualifying occurrences.
    Count { count: u32 },
    /// One-shot predicate.
    Reached { reached: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub kind: AchievementKind,
    pub progress: AchievementProgress,
    pub unlocked: bool,
}

impl Achievement {
    fn new(kind: AchievementKind) -> Self {
        let progress = match kind {
            AchievementKind::SteadyHand | AchievementKind::EconomicMiracle => {
                AchievementProgress::ConsecutiveWeeks { weeks: 0 }
            }
            AchievementKind::CrisisManager
            | AchievementKind::Diplomat
            | AchievementKind::Survivor => AchievementProgress::Count { count: 0 },
            AchievementKind::FullEmployment => AchievementProgress::Reached { reached: false },
        };
        Self {
            kind,
            progress,
            unlocked: false,
        }
    }
}

pub fn initial_achievements() -> Vec<Achievement> {
    AchievementKind::ALL.iter().map(|&k| Achievement::new(k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_achievements_initialized_with_progress() {
        let achievements = initial_achievements();
        assert_eq!(achievements.len(), AchievementKind::ALL.len());
        assert!(achievements.iter().all(|a| !a.unlocked));
        assert!(matches!(
            achievements[0].progress,
            AchievementProgress::ConsecutiveWeeks { weeks: 0 }
        ));
    }
}
