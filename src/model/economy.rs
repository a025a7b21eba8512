use serde::{Deserialize, Serialize};

/// Four-phase macro state machine modulating sector and metric growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Expansion,
    Peak,
    Recession,
    Trough,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessCycle {
    pub phase: CyclePhase,
    /// Weeks spent in the current phase.
    pub weeks_in_phase: u32,
    /// How pronounced the phase is, 0.0..=1.0.
    pub intensity: f64,
}

impl BusinessCycle {
    pub fn transition(&mut self, next: CyclePhase, intensity: f64) {
        self.phase = next;
        self.weeks_in_phase = 0;
        self.intensity = intensity.clamp(0.0, 1.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorKind {
    Manufacturing,
    Services,
    Agriculture,
    Technology,
    Finance,
}

impl SectorKind {
    pub const ALL: [SectorKind; 5] = [
        SectorKind::Manufacturing,
        SectorKind::Services,
        SectorKind::Agriculture,
        SectorKind::Technology,
        SectorKind::Finance,
    ];

    /// Long-run trend growth for the sector, % per year.
    pub fn base_growth(&self) -> f64 {
        match self {
            SectorKind::Manufacturing => 1.8,
            SectorKind::Services => 2.4,
            SectorKind::Agriculture => 1.0,
            SectorKind::Technology => 4.2,
            SectorKind::Finance => 2.8,
        }
    }

    /// Default share of GDP. Shares across `ALL` sum to 1.0.
    pub fn default_share(&self) -> f64 {
        match self {
            SectorKind::Manufacturing => 0.22,
            SectorKind::Services => 0.41,
            SectorKind::Agriculture => 0.06,
            SectorKind::Technology => 0.13,
            SectorKind::Finance => 0.18,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectorKind::Manufacturing => "manufacturing",
            SectorKind::Services => "services",
            SectorKind::Agriculture => "agriculture",
            SectorKind::Technology => "technology",
            SectorKind::Finance => "finance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub kind: SectorKind,
    /// Share of GDP, 0.0..=1.0.
    pub share: f64,
    /// Current annualized growth rate, %.
    pub growth: f64,
}

/// A timed modifier applied to economic metrics, either instantaneous on
/// application or decaying over `duration_weeks`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub kind: PolicyKind,
    pub magnitude: f64,
    pub duration_weeks: u32,
    pub weeks_elapsed: u32,
}

impl Policy {
    pub fn new(kind: PolicyKind, magnitude: f64, duration_weeks: u32) -> Self {
        Self {
            kind,
            magnitude,
            duration_weeks,
            weeks_elapsed: 0,
        }
    }

    pub fn expired(&self) -> bool {
        self.weeks_elapsed >= self.duration_weeks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    FiscalStimulus,
    TaxCut,
    TaxRise,
    RateCut,
    RateHike,
    InfrastructureInvestment,
    AusterityPackage,
}

impl PolicyKind {
    pub fn label(&self) -> &'static str {
        match self {
            PolicyKind::FiscalStimulus => "fiscal stimulus",
            PolicyKind::TaxCut => "tax cut",
            PolicyKind::TaxRise => "tax rise",
            PolicyKind::RateCut => "rate cut",
            PolicyKind::RateHike => "rate hike",
            PolicyKind::InfrastructureInvestment => "infrastructure investment",
            PolicyKind::AusterityPackage => "austerity package",
        }
    }
}

/// An instantaneous, type-keyed economic perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shock {
    pub kind: ShockKind,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockKind {
    FinancialCrisis,
    OilPriceSpike,
    TradeCollapse,
    TechBoom,
    CurrencyRun,
}

impl ShockKind {
    pub const ALL: [ShockKind; 5] = [
        ShockKind::FinancialCrisis,
        ShockKind::OilPriceSpike,
        ShockKind::TradeCollapse,
        ShockKind::TechBoom,
        ShockKind::CurrencyRun,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShockKind::FinancialCrisis => "financial crisis",
            ShockKind::OilPriceSpike => "oil price spike",
            ShockKind::TradeCollapse => "trade collapse",
            ShockKind::TechBoom => "tech boom",
            ShockKind::CurrencyRun => "currency run",
        }
    }
}

/// Named threshold conditions the economic event detector watches. Each is
/// an independent Bernoulli trial once its threshold is met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicCondition {
    HighInflation,
    DeflationRisk,
    RecessionDeclared,
    Boom,
    Stagflation,
    HighUnemployment,
    LabourShortage,
    ZeroRates,
    RatePressure,
    SectorBoom,
    SectorDecline,
    ConfidenceCollapse,
    ConfidenceEuphoria,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    /// Annualized GDP growth, %.
    pub gdp_growth: f64,
    /// Unemployment rate, %. Held in [3, 12].
    pub unemployment: f64,
    /// Annualized inflation, %. Held in [-2, 15].
    pub inflation: f64,
    /// Central bank rate, %. Held in [0, 15].
    pub interest_rate: f64,
    /// Consumer/business confidence index, 0..=100.
    pub confidence: f64,
    /// Productivity index, 100 = trend.
    pub productivity: f64,
    /// National debt, % of GDP.
    pub national_debt: f64,
    pub sectors: Vec<Sector>,
    pub cycle: BusinessCycle,
    pub active_policies: Vec<Policy>,
}

impl Economy {
    /// Clamped setters: invariant violations are recovered silently by
    /// clamping, never surfaced.
    pub fn set_gdp_growth(&mut self, value: f64) {
        self.gdp_growth = value.clamp(-10.0, 12.0);
    }

    pub fn set_unemployment(&mut self, value: f64) {
        self.unemployment = value.clamp(3.0, 12.0);
    }

    pub fn set_inflation(&mut self, value: f64) {
        self.inflation = value.clamp(-2.0, 15.0);
    }

    pub fn set_interest_rate(&mut self, value: f64) {
        self.interest_rate = value.clamp(0.0, 15.0);
    }

    pub fn set_confidence(&mut self, value: f64) {
        self.confidence = value.clamp(0.0, 100.0);
    }

    pub fn adjust_confidence(&mut self, delta: f64) {
        self.set_confidence(self.confidence + delta);
    }

    pub fn adjust_debt(&mut self, delta: f64) {
        self.national_debt = (self.national_debt + delta).clamp(0.0, 300.0);
    }

    /// Sector-share-weighted growth across all sectors.
    pub fn weighted_sector_growth(&self) -> f64 {
        self.sectors.iter().map(|s| s.share * s.growth).sum()
    }

    pub fn sector_mut(&mut self, kind: SectorKind) -> Option<&mut Sector> {
        self.sectors.iter_mut().find(|s| s.kind == kind)
    }
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            gdp_growth: 2.1,
            unemployment: 6.0,
            inflation: 2.0,
            interest_rate: 3.0,
            confidence: 55.0,
            productivity: 100.0,
            national_debt: 60.0,
            sectors: SectorKind::ALL
                .iter()
                .map(|&kind| Sector {
                    kind,
                    share: kind.default_share(),
                    growth: kind.base_growth(),
                })
                .collect(),
            cycle: BusinessCycle {
                phase: CyclePhase::Expansion,
                weeks_in_phase: 0,
                intensity: 0.5,
            },
            active_policies: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sector_shares_sum_to_one() {
        let eco = Economy::default();
        let total: f64 = eco.sectors.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-9, "shares must sum to 1.0: {total}");
    }

    #[test]
    fn setters_clamp_to_declared_bounds() {
        let mut eco = Economy::default();
        eco.set_unemployment(20.0);
        assert_eq!(eco.unemployment, 12.0);
        eco.set_unemployment(1.0);
        assert_eq!(eco.unemployment, 3.0);
        eco.set_confidence(150.0);
        assert_eq!(eco.confidence, 100.0);
        eco.set_inflation(-9.0);
        assert_eq!(eco.inflation, -2.0);
    }

    #[test]
    fn policy_expiry_counts_elapsed_weeks() {
        let mut p = Policy::new(PolicyKind::FiscalStimulus, 1.0, 2);
        assert!(!p.expired());
        p.weeks_elapsed = 1;
        assert!(!p.expired());
        p.weeks_elapsed = 2;
        assert!(p.expired());
    }
}
