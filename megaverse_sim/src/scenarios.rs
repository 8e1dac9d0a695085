//! Reconciliation scenarios run against the simulated universe.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Empty universe, cross-shaped goal, clean run
    FreshCross,

    /// Partially built universe from an earlier run
    Resume,

    /// One cell keeps failing; the run continues and a later run repairs it
    FlakyCell,

    /// Cells hold the right kind with the wrong color or direction
    StaleColor,

    /// Remote rejects mutations that arrive too quickly
    RateLimit,

    /// Goal and current maps disagree on size
    DimensionMismatch,

    /// One map read fails
    MapOutage,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::FreshCross,
            ScenarioId::Resume,
            ScenarioId::FlakyCell,
            ScenarioId::StaleColor,
            ScenarioId::RateLimit,
            ScenarioId::DimensionMismatch,
            ScenarioId::MapOutage,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::FreshCross => "fresh_cross",
            ScenarioId::Resume => "resume",
            ScenarioId::FlakyCell => "flaky_cell",
            ScenarioId::StaleColor => "stale_color",
            ScenarioId::RateLimit => "rate_limit",
            ScenarioId::DimensionMismatch => "dimension_mismatch",
            ScenarioId::MapOutage => "map_outage",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::FreshCross => "Empty universe, polyanet cross goal, every cell created once",
            ScenarioId::Resume => "Half-built universe, only missing or wrong cells are created",
            ScenarioId::FlakyCell => "One cell fails, the rest apply, a second run repairs it",
            ScenarioId::StaleColor => "Right kind with wrong attribute is recreated",
            ScenarioId::RateLimit => "Paced run passes a 3s rate limit, unpaced run trips it",
            ScenarioId::DimensionMismatch => "Goal N x N against current (N+1) x (N+1), no calls",
            ScenarioId::MapOutage => "Goal or current read fails, run aborts with no calls",
        }
    }

    /// Returns true if the scenario expects the run to abort.
    pub fn expects_abort(&self) -> bool {
        matches!(self, ScenarioId::DimensionMismatch | ScenarioId::MapOutage)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fresh_cross" | "freshcross" | "cross" => Ok(ScenarioId::FreshCross),
            "resume" => Ok(ScenarioId::Resume),
            "flaky_cell" | "flakycell" => Ok(ScenarioId::FlakyCell),
            "stale_color" | "stalecolor" => Ok(ScenarioId::StaleColor),
            "rate_limit" | "ratelimit" => Ok(ScenarioId::RateLimit),
            "dimension_mismatch" | "dimensionmismatch" => Ok(ScenarioId::DimensionMismatch),
            "map_outage" | "mapoutage" => Ok(ScenarioId::MapOutage),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
