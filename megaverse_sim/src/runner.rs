//! Scenario runner - drives the real reconciler against a simulated universe.

use crate::context::SimContext;
use crate::patterns::{cross_goal, occupied_cells, partial_current, seeded_goal};
use crate::scenarios::ScenarioId;
use crate::universe::{RemoteCall, SimUniverse};

use megaverse_core::{decode_goal, diff, PacingPolicy, ReconError, ReconReport, Reconciler};
use megaverse_env::{
    AstralObject, ComethDirection, CurrentGrid, EnvError, GoalCell, GoalGrid, Grid, MapKind,
    ReconContext, SoloonColor,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Minimum spacing the simulated remote enforces in the rate limit scenario.
const RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(3);

type SimReconciler = Reconciler<SimContext, SimUniverse, SimUniverse>;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution, summed over every
/// reconciliation pass the scenario makes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    /// Operations derived by the differ
    pub found: usize,

    /// Create calls that succeeded
    pub applied: usize,

    /// Create calls that failed
    pub failed: usize,

    /// Mutating calls seen by the universe
    pub calls: usize,

    /// Calls rejected by the rate limiter
    pub rejected: u64,

    /// Virtual time spent, in seconds
    pub virtual_secs: f64,
}

impl ScenarioMetrics {
    fn record_report(&mut self, report: &ReconReport) {
        self.found += report.found;
        self.applied += report.applied;
        self.failed += report.failed.len();
    }

    fn record_universe(&mut self, context: &SimContext, universe: &SimUniverse) {
        self.calls += universe.calls().len();
        self.rejected += universe.rejected_count();
        self.virtual_secs += context.now().as_secs_f64();
    }
}

fn check(condition: bool, reason: impl FnOnce() -> String) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(reason())
    }
}

/// Cells touched by create calls, in arrival order.
fn created_cells(universe: &SimUniverse) -> Vec<(usize, usize)> {
    universe
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            RemoteCall::Create { row, column, .. } => Some((row, column)),
            RemoteCall::Delete { .. } => None,
        })
        .collect()
}

/// Same kind, next color or direction in declaration order.
fn stale_variant(object: AstralObject) -> AstralObject {
    fn next<T: Copy + PartialEq>(all: &[T], value: T) -> T {
        let index = all.iter().position(|v| *v == value).unwrap_or(0);
        all[(index + 1) % all.len()]
    }
    match object {
        AstralObject::Polyanet => AstralObject::Polyanet,
        AstralObject::Soloon { color } => AstralObject::Soloon {
            color: next(&SoloonColor::ALL, color),
        },
        AstralObject::Cometh { direction } => AstralObject::Cometh {
            direction: next(&ComethDirection::ALL, direction),
        },
    }
}

/// Runs reconciliation scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Side length of generated maps
    size: usize,

    /// Pacing used by the reconciler
    pacing: PacingPolicy,
}

impl ScenarioRunner {
    /// Creates a new scenario runner with the default pacing.
    pub fn new(seed: u64, size: usize) -> Self {
        Self {
            seed,
            size,
            pacing: PacingPolicy::default(),
        }
    }

    /// Sets the pacing policy.
    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Runs a scenario and returns the result.
    pub async fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!(
            "Starting scenario: {} (seed={}, size={})",
            scenario.name(),
            self.seed,
            self.size
        );

        let mut metrics = ScenarioMetrics::default();
        let outcome = match scenario {
            ScenarioId::FreshCross => self.run_fresh_cross(&mut metrics).await,
            ScenarioId::Resume => self.run_resume(&mut metrics).await,
            ScenarioId::FlakyCell => self.run_flaky_cell(&mut metrics).await,
            ScenarioId::StaleColor => self.run_stale_color(&mut metrics).await,
            ScenarioId::RateLimit => self.run_rate_limit(&mut metrics).await,
            ScenarioId::DimensionMismatch => self.run_dimension_mismatch(&mut metrics).await,
            ScenarioId::MapOutage => self.run_map_outage(&mut metrics).await,
        };

        debug!("{} metrics: {:?}", scenario.name(), metrics);
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: outcome.is_ok(),
            failure_reason: outcome.err(),
            metrics,
        }
    }

    fn reconciler(
        &self,
        context: &Arc<SimContext>,
        universe: &Arc<SimUniverse>,
        pacing: PacingPolicy,
    ) -> SimReconciler {
        Reconciler::new(context.clone(), universe.clone(), universe.clone()).with_pacing(pacing)
    }

    fn cross(&self) -> GoalGrid {
        cross_goal(self.size, self.size / 5)
    }

    /// Runs once more and expects nothing left to do.
    async fn check_settled(
        &self,
        reconciler: &SimReconciler,
        metrics: &mut ScenarioMetrics,
    ) -> Result<(), String> {
        let report = reconciler.reconcile().await.map_err(|e| e.to_string())?;
        metrics.record_report(&report);
        check(report.found == 0, || {
            format!("settled universe still has {} operations", report.found)
        })
    }

    /// Empty universe and a cross of polyanets: every goal cell created
    /// exactly once, in row-major order, with one pacing wait per call.
    async fn run_fresh_cross(&self, metrics: &mut ScenarioMetrics) -> Result<(), String> {
        let context = SimContext::shared();
        let goal = self.cross();
        let expected = occupied_cells(&goal);
        let universe = Arc::new(SimUniverse::empty(context.clone(), goal));
        let reconciler = self.reconciler(&context, &universe, self.pacing);

        let report = reconciler.reconcile().await.map_err(|e| e.to_string())?;
        metrics.record_report(&report);

        check(report.found == expected, || {
            format!("found {} operations, expected {}", report.found, expected)
        })?;
        check(report.is_clean() && report.applied == expected, || {
            format!("{} of {} applied", report.applied, expected)
        })?;

        let cells = created_cells(&universe);
        check(cells.len() == expected, || {
            format!("{} create calls for {} cells", cells.len(), expected)
        })?;
        check(cells.windows(2).all(|w| w[0] < w[1]), || {
            "create calls not in row-major order".to_string()
        })?;

        let sleeps = context.sleeps();
        check(
            sleeps.len() == expected && sleeps.iter().all(|d| *d == self.pacing.delay()),
            || format!("{} pacing waits for {} calls", sleeps.len(), expected),
        )?;
        check(universe.is_converged(), || "universe not converged".to_string())?;

        self.check_settled(&reconciler, metrics).await?;
        metrics.record_universe(&context, &universe);
        Ok(())
    }

    /// Half-built universe: only cells the differ flags are touched.
    async fn run_resume(&self, metrics: &mut ScenarioMetrics) -> Result<(), String> {
        let context = SimContext::shared();
        let goal = seeded_goal(self.size, self.seed);
        let current = partial_current(&goal, self.seed, 0.5);

        let decoded = decode_goal(&goal).map_err(|e| e.to_string())?;
        let expected: Vec<_> = diff(&decoded, &current)
            .map_err(|e| e.to_string())?
            .into_iter()
            .map(|op| (op.row, op.column))
            .collect();

        let universe = Arc::new(SimUniverse::new(context.clone(), goal, current));
        let reconciler = self.reconciler(&context, &universe, self.pacing);

        let report = reconciler.reconcile().await.map_err(|e| e.to_string())?;
        metrics.record_report(&report);

        check(report.found == expected.len(), || {
            format!("found {} operations, expected {}", report.found, expected.len())
        })?;
        let cells = created_cells(&universe);
        check(cells == expected, || {
            "create calls differ from the planned cells".to_string()
        })?;
        check(universe.is_converged(), || "universe not converged".to_string())?;

        self.check_settled(&reconciler, metrics).await?;
        metrics.record_universe(&context, &universe);
        Ok(())
    }

    /// One failing cell: the run continues past it, still paces, and a
    /// later run re-derives only that cell.
    async fn run_flaky_cell(&self, metrics: &mut ScenarioMetrics) -> Result<(), String> {
        let context = SimContext::shared();
        let goal = self.cross();
        let expected = occupied_cells(&goal);
        let flaky = goal
            .cells()
            .find(|(_, _, label)| label.as_str() != "SPACE")
            .map(|(row, column, _)| (row, column))
            .ok_or_else(|| "goal has no occupied cell".to_string())?;

        let universe = Arc::new(SimUniverse::empty(context.clone(), goal));
        universe.fail_cell(flaky.0, flaky.1);
        let reconciler = self.reconciler(&context, &universe, self.pacing);

        let report = reconciler.reconcile().await.map_err(|e| e.to_string())?;
        metrics.record_report(&report);

        check(report.found == expected, || {
            format!("found {} operations, expected {}", report.found, expected)
        })?;
        check(report.applied + 1 == expected, || {
            format!("{} of {} applied with one failing cell", report.applied, expected)
        })?;
        let failed_cell = report
            .failed
            .first()
            .map(|f| (f.operation.row, f.operation.column));
        check(report.failed.len() == 1 && failed_cell == Some(flaky), || {
            format!("failed operations {:?}, expected only {:?}", failed_cell, flaky)
        })?;
        check(context.sleeps().len() == expected, || {
            "failed call was not paced".to_string()
        })?;
        check(!universe.is_converged(), || {
            "converged despite a failing cell".to_string()
        })?;

        universe.heal_cells();
        let retry = reconciler.reconcile().await.map_err(|e| e.to_string())?;
        metrics.record_report(&retry);
        check(retry.found == 1 && retry.applied == 1, || {
            format!("retry found {} and applied {}", retry.found, retry.applied)
        })?;
        check(universe.is_converged(), || "universe not converged".to_string())?;

        metrics.record_universe(&context, &universe);
        Ok(())
    }

    /// Right kind, wrong attribute: every soloon and cometh is recreated,
    /// polyanets are left alone.
    async fn run_stale_color(&self, metrics: &mut ScenarioMetrics) -> Result<(), String> {
        let context = SimContext::shared();
        let goal = seeded_goal(self.size, self.seed);
        let decoded = decode_goal(&goal).map_err(|e| e.to_string())?;

        let current: CurrentGrid = Grid::from_fn(decoded.size(), |row, column| {
            decoded
                .get(row, column)
                .and_then(GoalCell::object)
                .map(|object| stale_variant(*object))
        });
        let expected = decoded
            .cells()
            .filter(|(_, _, cell)| {
                matches!(
                    cell.object(),
                    Some(AstralObject::Soloon { .. } | AstralObject::Cometh { .. })
                )
            })
            .count();

        let universe = Arc::new(SimUniverse::new(context.clone(), goal, current));
        let reconciler = self.reconciler(&context, &universe, self.pacing);

        let report = reconciler.reconcile().await.map_err(|e| e.to_string())?;
        metrics.record_report(&report);

        check(report.found == expected, || {
            format!("found {} stale cells, expected {}", report.found, expected)
        })?;
        check(universe.is_converged(), || "universe not converged".to_string())?;

        self.check_settled(&reconciler, metrics).await?;
        metrics.record_universe(&context, &universe);
        Ok(())
    }

    /// A remote limited to one mutation per 3s: a paced run never trips it,
    /// an unpaced run does, and a paced rerun repairs what the unpaced run
    /// left behind.
    async fn run_rate_limit(&self, metrics: &mut ScenarioMetrics) -> Result<(), String> {
        let paced = PacingPolicy::every(RATE_LIMIT_INTERVAL);
        let goal = self.cross();
        let expected = occupied_cells(&goal);

        // Paced
        let context = SimContext::shared();
        let universe = Arc::new(SimUniverse::empty(context.clone(), goal.clone()));
        universe.set_rate_limit(Some(RATE_LIMIT_INTERVAL));
        let report = self
            .reconciler(&context, &universe, paced)
            .reconcile()
            .await
            .map_err(|e| e.to_string())?;
        metrics.record_report(&report);
        check(universe.rejected_count() == 0 && report.is_clean(), || {
            format!("paced run had {} rejections", universe.rejected_count())
        })?;
        check(universe.is_converged(), || "paced run did not converge".to_string())?;
        metrics.record_universe(&context, &universe);

        // Unpaced, then repaired
        let context = SimContext::shared();
        let universe = Arc::new(SimUniverse::empty(context.clone(), goal));
        universe.set_rate_limit(Some(RATE_LIMIT_INTERVAL));
        let report = self
            .reconciler(&context, &universe, PacingPolicy::none())
            .reconcile()
            .await
            .map_err(|e| e.to_string())?;
        metrics.record_report(&report);
        let rejected = universe.rejected_count();
        check(expected < 2 || rejected > 0, || {
            "unpaced run was never rate limited".to_string()
        })?;
        check(report.failed.len() as u64 == rejected, || {
            format!("{} failures for {} rejections", report.failed.len(), rejected)
        })?;

        context.advance_time(RATE_LIMIT_INTERVAL);
        let repaired = self.reconciler(&context, &universe, paced);
        let retry = repaired.reconcile().await.map_err(|e| e.to_string())?;
        metrics.record_report(&retry);
        check(retry.found == report.failed.len() && retry.is_clean(), || {
            format!("repair found {} of {} failures", retry.found, report.failed.len())
        })?;
        check(universe.is_converged(), || "repair did not converge".to_string())?;

        metrics.record_universe(&context, &universe);
        Ok(())
    }

    /// Goal N x N against current (N+1) x (N+1): fatal, no mutation.
    async fn run_dimension_mismatch(&self, metrics: &mut ScenarioMetrics) -> Result<(), String> {
        let context = SimContext::shared();
        let current = Grid::filled(self.size + 1, None);
        let universe = Arc::new(SimUniverse::new(context.clone(), self.cross(), current));

        let outcome = self
            .reconciler(&context, &universe, self.pacing)
            .reconcile()
            .await;
        let expected = ReconError::DimensionMismatch {
            goal: self.size,
            current: self.size + 1,
        };
        check(outcome.as_ref().err() == Some(&expected), || {
            format!("expected {}, got {:?}", expected, outcome)
        })?;
        check(universe.calls().is_empty(), || {
            format!("{} calls after a fatal error", universe.calls().len())
        })?;
        check(context.sleeps().is_empty(), || "paced after a fatal error".to_string())?;

        metrics.record_universe(&context, &universe);
        Ok(())
    }

    /// Either map read failing aborts the run; once both reads recover the
    /// run converges.
    async fn run_map_outage(&self, metrics: &mut ScenarioMetrics) -> Result<(), String> {
        let context = SimContext::shared();
        let universe = Arc::new(SimUniverse::empty(context.clone(), self.cross()));
        let reconciler = self.reconciler(&context, &universe, self.pacing);

        for map in [MapKind::Goal, MapKind::Current] {
            universe.fail_goal_fetch(map == MapKind::Goal);
            universe.fail_current_fetch(map == MapKind::Current);

            let outcome = reconciler.reconcile().await;
            let aborted = matches!(
                &outcome,
                Err(ReconError::MapFetch(EnvError::MapFetch { map: failed, .. })) if *failed == map
            );
            check(aborted, || {
                format!("{} map outage gave {:?}", map, outcome)
            })?;
            check(universe.calls().is_empty(), || {
                format!("{} calls during a {} map outage", universe.calls().len(), map)
            })?;
        }

        universe.fail_goal_fetch(false);
        universe.fail_current_fetch(false);
        let report = reconciler.reconcile().await.map_err(|e| e.to_string())?;
        metrics.record_report(&report);
        check(universe.is_converged(), || "universe not converged".to_string())?;

        metrics.record_universe(&context, &universe);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_fresh_cross_scenario() {
        let runner = ScenarioRunner::new(42, 11);
        let result = runner.run(ScenarioId::FreshCross).await;

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.found, 13);
        assert_eq!(result.metrics.calls, 13);
        // 13 paced waits of 3s
        assert_eq!(result.metrics.virtual_secs, 39.0);
    }

    #[tokio::test]
    async fn test_every_scenario_passes() {
        let runner = ScenarioRunner::new(7, 8);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario).await;
            assert!(result.passed, "{}: {:?}", scenario, result.failure_reason);
        }
    }

    #[tokio::test]
    async fn test_flaky_cell_counts_one_failure() {
        let result = ScenarioRunner::new(1, 5).run(ScenarioId::FlakyCell).await;

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.failed, 1);
        // 5 cells, then one retry
        assert_eq!(result.metrics.found, 6);
    }

    #[tokio::test]
    async fn test_rate_limit_unpaced_is_rejected() {
        let result = ScenarioRunner::new(3, 11).run(ScenarioId::RateLimit).await;

        assert!(result.passed, "{:?}", result.failure_reason);
        // Everything after the first unpaced call is rejected.
        assert_eq!(result.metrics.rejected, 12);
    }

    #[tokio::test]
    async fn test_abort_scenarios_make_no_calls() {
        let runner = ScenarioRunner::new(42, 6);
        for scenario in [ScenarioId::DimensionMismatch, ScenarioId::MapOutage] {
            let result = runner.run(scenario).await;
            assert!(result.passed, "{}: {:?}", scenario, result.failure_reason);
        }
        let result = runner.run(ScenarioId::DimensionMismatch).await;
        assert_eq!(result.metrics.calls, 0);
    }

    #[tokio::test]
    async fn test_resume_deterministic() {
        let first = ScenarioRunner::new(42, 9).run(ScenarioId::Resume).await;
        let second = ScenarioRunner::new(42, 9).run(ScenarioId::Resume).await;

        assert!(first.passed, "{:?}", first.failure_reason);
        assert_eq!(first.metrics, second.metrics);
    }

    #[test]
    fn test_stale_variant_keeps_kind() {
        let soloon = AstralObject::Soloon {
            color: SoloonColor::Blue,
        };
        let stale = stale_variant(soloon);
        assert_ne!(stale, soloon);
        assert_eq!(stale.kind(), soloon.kind());
        assert_eq!(stale_variant(AstralObject::Polyanet), AstralObject::Polyanet);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_resume_converges(seed in any::<u64>(), size in 1usize..12) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let result = runtime.block_on(
                ScenarioRunner::new(seed, size)
                    .with_pacing(PacingPolicy::none())
                    .run(ScenarioId::Resume),
            );
            prop_assert!(result.passed, "{:?}", result.failure_reason);
        }
    }
}
