//! SimUniverse - in-memory stand-in for the remote Megaverse API.
//!
//! Holds the authoritative goal map and a mutable current map, and
//! implements both collaborator traits over them. Faults can be injected
//! per cell, per map, or as a rate limit measured on the virtual clock.

use crate::context::SimContext;

use async_trait::async_trait;
use megaverse_core::{decode_goal, diff};
use megaverse_env::{
    AstralObject, ComethDirection, CurrentGrid, EntityMutator, EnvError, GoalGrid, Grid, MapKind,
    MapProvider, ObjectKind, ReconContext, SoloonColor,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One mutating call observed by the universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCall {
    Create {
        row: usize,
        column: usize,
        object: AstralObject,
    },
    Delete {
        row: usize,
        column: usize,
        kind: ObjectKind,
    },
}

#[derive(Debug)]
struct UniverseState {
    current: CurrentGrid,
    failing_cells: HashSet<(usize, usize)>,
    goal_outage: bool,
    current_outage: bool,
    min_interval: Option<Duration>,
    last_mutation: Option<Duration>,
    calls: Vec<RemoteCall>,
    rejected: u64,
}

/// The simulated remote.
pub struct SimUniverse {
    /// Shared virtual clock (for rate limiting)
    context: Arc<SimContext>,

    /// Authoritative labels, never mutated
    goal: GoalGrid,

    state: Mutex<UniverseState>,
}

impl SimUniverse {
    /// Creates a universe with the given goal and current maps.
    ///
    /// The maps may differ in size; that is how dimension mismatches are
    /// simulated.
    pub fn new(context: Arc<SimContext>, goal: GoalGrid, current: CurrentGrid) -> Self {
        Self {
            context,
            goal,
            state: Mutex::new(UniverseState {
                current,
                failing_cells: HashSet::new(),
                goal_outage: false,
                current_outage: false,
                min_interval: None,
                last_mutation: None,
                calls: Vec::new(),
                rejected: 0,
            }),
        }
    }

    /// Creates a universe whose current map is empty space.
    pub fn empty(context: Arc<SimContext>, goal: GoalGrid) -> Self {
        let current = Grid::filled(goal.size(), None);
        Self::new(context, goal, current)
    }

    /// Makes every mutation at `(row, column)` fail with a server error.
    pub fn fail_cell(&self, row: usize, column: usize) {
        self.state.lock().unwrap().failing_cells.insert((row, column));
    }

    /// Clears all per-cell failures.
    pub fn heal_cells(&self) {
        self.state.lock().unwrap().failing_cells.clear();
    }

    /// Toggles failure of the goal map read.
    pub fn fail_goal_fetch(&self, failing: bool) {
        self.state.lock().unwrap().goal_outage = failing;
    }

    /// Toggles failure of the current map read.
    pub fn fail_current_fetch(&self, failing: bool) {
        self.state.lock().unwrap().current_outage = failing;
    }

    /// Rejects mutations arriving sooner than `min_interval` after the
    /// previous one (rejected attempts count as arrivals).
    pub fn set_rate_limit(&self, min_interval: Option<Duration>) {
        self.state.lock().unwrap().min_interval = min_interval;
    }

    /// Snapshot of the current map.
    pub fn current(&self) -> CurrentGrid {
        self.state.lock().unwrap().current.clone()
    }

    /// Every mutating call, in arrival order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Mutations rejected by the rate limiter.
    pub fn rejected_count(&self) -> u64 {
        self.state.lock().unwrap().rejected
    }

    /// True when every non-space goal cell holds exactly its object.
    pub fn is_converged(&self) -> bool {
        let current = self.current();
        match decode_goal(&self.goal) {
            Ok(goal) => diff(&goal, &current).map(|ops| ops.is_empty()).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Admits or rejects one mutation, recording it either way.
    fn admit(&self, state: &mut UniverseState, call: RemoteCall) -> Result<(), String> {
        let (row, column) = match call {
            RemoteCall::Create { row, column, .. } | RemoteCall::Delete { row, column, .. } => {
                (row, column)
            }
        };
        state.calls.push(call);

        let now = self.context.now();
        let last = state.last_mutation.replace(now);
        if let (Some(min), Some(last)) = (state.min_interval, last) {
            if now.saturating_sub(last) < min {
                state.rejected += 1;
                return Err("Request failed with status code 429".to_string());
            }
        }

        if state.failing_cells.contains(&(row, column)) {
            return Err("Request failed with status code 500".to_string());
        }
        if row >= state.current.size() || column >= state.current.size() {
            return Err("Request failed with status code 400".to_string());
        }
        Ok(())
    }

    fn create(&self, row: usize, column: usize, object: AstralObject) -> Result<(), EnvError> {
        let mut state = self.state.lock().unwrap();
        self.admit(&mut state, RemoteCall::Create { row, column, object })
            .map_err(|msg| EnvError::create(object.kind(), msg))?;
        // Creating over an occupant replaces it.
        state.current.replace(row, column, Some(object));
        Ok(())
    }

    fn delete(&self, row: usize, column: usize, kind: ObjectKind) -> Result<(), EnvError> {
        let mut state = self.state.lock().unwrap();
        self.admit(&mut state, RemoteCall::Delete { row, column, kind })
            .map_err(|msg| EnvError::delete(kind, msg))?;
        let occupant_matches = matches!(
            state.current.get(row, column),
            Some(Some(object)) if object.kind() == kind
        );
        if occupant_matches {
            state.current.replace(row, column, None);
        }
        Ok(())
    }
}

#[async_trait]
impl MapProvider for SimUniverse {
    async fn fetch_goal_grid(&self) -> Result<GoalGrid, EnvError> {
        if self.state.lock().unwrap().goal_outage {
            return Err(EnvError::map_fetch(MapKind::Goal, "Request failed with status code 503"));
        }
        Ok(self.goal.clone())
    }

    async fn fetch_current_grid(&self) -> Result<CurrentGrid, EnvError> {
        let state = self.state.lock().unwrap();
        if state.current_outage {
            return Err(EnvError::map_fetch(MapKind::Current, "Request failed with status code 503"));
        }
        Ok(state.current.clone())
    }
}

#[async_trait]
impl EntityMutator for SimUniverse {
    async fn create_polyanet(&self, row: usize, column: usize) -> Result<(), EnvError> {
        self.create(row, column, AstralObject::Polyanet)
    }

    async fn create_soloon(
        &self,
        row: usize,
        column: usize,
        color: SoloonColor,
    ) -> Result<(), EnvError> {
        self.create(row, column, AstralObject::Soloon { color })
    }

    async fn create_cometh(
        &self,
        row: usize,
        column: usize,
        direction: ComethDirection,
    ) -> Result<(), EnvError> {
        self.create(row, column, AstralObject::Cometh { direction })
    }

    async fn delete_polyanet(&self, row: usize, column: usize) -> Result<(), EnvError> {
        self.delete(row, column, ObjectKind::Polyanet)
    }

    async fn delete_soloon(&self, row: usize, column: usize) -> Result<(), EnvError> {
        self.delete(row, column, ObjectKind::Soloon)
    }

    async fn delete_cometh(&self, row: usize, column: usize) -> Result<(), EnvError> {
        self.delete(row, column, ObjectKind::Cometh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::cross_goal;

    fn universe(size: usize) -> (Arc<SimContext>, SimUniverse) {
        let ctx = SimContext::shared();
        let universe = SimUniverse::empty(ctx.clone(), cross_goal(size, 0));
        (ctx, universe)
    }

    #[tokio::test]
    async fn test_create_replaces_occupant() {
        let (_, universe) = universe(3);
        universe.create_soloon(1, 1, SoloonColor::Red).await.unwrap();
        universe.create_polyanet(1, 1).await.unwrap();

        assert_eq!(universe.current().get(1, 1), Some(&Some(AstralObject::Polyanet)));
        assert_eq!(universe.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_only_matching_kind() {
        let (_, universe) = universe(3);
        universe.create_polyanet(0, 0).await.unwrap();

        universe.delete_soloon(0, 0).await.unwrap();
        assert_eq!(universe.current().get(0, 0), Some(&Some(AstralObject::Polyanet)));

        universe.delete_polyanet(0, 0).await.unwrap();
        assert_eq!(universe.current().get(0, 0), Some(&None));
    }

    #[tokio::test]
    async fn test_failing_cell_rejects_with_kind() {
        let (_, universe) = universe(3);
        universe.fail_cell(2, 2);

        let err = universe
            .create_cometh(2, 2, ComethDirection::Up)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EnvError::create(ObjectKind::Cometh, "Request failed with status code 500")
        );
        assert_eq!(universe.current().get(2, 2), Some(&None));

        universe.heal_cells();
        universe.create_cometh(2, 2, ComethDirection::Up).await.unwrap();
    }

    #[tokio::test]
    async fn test_out_of_bounds_rejected() {
        let (_, universe) = universe(2);
        assert!(universe.create_polyanet(5, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_rate_limit_uses_virtual_clock() {
        let (ctx, universe) = universe(3);
        universe.set_rate_limit(Some(Duration::from_secs(3)));

        universe.create_polyanet(0, 0).await.unwrap();
        assert!(universe.create_polyanet(1, 1).await.is_err());
        assert_eq!(universe.rejected_count(), 1);

        ctx.sleep(Duration::from_secs(3)).await;
        universe.create_polyanet(1, 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_map_outages() {
        let (_, universe) = universe(3);
        universe.fail_goal_fetch(true);
        assert!(matches!(
            universe.fetch_goal_grid().await,
            Err(EnvError::MapFetch { map: MapKind::Goal, .. })
        ));
        assert!(universe.fetch_current_grid().await.is_ok());

        universe.fail_goal_fetch(false);
        universe.fail_current_fetch(true);
        assert!(universe.fetch_goal_grid().await.is_ok());
        assert!(universe.fetch_current_grid().await.is_err());
    }

    #[tokio::test]
    async fn test_converged_after_filling_goal() {
        let (_, universe) = universe(3);
        assert!(!universe.is_converged());

        for (row, column) in [(0, 0), (0, 2), (1, 1), (2, 0), (2, 2)] {
            universe.create_polyanet(row, column).await.unwrap();
        }
        assert!(universe.is_converged());
    }
}
