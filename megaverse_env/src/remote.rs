//! Remote collaborator abstractions: map reads and entity mutations.

use crate::error::EnvError;
use crate::types::{ComethDirection, CurrentGrid, GoalGrid, SoloonColor};
use async_trait::async_trait;

/// Read access to the two maps of one candidate's universe.
///
/// # Implementations
///
/// - **Production**: `MegaverseClient` - HTTP against the challenge API
/// - **Simulation**: `SimUniverse` - in-memory grids with fault injection
#[async_trait]
pub trait MapProvider: Send + Sync + 'static {
    /// Fetches the goal map as raw labels.
    ///
    /// # Returns
    /// * `Ok(grid)` - Square grid of labels such as `"POLYANET"`
    /// * `Err(EnvError::MapFetch)` - Transport or decode failure
    async fn fetch_goal_grid(&self) -> Result<GoalGrid, EnvError>;

    /// Fetches the current map; empty cells are `None`.
    async fn fetch_current_grid(&self) -> Result<CurrentGrid, EnvError>;
}

/// Write access to one candidate's universe.
///
/// Every method is one remote call. Failures carry the kind in their
/// error (`EnvError::Create` / `EnvError::Delete`) so a caller can report
/// them without further context.
///
/// # Note
/// Whether a create over an occupied cell replaces the occupant is up to
/// the remote; the trait makes no promise either way.
#[async_trait]
pub trait EntityMutator: Send + Sync + 'static {
    async fn create_polyanet(&self, row: usize, column: usize) -> Result<(), EnvError>;

    async fn create_soloon(
        &self,
        row: usize,
        column: usize,
        color: SoloonColor,
    ) -> Result<(), EnvError>;

    async fn create_cometh(
        &self,
        row: usize,
        column: usize,
        direction: ComethDirection,
    ) -> Result<(), EnvError>;

    async fn delete_polyanet(&self, row: usize, column: usize) -> Result<(), EnvError>;

    async fn delete_soloon(&self, row: usize, column: usize) -> Result<(), EnvError>;

    async fn delete_cometh(&self, row: usize, column: usize) -> Result<(), EnvError>;
}
