//! Reconciliation Driver - fetches, diffs and applies with pacing.
//!
//! This module is the integration layer between the pure differ and the
//! environment collaborators.
//!
//! # Flow
//!
//! ```text
//! ┌──────────────┐   try_join   ┌────────────┐   ops   ┌──────────────────┐
//! │ MapProvider  │─────────────►│   differ   │────────►│ apply (serial)   │
//! │ goal+current │              │ plan::diff │         │ + pacing sleep   │
//! └──────────────┘              └────────────┘         └────────┬─────────┘
//!                                                               │
//!                                                      ┌────────▼─────────┐
//!                                                      │  EntityMutator   │
//!                                                      └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use megaverse_core::{MegaverseClient, MegaverseConfig, Reconciler};
//! use megaverse_env::TokioContext;
//!
//! let client = Arc::new(MegaverseClient::new(&config)?);
//! let reconciler = Reconciler::new(TokioContext::shared(), client.clone(), client)
//!     .with_pacing(config.pacing);
//! let report = reconciler.reconcile().await?;
//! ```

use crate::error::ReconError;
use crate::pacing::PacingPolicy;
use crate::plan::{decode_goal, diff, PendingOperation};

use megaverse_env::{AstralObject, EntityMutator, EnvError, MapProvider, ReconContext};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of one operation within a run.
///
/// `Failed` is terminal for the run; the next run re-derives the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    Applying,
    Applied,
    Failed,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationState::Pending => "pending",
            OperationState::Applying => "applying",
            OperationState::Applied => "applied",
            OperationState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// An operation whose create call failed, with the remote's reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOperation {
    pub operation: PendingOperation,
    pub error: EnvError,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconReport {
    /// Operations derived by the differ
    pub found: usize,

    /// Operations whose create call succeeded
    pub applied: usize,

    /// Operations whose create call failed, in application order
    pub failed: Vec<FailedOperation>,
}

impl ReconReport {
    /// True when every derived operation applied.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives one reconciliation pass.
///
/// Generic over the context and collaborator implementations, allowing
/// the same driver to run against the remote API or the simulator.
pub struct Reconciler<Ctx, Maps, Mutator>
where
    Ctx: ReconContext,
    Maps: MapProvider,
    Mutator: EntityMutator,
{
    /// Environment context (clock)
    pub context: Arc<Ctx>,

    /// Source of goal and current maps
    pub maps: Arc<Maps>,

    /// Target of create calls
    pub mutator: Arc<Mutator>,

    /// Wait between mutations
    pub pacing: PacingPolicy,
}

impl<Ctx, Maps, Mutator> Reconciler<Ctx, Maps, Mutator>
where
    Ctx: ReconContext,
    Maps: MapProvider,
    Mutator: EntityMutator,
{
    /// Creates a driver with the default pacing policy.
    pub fn new(context: Arc<Ctx>, maps: Arc<Maps>, mutator: Arc<Mutator>) -> Self {
        Self {
            context,
            maps,
            mutator,
            pacing: PacingPolicy::default(),
        }
    }

    /// Sets the pacing policy.
    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Fetches both maps concurrently and derives the pending operations.
    ///
    /// Performs no mutation.
    pub async fn plan(&self) -> Result<Vec<PendingOperation>, ReconError> {
        let (goal, current) = tokio::try_join!(
            self.maps.fetch_goal_grid(),
            self.maps.fetch_current_grid(),
        )
        .map_err(ReconError::MapFetch)?;

        if goal.size() != current.size() {
            return Err(ReconError::DimensionMismatch {
                goal: goal.size(),
                current: current.size(),
            });
        }

        let goal = decode_goal(&goal)?;
        diff(&goal, &current)
    }

    /// Runs a full pass: plan, then apply every operation in order.
    ///
    /// # Returns
    /// * `Ok(report)` - The run completed; `report.failed` may be non-empty
    /// * `Err(ReconError)` - Fatal; no create call was issued
    pub async fn reconcile(&self) -> Result<ReconReport, ReconError> {
        let operations = self.plan().await?;
        info!("Found {} missing entities to create", operations.len());
        for operation in &operations {
            debug!(state = %OperationState::Pending, "{}", operation);
        }

        let mut report = ReconReport {
            found: operations.len(),
            ..Default::default()
        };
        let delay = self.pacing.delay();

        for operation in operations {
            debug!(state = %OperationState::Applying, "{}", operation);

            match self.apply(&operation).await {
                Ok(()) => {
                    debug!(state = %OperationState::Applied, "{}", operation);
                    info!("Created {}", operation);
                    report.applied += 1;
                }
                Err(error) => {
                    debug!(state = %OperationState::Failed, "{}", operation);
                    warn!(
                        "Failed to create entity at ({}, {}): {}",
                        operation.row, operation.column, error
                    );
                    report.failed.push(FailedOperation { operation, error });
                }
            }

            // Paced regardless of outcome.
            self.context.sleep(delay).await;
        }

        info!(
            "Finished creating missing entities ({} applied, {} failed)",
            report.applied,
            report.failed.len()
        );
        Ok(report)
    }

    /// Dispatches one operation to the create call for its kind.
    pub async fn apply(&self, operation: &PendingOperation) -> Result<(), EnvError> {
        let PendingOperation { row, column, target } = *operation;
        match target {
            AstralObject::Polyanet => self.mutator.create_polyanet(row, column).await,
            AstralObject::Soloon { color } => {
                self.mutator.create_soloon(row, column, color).await
            }
            AstralObject::Cometh { direction } => {
                self.mutator.create_cometh(row, column, direction).await
            }
        }
    }
}
