//! Run-fatal reconciliation errors.

use megaverse_env::EnvError;
use thiserror::Error;

/// Errors that abort a reconciliation run before any mutation.
///
/// Per-operation create failures are not here: they are collected in the
/// run's [`ReconReport`](crate::ReconReport) and never abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconError {
    /// Either map could not be retrieved
    #[error("Failed to get maps")]
    MapFetch(#[source] EnvError),

    /// Goal and current grids have different side lengths
    #[error("Map size mismatch: goal is {goal}x{goal}, current is {current}x{current}")]
    DimensionMismatch { goal: usize, current: usize },

    /// A goal label names no known entity
    #[error("Unknown entity type {label:?} at ({row}, {column})")]
    UnknownEntityKind {
        row: usize,
        column: usize,
        label: String,
    },
}
