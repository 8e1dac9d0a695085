//! Grid differ - derives the create operations that move current toward goal.
//!
//! The differ is pure: same inputs, same operations, same order. That is
//! what makes re-running the whole reconciliation the recovery mechanism
//! after a partial failure. Cells already matching are skipped, so a second
//! run only re-derives what is still missing.
//!
//! Only additions are planned. A `SPACE` goal cell never produces work,
//! even when something occupies it in the current map.

use crate::error::ReconError;
use megaverse_env::{AstralObject, CurrentGrid, GoalCell, GoalGrid, Grid};
use std::fmt;

/// One unit of reconciliation work: create `target` at `(row, column)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingOperation {
    pub row: usize,
    pub column: usize,
    pub target: AstralObject,
}

impl fmt::Display for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at ({}, {})", self.target, self.row, self.column)
    }
}

/// Decodes every goal label, failing on the first unknown one (row-major).
pub fn decode_goal(goal: &GoalGrid) -> Result<Grid<GoalCell>, ReconError> {
    goal.try_map(|row, column, label| {
        label
            .parse::<GoalCell>()
            .map_err(|_| ReconError::UnknownEntityKind {
                row,
                column,
                label: label.clone(),
            })
    })
}

/// Whether a cell holding `current` must be (re)created to hold `goal`.
///
/// True when the cell is empty, holds another kind, or holds the same kind
/// with a different color/direction.
pub fn needs_create(goal: &AstralObject, current: Option<&AstralObject>) -> bool {
    current != Some(goal)
}

/// Compares goal against current cell by cell.
///
/// # Returns
/// * `Ok(ops)` - Operations in row-major order, column ascending within a row
/// * `Err(ReconError::DimensionMismatch)` - Grids have different sizes
pub fn diff(
    goal: &Grid<GoalCell>,
    current: &CurrentGrid,
) -> Result<Vec<PendingOperation>, ReconError> {
    if goal.size() != current.size() {
        return Err(ReconError::DimensionMismatch {
            goal: goal.size(),
            current: current.size(),
        });
    }

    let operations = goal
        .cells()
        .filter_map(|(row, column, cell)| {
            let target = cell.object()?;
            let observed = current.get(row, column).and_then(Option::as_ref);
            needs_create(target, observed).then_some(PendingOperation {
                row,
                column,
                target: *target,
            })
        })
        .collect();

    Ok(operations)
}
