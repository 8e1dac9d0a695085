//! Goal map generators.
//!
//! All randomness comes from a ChaCha8 stream seeded by the caller, so a
//! scenario failure is reproducible from its seed alone.

use megaverse_env::{AstralObject, ComethDirection, CurrentGrid, GoalCell, GoalGrid, Grid, SoloonColor};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Every occupying object, in a fixed order.
pub fn all_objects() -> Vec<AstralObject> {
    let mut objects = vec![AstralObject::Polyanet];
    objects.extend(SoloonColor::ALL.iter().map(|&color| AstralObject::Soloon { color }));
    objects.extend(
        ComethDirection::ALL
            .iter()
            .map(|&direction| AstralObject::Cometh { direction }),
    );
    objects
}

fn label_grid(size: usize, mut cell: impl FnMut(usize, usize) -> GoalCell) -> GoalGrid {
    Grid::from_fn(size, |row, column| cell(row, column).to_string())
}

/// Polyanets on both diagonals, leaving `margin` cells of space at each edge.
pub fn cross_goal(size: usize, margin: usize) -> GoalGrid {
    label_grid(size, |row, column| {
        let inside = row >= margin
            && column >= margin
            && row + margin < size
            && column + margin < size;
        if inside && (row == column || row + column + 1 == size) {
            GoalCell::Object(AstralObject::Polyanet)
        } else {
            GoalCell::Space
        }
    })
}

/// Random mix of every kind; roughly half the cells are space.
pub fn seeded_goal(size: usize, seed: u64) -> GoalGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let objects = all_objects();
    label_grid(size, |_, _| {
        if rng.gen_bool(0.5) {
            GoalCell::Space
        } else {
            objects
                .choose(&mut rng)
                .copied()
                .map(GoalCell::Object)
                .unwrap_or(GoalCell::Space)
        }
    })
}

/// A current map as a previous, partial run might have left it.
///
/// Each cell independently holds its goal object with probability
/// `progress`, otherwise a random object or nothing.
pub fn partial_current(goal: &GoalGrid, seed: u64, progress: f64) -> CurrentGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_mul(0x9e3779b97f4a7c15));
    let objects = all_objects();
    let progress = progress.clamp(0.0, 1.0);

    Grid::from_fn(goal.size(), |row, column| {
        let target = goal
            .get(row, column)
            .and_then(|label| label.parse::<GoalCell>().ok())
            .and_then(|cell| cell.object().copied());
        if rng.gen_bool(progress) {
            target
        } else if rng.gen_bool(0.5) {
            objects.choose(&mut rng).copied()
        } else {
            None
        }
    })
}

/// Counts non-space cells in a goal map.
pub fn occupied_cells(goal: &GoalGrid) -> usize {
    goal.cells()
        .filter(|(_, _, label)| label.as_str() != "SPACE")
        .count()
}
