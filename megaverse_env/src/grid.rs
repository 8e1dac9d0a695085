//! Square grid container used for both maps.

use crate::error::EnvError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A square N×N arrangement of cells, addressed `(row, column)`.
///
/// Construction rejects ragged or non-square input, so every `Grid` value
/// upholds `rows.len() == row.len()` for each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    rows: Vec<Vec<T>>,
}

impl<T> Grid<T> {
    /// Builds a grid from row-major rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, EnvError> {
        let size = rows.len();
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(EnvError::MalformedGrid(format!(
                "row {} has {} cells, expected {}",
                index,
                row.len(),
                size
            )));
        }
        Ok(Self { rows })
    }

    /// Builds an N×N grid cell by cell, in row-major order.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let rows = (0..size)
            .map(|row| (0..size).map(|column| f(row, column)).collect())
            .collect();
        Self { rows }
    }

    /// Side length N.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Replaces a cell, returning the previous value.
    ///
    /// Returns `None` (and changes nothing) if the cell is out of bounds.
    pub fn replace(&mut self, row: usize, column: usize, value: T) -> Option<T> {
        let cell = self.rows.get_mut(row)?.get_mut(column)?;
        Some(std::mem::replace(cell, value))
    }

    /// Iterates `(row, column, cell)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(column, cell)| (row, column, cell))
        })
    }

    /// Converts every cell, stopping at the first failure (row-major).
    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(usize, usize, &T) -> Result<U, E>,
    ) -> Result<Grid<U>, E> {
        let mut rows = Vec::with_capacity(self.size());
        for (row, cells) in self.rows.iter().enumerate() {
            let mut mapped = Vec::with_capacity(cells.len());
            for (column, cell) in cells.iter().enumerate() {
                mapped.push(f(row, column, cell)?);
            }
            rows.push(mapped);
        }
        Ok(Grid { rows })
    }
}

impl<T: Clone> Grid<T> {
    /// An N×N grid with every cell set to `value`.
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            rows: vec![vec![value; size]; size],
        }
    }
}

impl<T: Serialize> Serialize for Grid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Grid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<Vec<T>>::deserialize(deserializer)?;
        Grid::from_rows(rows).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_rejects_non_square() {
        let err = Grid::from_rows(vec![vec![1, 2], vec![3]]).unwrap_err();
        assert!(matches!(err, EnvError::MalformedGrid(_)));

        assert!(Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).is_err());
    }

    #[test]
    fn test_grid_empty_is_square() {
        let grid: Grid<u8> = Grid::from_rows(vec![]).unwrap();
        assert_eq!(grid.size(), 0);
        assert_eq!(grid.cells().count(), 0);
    }

    #[test]
    fn test_cells_are_row_major() {
        let grid = Grid::from_rows(vec![vec!['a', 'b'], vec!['c', 'd']]).unwrap();
        let order: Vec<_> = grid.cells().map(|(r, c, v)| (r, c, *v)).collect();
        assert_eq!(order, vec![(0, 0, 'a'), (0, 1, 'b'), (1, 0, 'c'), (1, 1, 'd')]);
    }

    #[test]
    fn test_from_fn_is_square() {
        let grid = Grid::from_fn(3, |r, c| r * 3 + c);
        assert_eq!(grid.size(), 3);
        assert_eq!(grid.get(2, 1), Some(&7));
    }

    #[test]
    fn test_replace_in_and_out_of_bounds() {
        let mut grid = Grid::filled(2, 0u8);
        assert_eq!(grid.replace(1, 0, 7), Some(0));
        assert_eq!(grid.get(1, 0), Some(&7));
        assert_eq!(grid.replace(2, 0, 9), None);
    }

    #[test]
    fn test_try_map_stops_at_first_error() {
        let grid = Grid::from_rows(vec![vec![1, -1], vec![-2, 4]]).unwrap();
        let result: Result<Grid<u32>, (usize, usize)> =
            grid.try_map(|r, c, v| u32::try_from(*v).map_err(|_| (r, c)));
        assert_eq!(result.unwrap_err(), (0, 1));
    }

    #[test]
    fn test_deserialize_validates_shape() {
        let ok: Grid<u8> = serde_json::from_str("[[1,2],[3,4]]").unwrap();
        assert_eq!(ok.size(), 2);
        assert!(serde_json::from_str::<Grid<u8>>("[[1,2],[3]]").is_err());
    }
}
