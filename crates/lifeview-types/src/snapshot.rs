//! Validated, immutable snapshots of remote simulation state.
//!
//! A snapshot is built once from a service reply and never patched
//! afterwards; newer state arrives as a whole new snapshot. Validation
//! happens here so that a malformed reply is rejected before it can reach
//! the local mirror.

use serde::{Deserialize, Serialize};

use crate::stage::{Stage, StageDistribution};
use crate::wire::{GridReply, SpeciesReply, WireCell};

/// Errors raised when a reply does not describe a well-formed snapshot.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The matrix has a different number of rows than the session grid.
    #[error("grid has {actual} rows, expected {expected}")]
    RowCount {
        /// Rows in the session grid.
        expected: u32,
        /// Rows in the reply.
        actual: usize,
    },

    /// A row has a different number of columns than the session grid.
    #[error("grid row {row} has {actual} columns, expected {expected}")]
    ColumnCount {
        /// Index of the offending row.
        row: usize,
        /// Columns in the session grid.
        expected: u32,
        /// Columns in the offending row.
        actual: usize,
    },

    /// The grid dimensions do not fit in memory on this platform.
    #[error("grid dimensions {width}x{height} overflow")]
    Dimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// A grid coordinate. The first index is the row (vertical), the second the
/// column (horizontal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Vertical position, `0..height`.
    pub row: u32,
    /// Horizontal position, `0..width`.
    pub col: u32,
}

impl Cell {
    /// Create a cell coordinate.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl From<WireCell> for Cell {
    fn from((row, col): WireCell) -> Self {
        Self { row, col }
    }
}

/// The live/dead state of the whole grid at one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    width: u32,
    height: u32,
    /// Row-major liveness, `width * height` entries.
    cells: Vec<bool>,
    generation: u64,
    live_cell_count: u64,
}

impl GridSnapshot {
    /// An all-dead grid at generation 0, used before the first refresh.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Dimensions`] if `width * height` overflows.
    pub fn empty(width: u32, height: u32) -> Result<Self, SnapshotError> {
        let len = cell_len(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![false; len],
            generation: 0,
            live_cell_count: 0,
        })
    }

    /// Validate a `GET /api/grid` reply against the session dimensions.
    ///
    /// The live cell count is taken from the reply's `live_cells` list, as
    /// reported by the service.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the matrix is not exactly `height` rows
    /// of `width` entries.
    pub fn from_reply(reply: &GridReply, width: u32, height: u32) -> Result<Self, SnapshotError> {
        let len = cell_len(width, height)?;
        let expected_rows = usize::try_from(height).map_err(|_err| SnapshotError::Dimensions {
            width,
            height,
        })?;
        let expected_cols = usize::try_from(width).map_err(|_err| SnapshotError::Dimensions {
            width,
            height,
        })?;

        if reply.grid.len() != expected_rows {
            return Err(SnapshotError::RowCount {
                expected: height,
                actual: reply.grid.len(),
            });
        }

        let mut cells = Vec::with_capacity(len);
        for (row, values) in reply.grid.iter().enumerate() {
            if values.len() != expected_cols {
                return Err(SnapshotError::ColumnCount {
                    row,
                    expected: width,
                    actual: values.len(),
                });
            }
            cells.extend(values.iter().map(|v| *v != 0));
        }

        Ok(Self {
            width,
            height,
            cells,
            generation: reply.generation,
            live_cell_count: u64::try_from(reply.live_cells.len()).unwrap_or(u64::MAX),
        })
    }

    /// Grid width in cells.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Remote generation counter.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of live cells reported by the service.
    pub const fn live_cell_count(&self) -> u64 {
        self.live_cell_count
    }

    /// Total number of cells, `width * height`.
    pub const fn total_cells(&self) -> u64 {
        (self.width as u64).saturating_mul(self.height as u64)
    }

    /// Whether `cell` lies inside the grid.
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Whether the cell is alive. Out-of-bounds cells are dead.
    pub fn is_alive(&self, cell: Cell) -> bool {
        self.index_of(cell)
            .and_then(|i| self.cells.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Iterate the live cells in row-major order.
    pub fn live_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .filter_map(move |(i, _)| {
                let i = u32::try_from(i).ok()?;
                Some(Cell::new(i.checked_div(width)?, i.checked_rem(width)?))
            })
    }

    fn index_of(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row).ok()?;
        let col = usize::try_from(cell.col).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(col)
    }
}

/// Number of entries in a `width * height` grid, checked for overflow.
fn cell_len(width: u32, height: u32) -> Result<usize, SnapshotError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    w.zip(h)
        .and_then(|(w, h)| w.checked_mul(h))
        .ok_or(SnapshotError::Dimensions { width, height })
}

/// A set of cells the service reports together, with a maturity stage.
///
/// Groups carry no identity: two snapshots may describe the same colony with
/// unrelated groups, and nothing links them across snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageGroup {
    /// Maturity stage.
    pub stage: Stage,
    /// Member cells in reply order.
    pub cells: Vec<Cell>,
    /// Survival time reported by the service, if any. Informational only.
    pub survival_time: Option<f64>,
    /// Progress towards the next stage reported by the service, if any.
    pub evolution_progress: Option<f64>,
}

impl LineageGroup {
    /// Create a group with no informational fields.
    pub fn new(stage: impl Into<Stage>, cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            stage: stage.into(),
            cells: cells.into_iter().collect(),
            survival_time: None,
            evolution_progress: None,
        }
    }
}

/// Every lineage group of one generation, plus the service's group count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSnapshot {
    groups: Vec<LineageGroup>,
    species_count: u64,
}

impl SpeciesSnapshot {
    /// Build a snapshot directly from groups (count = number of groups).
    pub fn new(groups: Vec<LineageGroup>) -> Self {
        let species_count = u64::try_from(groups.len()).unwrap_or(u64::MAX);
        Self {
            groups,
            species_count,
        }
    }

    /// Convert a `GET /api/species` reply.
    pub fn from_reply(reply: SpeciesReply) -> Self {
        let groups = reply
            .species
            .into_iter()
            .map(|entry| LineageGroup {
                stage: Stage(entry.stage),
                cells: entry.group.into_iter().map(Cell::from).collect(),
                survival_time: entry.survival_time,
                evolution_progress: entry.evolution_progress,
            })
            .collect();
        Self {
            groups,
            species_count: reply.species_count,
        }
    }

    /// Groups in reply order.
    pub fn groups(&self) -> &[LineageGroup] {
        &self.groups
    }

    /// Number of groups as counted by the service.
    pub const fn species_count(&self) -> u64 {
        self.species_count
    }

    /// Per-tier group counts for status displays.
    pub fn stage_distribution(&self) -> StageDistribution {
        StageDistribution::from_stages(self.groups.iter().map(|g| g.stage))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::wire::SpeciesEntry;

    fn reply(grid: Vec<Vec<u8>>, generation: u64) -> GridReply {
        let mut live_cells = Vec::new();
        for (r, row) in grid.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                if *v != 0 {
                    live_cells.push((u32::try_from(r).unwrap(), u32::try_from(c).unwrap()));
                }
            }
        }
        GridReply {
            grid,
            generation,
            live_cells,
        }
    }

    #[test]
    fn empty_grid_is_all_dead() {
        let grid = GridSnapshot::empty(4, 3).unwrap();
        assert_eq!(grid.total_cells(), 12);
        assert_eq!(grid.live_cell_count(), 0);
        assert_eq!(grid.live_cells().count(), 0);
        assert_eq!(grid.generation(), 0);
    }

    #[test]
    fn reply_is_indexed_row_first() {
        let grid = GridSnapshot::from_reply(&reply(vec![vec![0, 1, 0], vec![0, 0, 1]], 7), 3, 2)
            .unwrap();
        assert!(grid.is_alive(Cell::new(0, 1)));
        assert!(grid.is_alive(Cell::new(1, 2)));
        assert!(!grid.is_alive(Cell::new(1, 0)));
        assert!(!grid.is_alive(Cell::new(5, 5)));
        assert_eq!(grid.generation(), 7);
        assert_eq!(grid.live_cell_count(), 2);
        let live: Vec<_> = grid.live_cells().collect();
        assert_eq!(live, vec![Cell::new(0, 1), Cell::new(1, 2)]);
    }

    #[test]
    fn wrong_row_count_is_rejected() {
        let err = GridSnapshot::from_reply(&reply(vec![vec![0, 0]], 0), 2, 2).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::RowCount {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err =
            GridSnapshot::from_reply(&reply(vec![vec![0, 0], vec![0]], 0), 2, 2).unwrap_err();
        assert!(matches!(err, SnapshotError::ColumnCount { row: 1, .. }));
    }

    #[test]
    fn species_reply_converts_groups() {
        let snapshot = SpeciesSnapshot::from_reply(SpeciesReply {
            species: vec![
                SpeciesEntry {
                    stage: 3,
                    group: vec![(5, 5), (5, 6)],
                    survival_time: Some(1.5),
                    evolution_progress: None,
                },
                SpeciesEntry {
                    stage: 1,
                    group: vec![(0, 0)],
                    survival_time: None,
                    evolution_progress: None,
                },
            ],
            species_count: 2,
        });
        assert_eq!(snapshot.species_count(), 2);
        let first = snapshot.groups().first().unwrap();
        assert_eq!(first.stage, Stage(3));
        assert_eq!(first.cells, vec![Cell::new(5, 5), Cell::new(5, 6)]);
        assert_eq!(snapshot.stage_distribution().total(), 2);
    }
}
