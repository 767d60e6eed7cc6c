//! Dense tile storage owned by the world.

use tidefall_core::{CellCoord, TileId, TileView};

use crate::WorldError;

/// Fixed-size row-major arena of tile identifiers.
///
/// Every cell holds exactly one identifier for the lifetime of the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    cells: Vec<TileId>,
}

impl TileGrid {
    /// Creates a grid where every cell holds `tile`.
    pub fn filled(columns: u32, rows: u32, tile: TileId) -> Result<Self, WorldError> {
        let capacity = capacity(columns, rows)?;
        Ok(Self {
            columns,
            rows,
            cells: vec![tile; capacity],
        })
    }

    /// Creates a grid from row-major cell contents.
    pub fn from_cells(columns: u32, rows: u32, cells: Vec<TileId>) -> Result<Self, WorldError> {
        let expected = capacity(columns, rows)?;
        if cells.len() != expected {
            return Err(WorldError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Tile stored at the cell, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the tile at the cell. Returns `false` outside the grid.
    pub fn set_tile(&mut self, cell: CellCoord, tile: TileId) -> bool {
        match self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// Number of cells holding `tile`.
    #[must_use]
    pub fn count(&self, tile: TileId) -> usize {
        self.cells.iter().filter(|candidate| **candidate == tile).count()
    }

    /// Iterates over every stored identifier in row-major order.
    pub(crate) fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.cells.iter().copied()
    }

    /// Read-only view handed to systems and presentation code.
    #[must_use]
    pub fn view(&self) -> TileView<'_> {
        TileView::new(&self.cells, self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn capacity(columns: u32, rows: u32) -> Result<usize, WorldError> {
    if columns == 0 || rows == 0 {
        return Err(WorldError::EmptyGrid);
    }

    let capacity_u64 = u64::from(columns) * u64::from(rows);
    usize::try_from(capacity_u64).map_err(|_| WorldError::EmptyGrid)
}
