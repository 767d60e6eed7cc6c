//! Selection of the cells the next wave converts.

use tidefall_core::{CellCoord, Direction, TileId, TileView};

/// Collects every dry cell that borders water or the grid edge, row by row.
///
/// Cells outside the grid count as water, so an all-land map floods from its
/// rim inward.
#[must_use]
pub fn frontier(tiles: TileView<'_>, water: TileId) -> Vec<CellCoord> {
    tiles
        .iter()
        .filter(|(cell, tile)| *tile != water && borders_water(tiles, *cell, water))
        .map(|(cell, _)| cell)
        .collect()
}

fn borders_water(tiles: TileView<'_>, cell: CellCoord, water: TileId) -> bool {
    Direction::EXPANSION_ORDER.into_iter().any(|direction| {
        cell.step(direction)
            .and_then(|neighbor| tiles.tile(neighbor))
            .map_or(true, |tile| tile == water)
    })
}
