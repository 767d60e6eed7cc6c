//! Breadth-first search for the closest cell an actor can safely stand on.

use std::collections::VecDeque;

use tidefall_core::{CellCoord, Direction};

/// Finds the first cell, in breadth-first order from `start`, accepted by `is_safe`.
///
/// The search walks the 4-neighbourhood of a `columns` x `rows` grid and
/// expands neighbours north, south, west, east. The start cell is tested
/// like any other. The result is therefore at minimum graph distance from
/// `start`, not necessarily at minimum Euclidean distance. Returns `None` when
/// `start` lies outside the grid or no reachable cell qualifies.
pub(crate) fn find_nearest_safe<F>(
    columns: u32,
    rows: u32,
    start: CellCoord,
    mut is_safe: F,
) -> Option<CellCoord>
where
    F: FnMut(CellCoord) -> bool,
{
    let width = usize::try_from(columns).ok()?;
    let cell_count = width.checked_mul(usize::try_from(rows).ok()?)?;
    let inside = |cell: CellCoord| cell.column() < columns && cell.row() < rows;

    if !inside(start) {
        return None;
    }

    let mut visited = vec![false; cell_count];
    let mut queue = VecDeque::new();
    visited[index(width, start)?] = true;
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if is_safe(cell) {
            return Some(cell);
        }

        for direction in Direction::EXPANSION_ORDER {
            let Some(neighbor) = cell.step(direction).filter(|candidate| inside(*candidate)) else {
                continue;
            };
            let Some(slot) = index(width, neighbor).and_then(|offset| visited.get_mut(offset))
            else {
                continue;
            };
            if *slot {
                continue;
            }

            *slot = true;
            queue.push_back(neighbor);
        }
    }

    None
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
