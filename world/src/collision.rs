//! Movement legality checks against tiles and placed objects.

use tidefall_core::{BoundingBox, CellCoord, TileSet, WorldPoint};

use crate::{grid::TileGrid, objects::ObjectIndex};

/// Borrowed state consulted by collision queries.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CollisionScene<'a> {
    pub(crate) grid: &'a TileGrid,
    pub(crate) tiles: &'a TileSet,
    pub(crate) objects: &'a ObjectIndex,
    pub(crate) tile_size: u32,
}

impl CollisionScene<'_> {
    /// Reports whether `bounds`, synchronized to `target`, overlaps nothing solid.
    ///
    /// Only the cells touched by the hypothetical box are inspected. Cells
    /// outside the grid hold no tile and never block.
    pub(crate) fn can_move(&self, bounds: &BoundingBox, target: WorldPoint) -> bool {
        let hypothetical = bounds.positioned_at(target);

        for (column, row) in covered_cells(&hypothetical, self.tile_size) {
            let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row)) else {
                continue;
            };
            let cell = CellCoord::new(column, row);

            if self.solid_tile_blocks(cell, &hypothetical) {
                return false;
            }

            if self.solid_object_blocks(cell, &hypothetical) {
                return false;
            }
        }

        true
    }

    fn solid_tile_blocks(&self, cell: CellCoord, hypothetical: &BoundingBox) -> bool {
        let Some(tile) = self.grid.tile(cell) else {
            return false;
        };

        self.tiles.is_solid(tile)
            && BoundingBox::tile(cell, self.tile_size).intersects(hypothetical)
    }

    fn solid_object_blocks(&self, cell: CellCoord, hypothetical: &BoundingBox) -> bool {
        self.objects
            .get(cell.origin(self.tile_size))
            .is_some_and(|object| object.is_solid() && object.bounds.intersects(hypothetical))
    }
}

/// Inclusive tile index ranges covered by a box, in row-major order.
fn covered_cells(bounds: &BoundingBox, tile_size: u32) -> impl Iterator<Item = (i64, i64)> {
    let range = if bounds.is_empty() || tile_size == 0 {
        None
    } else {
        let size = i64::from(tile_size);
        let left = i64::from(bounds.x());
        let top = i64::from(bounds.y());
        let right = left + i64::from(bounds.width()) - 1;
        let bottom = top + i64::from(bounds.height()) - 1;
        Some((
            left.div_euclid(size),
            right.div_euclid(size),
            top.div_euclid(size),
            bottom.div_euclid(size),
        ))
    };

    range.into_iter().flat_map(|(first_column, last_column, first_row, last_row)| {
        (first_row..=last_row)
            .flat_map(move |row| (first_column..=last_column).map(move |column| (column, row)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidefall_core::{Anchor, ObjectKind, PlacedObject, TileId};

    const TILE: u32 = 32;

    struct Fixture {
        grid: TileGrid,
        tiles: TileSet,
        objects: ObjectIndex,
    }

    impl Fixture {
        fn open_field() -> Self {
            let tiles = TileSet::standard();
            let sand = tiles.lookup("sand").expect("sand registered");
            Self {
                grid: TileGrid::filled(4, 4, sand).expect("grid"),
                tiles,
                objects: ObjectIndex::new(),
            }
        }

        fn tile(&self, name: &str) -> TileId {
            self.tiles.lookup(name).expect("tile registered")
        }

        fn scene(&self) -> CollisionScene<'_> {
            CollisionScene {
                grid: &self.grid,
                tiles: &self.tiles,
                objects: &self.objects,
                tile_size: TILE,
            }
        }
    }

    #[test]
    fn covered_cells_span_every_overlapped_tile() {
        let bounds = BoundingBox::new(20, 20, 20, 20);
        let cells: Vec<_> = covered_cells(&bounds, TILE).collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn covered_cells_exclude_exact_right_edge() {
        let bounds = BoundingBox::new(0, 0, 32, 32);
        let cells: Vec<_> = covered_cells(&bounds, TILE).collect();
        assert_eq!(cells, vec![(0, 0)]);
    }

    #[test]
    fn covered_cells_floor_negative_positions() {
        let bounds = BoundingBox::new(-4, 0, 8, 8);
        let cells: Vec<_> = covered_cells(&bounds, TILE).collect();
        assert_eq!(cells, vec![(-1, 0), (0, 0)]);
    }

    #[test]
    fn empty_boxes_cover_nothing() {
        let bounds = BoundingBox::new(0, 0, 0, 8);
        assert_eq!(covered_cells(&bounds, TILE).count(), 0);
    }

    #[test]
    fn solid_tile_blocks_overlapping_box() {
        let mut fixture = Fixture::open_field();
        let rock = fixture.tile("rock");
        assert!(fixture.grid.set_tile(CellCoord::new(1, 0), rock));
        let bounds = BoundingBox::new(0, 0, 16, 16);

        assert!(fixture.scene().can_move(&bounds, WorldPoint::new(16, 0)));
        assert!(!fixture.scene().can_move(&bounds, WorldPoint::new(17, 0)));
    }

    #[test]
    fn tree_blocks_only_with_its_trunk() {
        let mut fixture = Fixture::open_field();
        let cell = CellCoord::new(1, 1);
        let origin = cell.origin(TILE);
        fixture
            .objects
            .insert(origin, PlacedObject::at(ObjectKind::Tree, origin, TILE))
            .expect("free cell");
        let bounds = BoundingBox::anchored(Anchor::TopLeft, TILE, TILE, 8, 8);

        assert!(fixture.scene().can_move(&bounds, WorldPoint::new(32, 32)));
        assert!(!fixture.scene().can_move(&bounds, WorldPoint::new(44, 56)));
    }

    #[test]
    fn passable_objects_never_block() {
        let mut fixture = Fixture::open_field();
        let origin = CellCoord::new(0, 0).origin(TILE);
        fixture
            .objects
            .insert(origin, PlacedObject::at(ObjectKind::Bush, origin, TILE))
            .expect("free cell");
        let bounds = BoundingBox::new(0, 0, 16, 16);

        assert!(fixture.scene().can_move(&bounds, WorldPoint::new(4, 4)));
    }

    #[test]
    fn cells_outside_grid_are_passable() {
        let fixture = Fixture::open_field();
        let bounds = BoundingBox::new(0, 0, 16, 16);

        assert!(fixture.scene().can_move(&bounds, WorldPoint::new(-40, -40)));
        assert!(fixture.scene().can_move(&bounds, WorldPoint::new(500, 12)));
    }
}
