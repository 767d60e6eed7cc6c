//! Axis-aligned bounding boxes measured in world pixels.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, Direction, WorldPoint};

/// Policy used to derive a box offset from the frame of its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// Box shares the owner's top-left corner.
    TopLeft,
    /// Box is centred inside the owner's frame.
    Center,
    /// Box is centred horizontally and rests on the bottom edge of the frame.
    BottomCenter,
}

impl Anchor {
    /// Computes the offset of a `width` x `height` box inside a frame.
    #[must_use]
    pub fn offset(
        self,
        frame_width: u32,
        frame_height: u32,
        width: u32,
        height: u32,
    ) -> (i32, i32) {
        let centered_x = (extent(frame_width) - extent(width)) / 2;
        match self {
            Self::TopLeft => (0, 0),
            Self::Center => (centered_x, (extent(frame_height) - extent(height)) / 2),
            Self::BottomCenter => (centered_x, extent(frame_height) - extent(height)),
        }
    }
}

/// Axis-aligned rectangle carrying a fixed anchor offset.
///
/// The offset is chosen once at construction. Every call to
/// [`BoundingBox::update_position`] places the box at the owner's logical
/// position shifted by that offset, so an actor's collision footprint can be
/// smaller than its sprite frame (for example only the feet of a character).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    offset_x: i32,
    offset_y: i32,
}

impl BoundingBox {
    /// Creates a box at the provided position without any anchor offset.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Creates a box whose offset is derived from `anchor` within a frame.
    ///
    /// The box starts synchronized to a logical position of `(0, 0)`.
    #[must_use]
    pub fn anchored(
        anchor: Anchor,
        frame_width: u32,
        frame_height: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let (offset_x, offset_y) = anchor.offset(frame_width, frame_height, width, height);
        Self {
            x: offset_x,
            y: offset_y,
            width,
            height,
            offset_x,
            offset_y,
        }
    }

    /// Synthetic box covering exactly one grid cell.
    #[must_use]
    pub fn tile(cell: CellCoord, tile_size: u32) -> Self {
        let origin = cell.origin(tile_size);
        Self::new(origin.x(), origin.y(), tile_size, tile_size)
    }

    /// Left edge of the box.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Top edge of the box.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Horizontal extent in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Vertical extent in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Anchor offset applied by [`BoundingBox::update_position`].
    #[must_use]
    pub const fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(extent(self.width))
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(extent(self.height))
    }

    /// Reports whether the box covers no area at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true when both boxes overlap with a positive area.
    ///
    /// Boxes that merely share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns true when the point lies inside the box or on any of its edges.
    #[must_use]
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Synchronizes the box with an owner located at `(x, y)`.
    pub fn update_position(&mut self, x: i32, y: i32) {
        self.x = x.saturating_add(self.offset_x);
        self.y = y.saturating_add(self.offset_y);
    }

    /// Copy of the box synchronized with an owner located at `position`.
    #[must_use]
    pub fn positioned_at(&self, position: WorldPoint) -> Self {
        let mut copy = *self;
        copy.update_position(position.x(), position.y());
        copy
    }

    /// Translates the box by the provided deltas, ignoring the anchor offset.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    /// Translates the box `distance` pixels toward `direction`.
    ///
    /// A missing direction leaves the box untouched.
    pub fn move_towards(&mut self, direction: Option<Direction>, distance: u32) {
        let Some(direction) = direction else {
            return;
        };

        let (dx, dy) = direction.delta();
        let distance = extent(distance);
        self.translate(dx.saturating_mul(distance), dy.saturating_mul(distance));
    }
}

fn extent(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersects_is_symmetric() {
        let boxes = [
            BoundingBox::new(0, 0, 10, 10),
            BoundingBox::new(5, 5, 10, 10),
            BoundingBox::new(10, 0, 4, 4),
            BoundingBox::new(-3, -3, 4, 4),
            BoundingBox::new(2, 2, 0, 6),
        ];

        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.intersects(b), b.intersects(a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn edge_touching_boxes_do_not_intersect() {
        let left = BoundingBox::new(30, 0, 30, 30);
        let right = BoundingBox::new(60, 0, 30, 30);
        let below = BoundingBox::new(30, 30, 30, 30);

        assert!(!left.intersects(&right));
        assert!(!left.intersects(&below));
        assert!(left.intersects(&BoundingBox::new(59, 29, 30, 30)));
    }

    #[test]
    fn zero_area_boxes_never_intersect() {
        let sliver = BoundingBox::new(5, 0, 0, 10);
        let wide = BoundingBox::new(0, 0, 10, 10);
        assert!(!sliver.intersects(&wide));
    }

    #[test]
    fn contains_point_is_inclusive_on_every_edge() {
        let bounds = BoundingBox::new(10, 20, 5, 5);
        assert!(bounds.contains_point(10, 20));
        assert!(bounds.contains_point(15, 25));
        assert!(bounds.contains_point(15, 20));
        assert!(!bounds.contains_point(16, 25));
        assert!(!bounds.contains_point(10, 19));
    }

    #[test]
    fn update_position_applies_anchor_offset() {
        let mut feet = BoundingBox::anchored(Anchor::BottomCenter, 32, 32, 16, 8);
        assert_eq!(feet.offset(), (8, 24));

        feet.update_position(64, 96);
        assert_eq!((feet.x(), feet.y()), (72, 120));
    }

    #[test]
    fn centered_anchor_splits_slack_evenly() {
        assert_eq!(Anchor::Center.offset(32, 32, 20, 10), (6, 11));
        assert_eq!(Anchor::TopLeft.offset(32, 32, 20, 10), (0, 0));
    }

    #[test]
    fn move_without_direction_is_noop() {
        let mut bounds = BoundingBox::new(4, 4, 2, 2);
        bounds.move_towards(None, 50);
        assert_eq!((bounds.x(), bounds.y()), (4, 4));

        bounds.move_towards(Some(Direction::West), 3);
        assert_eq!((bounds.x(), bounds.y()), (1, 4));
        bounds.move_towards(Some(Direction::South), 2);
        assert_eq!((bounds.x(), bounds.y()), (1, 6));
    }

    #[test]
    fn copies_are_independent_and_keep_offset() {
        let original = BoundingBox::anchored(Anchor::Center, 32, 32, 16, 16);
        let mut copy = original;
        copy.update_position(100, 100);

        assert_eq!(copy.offset(), original.offset());
        assert_eq!((original.x(), original.y()), (8, 8));
        assert_eq!((copy.x(), copy.y()), (108, 108));
    }

    #[test]
    fn tile_box_matches_cell_extents() {
        let tile = BoundingBox::tile(CellCoord::new(2, 3), 32);
        assert_eq!((tile.x(), tile.y(), tile.right(), tile.bottom()), (64, 96, 96, 128));
    }
}
