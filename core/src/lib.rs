#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tidefall engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the flood system. Callers submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and reports every resulting change as [`Event`]
//! values appended to a caller-owned buffer. Nothing registers callbacks.

mod bounds;
mod tiles;

pub use bounds::{Anchor, BoundingBox};
pub use tiles::{TileDefinition, TileId, TileSet, TileSetError, TileView, WATER_TILE_NAME};

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Adds a tracked actor at the provided logical position.
    SpawnActor {
        /// Logical position of the new actor.
        position: WorldPoint,
        /// Anchored collision box; it is synchronized to `position` on spawn.
        bounds: BoundingBox,
    },
    /// Requests that an actor relocate to an absolute logical position.
    MoveActor {
        /// Identifier of the actor attempting to move.
        actor: ActorId,
        /// Target logical x coordinate in pixels.
        x: i32,
        /// Target logical y coordinate in pixels.
        y: i32,
    },
    /// Requests that an actor walk a number of pixels in a direction.
    StepActor {
        /// Identifier of the actor attempting to move.
        actor: ActorId,
        /// Direction of travel; `None` leaves the actor in place.
        direction: Option<Direction>,
        /// Number of pixels to travel.
        distance: u32,
    },
    /// Requests placement of an object anchored at the provided cell.
    PlaceObject {
        /// Cell whose world origin keys the object.
        cell: CellCoord,
        /// Kind of object to place.
        kind: ObjectKind,
    },
    /// Requests removal of the object anchored at the provided cell.
    RemoveObject {
        /// Cell whose world origin keys the object.
        cell: CellCoord,
    },
    /// Converts the provided cells to water, in order, evacuating actors.
    FloodTiles {
        /// Frontier cells selected for this wave.
        cells: Vec<CellCoord>,
        /// Tile identifier written into every flooded cell.
        water: TileId,
    },
}

/// Events reported by the world and the flood system after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new actor joined the world.
    ActorSpawned {
        /// Identifier allocated to the actor.
        actor: ActorId,
        /// Logical position of the actor.
        position: WorldPoint,
    },
    /// Confirms that an actor moved.
    ActorMoved {
        /// Identifier of the actor that moved.
        actor: ActorId,
        /// Logical position before the move.
        from: WorldPoint,
        /// Logical position after the move.
        to: WorldPoint,
    },
    /// Reports that a movement request collided and was discarded.
    MovementBlocked {
        /// Identifier of the actor whose move was rejected.
        actor: ActorId,
        /// Logical position the actor attempted to reach.
        attempted: WorldPoint,
    },
    /// Confirms that an object was placed.
    ObjectPlaced {
        /// Cell keying the object.
        cell: CellCoord,
        /// Kind of the placed object.
        kind: ObjectKind,
    },
    /// Reports that a placement request was rejected.
    ObjectPlacementRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Kind provided in the request.
        kind: ObjectKind,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that an object was removed on request.
    ObjectRemoved {
        /// Cell that keyed the object.
        cell: CellCoord,
        /// Kind of the removed object.
        kind: ObjectKind,
    },
    /// Reports that a removal request found nothing to remove.
    ObjectRemovalRejected {
        /// Cell provided in the request.
        cell: CellCoord,
    },
    /// Reports that a cell was converted to water.
    TileFlooded {
        /// Cell that flooded.
        cell: CellCoord,
    },
    /// Reports that an object was swept away by the flood.
    ObjectSubmerged {
        /// Cell that keyed the object.
        cell: CellCoord,
        /// Kind of the lost object.
        kind: ObjectKind,
    },
    /// Reports that an actor was relocated away from a flooding cell.
    ActorEvacuated {
        /// Identifier of the relocated actor.
        actor: ActorId,
        /// Cell the actor stood on when it flooded.
        from: CellCoord,
        /// Safe cell the actor now occupies.
        to: CellCoord,
    },
    /// Reports that no safe cell was reachable for an actor.
    EvacuationFailed {
        /// Identifier of the stranded actor.
        actor: ActorId,
        /// Cell the actor stood on when it flooded.
        cell: CellCoord,
    },
    /// Announces that a wave finished and the tide calmed again.
    WaveCompleted {
        /// Number of cells converted during the wave.
        flooded: u32,
    },
    /// Announces that the world is fully submerged. No further waves follow.
    WorldSubmerged,
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in the order breadth-first searches expand them.
    pub const EXPANSION_ORDER: [Direction; 4] = [Self::North, Self::South, Self::West, Self::East];

    /// Unit step along the x and y axes.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Unique identifier assigned to a tracked actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Neighbouring cell one step toward `direction`, if it does not underflow.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(CellCoord::new(column, row))
    }

    /// World-space origin (top-left pixel) of the cell.
    #[must_use]
    pub fn origin(self, tile_size: u32) -> WorldPoint {
        let size = i64::from(tile_size);
        WorldPoint::new(
            clamp_i32(i64::from(self.column) * size),
            clamp_i32(i64::from(self.row) * size),
        )
    }
}

/// Position in world space measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldPoint {
    x: i32,
    y: i32,
}

impl WorldPoint {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Point shifted `distance` pixels toward `direction`.
    #[must_use]
    pub fn stepped(self, direction: Option<Direction>, distance: u32) -> Self {
        let Some(direction) = direction else {
            return self;
        };
        let (dx, dy) = direction.delta();
        let distance = i32::try_from(distance).unwrap_or(i32::MAX);
        Self::new(
            self.x.saturating_add(dx.saturating_mul(distance)),
            self.y.saturating_add(dy.saturating_mul(distance)),
        )
    }

    /// Column and row indices of the tile containing the point.
    ///
    /// Uses floor division, so points left of or above the origin map to
    /// negative indices. Returns `None` when `tile_size` is zero.
    #[must_use]
    pub fn tile_indices(self, tile_size: u32) -> Option<(i64, i64)> {
        if tile_size == 0 {
            return None;
        }
        let size = i64::from(tile_size);
        Some((
            i64::from(self.x).div_euclid(size),
            i64::from(self.y).div_euclid(size),
        ))
    }

    /// Cell containing the point, or `None` for negative coordinates.
    #[must_use]
    pub fn cell(self, tile_size: u32) -> Option<CellCoord> {
        let (column, row) = self.tile_indices(tile_size)?;
        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Kinds of objects that can be placed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Tree whose trunk blocks movement.
    Tree,
    /// Boulder filling its whole tile.
    Rock,
    /// Shrub actors can walk through.
    Bush,
    /// Loose wood lying on the ground.
    Driftwood,
}

impl ObjectKind {
    /// Whether the object blocks actor movement.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        match self {
            Self::Tree | Self::Rock => true,
            Self::Bush | Self::Driftwood => false,
        }
    }

    /// Collision footprint of the object anchored inside one tile.
    ///
    /// A tree only blocks with its trunk: a box half a tile wide and a
    /// quarter tile high resting on the bottom edge.
    #[must_use]
    pub fn footprint(self, tile_size: u32) -> BoundingBox {
        match self {
            Self::Tree => BoundingBox::anchored(
                Anchor::BottomCenter,
                tile_size,
                tile_size,
                tile_size / 2,
                tile_size / 4,
            ),
            Self::Rock | Self::Bush => BoundingBox::new(0, 0, tile_size, tile_size),
            Self::Driftwood => BoundingBox::anchored(
                Anchor::BottomCenter,
                tile_size,
                tile_size,
                tile_size,
                tile_size / 2,
            ),
        }
    }
}

/// Object stored in the world's sparse object index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedObject {
    /// Kind of the object.
    pub kind: ObjectKind,
    /// Collision box positioned in world space.
    pub bounds: BoundingBox,
}

impl PlacedObject {
    /// Builds an object of `kind` anchored at the tile whose origin is `origin`.
    #[must_use]
    pub fn at(kind: ObjectKind, origin: WorldPoint, tile_size: u32) -> Self {
        Self {
            kind,
            bounds: kind.footprint(tile_size).positioned_at(origin),
        }
    }

    /// Whether the object blocks actor movement.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }
}

/// Reasons an object placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// Another object already occupies the cell.
    Occupied,
    /// The requested cell is already under water.
    Submerged,
}

/// Immutable representation of a single actor used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Logical position of the actor.
    pub position: WorldPoint,
    /// Collision box synchronized with the logical position.
    pub bounds: BoundingBox,
}

/// Read-only snapshot describing all tracked actors.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }
}
