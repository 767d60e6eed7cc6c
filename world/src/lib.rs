#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tidefall.
//!
//! The world owns the tile grid, the sparse object index, and every tracked
//! actor. Mutations happen exclusively through [`apply`]; everything else
//! reads through the [`query`] module.

mod collision;
mod evacuation;
mod grid;
mod objects;

pub use grid::TileGrid;
pub use objects::ObjectIndex;

use tidefall_core::{
    ActorId, BoundingBox, CellCoord, Command, Event, ObjectKind, PlacedObject, PlacementError,
    TileId, TileSet, WorldPoint, WATER_TILE_NAME,
};

use collision::CollisionScene;

/// Errors raised while assembling a world.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorldError {
    /// The grid has zero columns or zero rows.
    #[error("tile grid must have at least one column and one row")]
    EmptyGrid,
    /// The number of supplied cells does not match the grid dimensions.
    #[error("tile grid expects {expected} cells, got {actual}")]
    CellCountMismatch {
        /// Cells implied by the dimensions.
        expected: usize,
        /// Cells actually supplied.
        actual: usize,
    },
    /// The grid references a tile the tile set does not define.
    #[error("tile {0:?} is not registered in the tile set")]
    UnknownTile(TileId),
    /// Tiles must span at least one pixel.
    #[error("tile size must be greater than zero")]
    ZeroTileSize,
    /// The tile set has no tile with the requested water name.
    #[error("tile set has no water tile named `{0}`")]
    UnknownWaterTile(String),
}

/// Represents the authoritative Tidefall world state.
#[derive(Debug)]
pub struct World {
    tiles: TileSet,
    grid: TileGrid,
    objects: ObjectIndex,
    actors: Vec<Actor>,
    next_actor_id: ActorId,
    tile_size: u32,
    water: TileId,
}

impl World {
    /// Creates a world over the provided grid whose water is the tile named
    /// [`WATER_TILE_NAME`].
    ///
    /// Fails when `tile_size` is zero, the grid holds identifiers the tile
    /// set does not define, or the tile set has no water tile.
    pub fn new(tiles: TileSet, grid: TileGrid, tile_size: u32) -> Result<Self, WorldError> {
        Self::with_water_tile(tiles, grid, tile_size, WATER_TILE_NAME)
    }

    /// Creates a world whose water is the tile registered as `water`.
    ///
    /// Objects are never placed on cells holding that tile.
    pub fn with_water_tile(
        tiles: TileSet,
        grid: TileGrid,
        tile_size: u32,
        water: &str,
    ) -> Result<Self, WorldError> {
        if tile_size == 0 {
            return Err(WorldError::ZeroTileSize);
        }

        if let Some(unknown) = grid.tiles().find(|tile| tiles.definition(*tile).is_none()) {
            return Err(WorldError::UnknownTile(unknown));
        }

        let water = tiles
            .lookup(water)
            .ok_or_else(|| WorldError::UnknownWaterTile(water.to_owned()))?;

        Ok(Self {
            tiles,
            grid,
            objects: ObjectIndex::new(),
            actors: Vec::new(),
            next_actor_id: ActorId::new(0),
            tile_size,
            water,
        })
    }

    fn scene(&self) -> CollisionScene<'_> {
        CollisionScene {
            grid: &self.grid,
            tiles: &self.tiles,
            objects: &self.objects,
            tile_size: self.tile_size,
        }
    }

    fn actor(&self, actor: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|candidate| candidate.id == actor)
    }

    fn actor_mut(&mut self, actor: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|candidate| candidate.id == actor)
    }

    fn allocate_actor_id(&mut self) -> ActorId {
        let id = self.next_actor_id;
        self.next_actor_id = ActorId::new(id.get().saturating_add(1));
        id
    }

    fn is_safe(&self, cell: CellCoord, water: TileId) -> bool {
        let Some(tile) = self.grid.tile(cell) else {
            return false;
        };

        tile != water
            && !self.tiles.is_solid(tile)
            && !self.objects.contains(cell.origin(self.tile_size))
    }

    fn nearest_safe(&self, start: CellCoord, water: TileId) -> Option<CellCoord> {
        evacuation::find_nearest_safe(self.grid.columns(), self.grid.rows(), start, |cell| {
            self.is_safe(cell, water)
        })
    }

    fn move_actor(&mut self, actor: ActorId, target: WorldPoint, out_events: &mut Vec<Event>) {
        let Some(bounds) = self.actor(actor).map(|state| state.bounds) else {
            return;
        };

        if !self.scene().can_move(&bounds, target) {
            tracing::debug!(
                actor = actor.get(),
                x = target.x(),
                y = target.y(),
                "movement blocked"
            );
            out_events.push(Event::MovementBlocked {
                actor,
                attempted: target,
            });
            return;
        }

        if let Some(state) = self.actor_mut(actor) {
            let from = state.position;
            state.relocate(target);
            out_events.push(Event::ActorMoved {
                actor,
                from,
                to: target,
            });
        }
    }

    fn place_object(&mut self, cell: CellCoord, kind: ObjectKind, out_events: &mut Vec<Event>) {
        let outcome = match self.grid.tile(cell) {
            None => Err(PlacementError::OutOfBounds),
            Some(tile) if tile == self.water => Err(PlacementError::Submerged),
            Some(_) => {
                let origin = cell.origin(self.tile_size);
                self.objects
                    .insert(origin, PlacedObject::at(kind, origin, self.tile_size))
            }
        };

        match outcome {
            Ok(()) => out_events.push(Event::ObjectPlaced { cell, kind }),
            Err(reason) => out_events.push(Event::ObjectPlacementRejected { cell, kind, reason }),
        }
    }

    fn flood_cells(&mut self, cells: Vec<CellCoord>, water: TileId, out_events: &mut Vec<Event>) {
        let _span = tracing::info_span!("flood_wave", cells = cells.len()).entered();

        for cell in cells {
            if !self.grid.set_tile(cell, water) {
                continue;
            }
            out_events.push(Event::TileFlooded { cell });

            if let Some(object) = self.objects.remove(cell.origin(self.tile_size)) {
                out_events.push(Event::ObjectSubmerged {
                    cell,
                    kind: object.kind,
                });
            }

            let tile_size = self.tile_size;
            let stranded: Vec<ActorId> = self
                .actors
                .iter()
                .filter(|actor| actor.position.cell(tile_size) == Some(cell))
                .map(|actor| actor.id)
                .collect();

            for actor in stranded {
                let Some(safe) = self.nearest_safe(cell, water) else {
                    tracing::info!(actor = actor.get(), ?cell, "no safe ground left");
                    out_events.push(Event::EvacuationFailed { actor, cell });
                    return;
                };

                if let Some(state) = self.actor_mut(actor) {
                    state.relocate(safe.origin(tile_size));
                }
                tracing::debug!(actor = actor.get(), from = ?cell, to = ?safe, "actor evacuated");
                out_events.push(Event::ActorEvacuated {
                    actor,
                    from: cell,
                    to: safe,
                });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnActor { position, bounds } => {
            let id = world.allocate_actor_id();
            world.actors.push(Actor::new(id, position, bounds));
            out_events.push(Event::ActorSpawned { actor: id, position });
        }
        Command::MoveActor { actor, x, y } => {
            world.move_actor(actor, WorldPoint::new(x, y), out_events);
        }
        Command::StepActor {
            actor,
            direction,
            distance,
        } => {
            if direction.is_none() || distance == 0 {
                return;
            }
            let Some(position) = world.actor(actor).map(|state| state.position) else {
                return;
            };
            world.move_actor(actor, position.stepped(direction, distance), out_events);
        }
        Command::PlaceObject { cell, kind } => world.place_object(cell, kind, out_events),
        Command::RemoveObject { cell } => {
            match world.objects.remove(cell.origin(world.tile_size)) {
                Some(object) => out_events.push(Event::ObjectRemoved {
                    cell,
                    kind: object.kind,
                }),
                None => out_events.push(Event::ObjectRemovalRejected { cell }),
            }
        }
        Command::FloodTiles { cells, water } => world.flood_cells(cells, water, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tidefall_core::{
        ActorId, ActorSnapshot, ActorView, CellCoord, PlacedObject, TileId, TileSet, TileView,
    };

    use super::World;

    /// Provides read-only access to the tile definitions.
    #[must_use]
    pub fn tile_set(world: &World) -> &TileSet {
        &world.tiles
    }

    /// Tile the world treats as water.
    #[must_use]
    pub fn water_tile(world: &World) -> TileId {
        world.water
    }

    /// Side length of a square tile measured in pixels.
    #[must_use]
    pub fn tile_size(world: &World) -> u32 {
        world.tile_size
    }

    /// Exposes a read-only view of the dense tile grid.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        world.grid.view()
    }

    /// Number of cells currently holding `tile`.
    #[must_use]
    pub fn count_tiles(world: &World, tile: TileId) -> usize {
        world.grid.count(tile)
    }

    /// Object anchored at the cell's world origin, if any.
    #[must_use]
    pub fn object_at(world: &World, cell: CellCoord) -> Option<PlacedObject> {
        world.objects.get(cell.origin(world.tile_size)).copied()
    }

    /// Every placed object together with the cell keying it, ordered by position.
    #[must_use]
    pub fn objects(world: &World) -> Vec<(CellCoord, PlacedObject)> {
        world
            .objects
            .iter()
            .filter_map(|(position, object)| Some((position.cell(world.tile_size)?, *object)))
            .collect()
    }

    /// Captures a read-only view of the tracked actors.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(world.actors.iter().map(super::Actor::snapshot).collect())
    }

    /// Snapshot of a single actor.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<ActorSnapshot> {
        world.actor(actor).map(super::Actor::snapshot)
    }

    /// Reports whether the actor could stand at `(x, y)` without overlapping
    /// a solid tile or a solid object.
    ///
    /// Cells beyond the grid hold no tile and are passable. Unknown actors
    /// cannot move.
    #[must_use]
    pub fn can_move(world: &World, actor: ActorId, x: i32, y: i32) -> bool {
        world.actor(actor).is_some_and(|state| {
            world
                .scene()
                .can_move(&state.bounds, tidefall_core::WorldPoint::new(x, y))
        })
    }

    /// Closest cell, in breadth-first order from `start`, where an actor can
    /// safely stand: a dry, non-solid tile without a placed object.
    #[must_use]
    pub fn find_nearest_safe(world: &World, start: CellCoord, water: TileId) -> Option<CellCoord> {
        world.nearest_safe(start, water)
    }
}

#[derive(Clone, Debug)]
struct Actor {
    id: ActorId,
    position: WorldPoint,
    bounds: BoundingBox,
}

impl Actor {
    fn new(id: ActorId, position: WorldPoint, mut bounds: BoundingBox) -> Self {
        bounds.update_position(position.x(), position.y());
        Self {
            id,
            position,
            bounds,
        }
    }

    fn relocate(&mut self, position: WorldPoint) {
        self.position = position;
        self.bounds.update_position(position.x(), position.y());
    }

    fn snapshot(&self) -> tidefall_core::ActorSnapshot {
        tidefall_core::ActorSnapshot {
            id: self.id,
            position: self.position,
            bounds: self.bounds,
        }
    }
}
