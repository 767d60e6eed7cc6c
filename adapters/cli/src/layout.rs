use std::collections::{BTreeMap, BTreeSet};

use tidefall_core::{
    ActorId, BoundingBox, CellCoord, Command, Event, ObjectKind, TileDefinition, TileId, TileSet,
    WATER_TILE_NAME,
};
use tidefall_world::{self as world, query, TileGrid, World, WorldError};

/// Symbol a fully flooded cell renders as.
const WATER_GLYPH: char = '~';
const ACTOR_GLYPH: char = '@';

/// Island map parsed from its ASCII representation.
///
/// Each character describes one cell:
///
/// | glyph | tile  | feature          |
/// |-------|-------|------------------|
/// | `~`   | water |                  |
/// | `.`   | sand  |                  |
/// | `,`   | grass |                  |
/// | `#`   | rock  |                  |
/// | `T`   | grass | tree             |
/// | `*`   | grass | bush             |
/// | `o`   | sand  | rock object      |
/// | `=`   | sand  | driftwood        |
/// | `@`   | sand  | actor spawn      |
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Layout {
    columns: u32,
    rows: u32,
    cells: Vec<TileId>,
    objects: Vec<(CellCoord, ObjectKind)>,
    spawns: Vec<CellCoord>,
}

impl Layout {
    /// Parses a layout, resolving tile names against the provided tile set.
    ///
    /// Blank lines and trailing whitespace are ignored. All remaining rows
    /// must share the same width.
    pub(crate) fn parse(text: &str, tiles: &TileSet) -> Result<Self, LayoutError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(LayoutError::Empty);
        };
        let width = first.chars().count();

        let mut cells = Vec::with_capacity(width * lines.len());
        let mut objects = Vec::new();
        let mut spawns = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let actual = line.chars().count();
            if actual != width {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected: width,
                    actual,
                });
            }

            for (column, symbol) in line.chars().enumerate() {
                let (tile_name, feature) = glyph(symbol).ok_or(LayoutError::UnknownGlyph {
                    glyph: symbol,
                    row,
                    column,
                })?;
                let tile = tiles
                    .lookup(tile_name)
                    .ok_or(LayoutError::MissingTile(tile_name))?;
                cells.push(tile);

                let cell = CellCoord::new(narrow(column)?, narrow(row)?);
                match feature {
                    Feature::Bare => {}
                    Feature::Object(kind) => objects.push((cell, kind)),
                    Feature::Spawn => spawns.push(cell),
                }
            }
        }

        Ok(Self {
            columns: narrow(width)?,
            rows: narrow(lines.len())?,
            cells,
            objects,
            spawns,
        })
    }

    /// Builds a world from the layout, placing its objects and spawning one
    /// actor per spawn marker.
    ///
    /// Actors receive `actor_bounds` and are returned in row-major spawn order.
    /// The tile named `water` is the one objects may never be placed on.
    pub(crate) fn build(
        self,
        tiles: TileSet,
        tile_size: u32,
        water: &str,
        actor_bounds: BoundingBox,
    ) -> Result<(World, Vec<ActorId>), LayoutError> {
        let grid = TileGrid::from_cells(self.columns, self.rows, self.cells)?;
        let mut world = World::with_water_tile(tiles, grid, tile_size, water)?;
        let mut events = Vec::new();

        for (cell, kind) in self.objects {
            world::apply(&mut world, Command::PlaceObject { cell, kind }, &mut events);
        }
        if let Some(Event::ObjectPlacementRejected { cell, reason, .. }) = events
            .iter()
            .find(|event| matches!(event, Event::ObjectPlacementRejected { .. }))
        {
            return Err(LayoutError::RejectedObject {
                cell: *cell,
                reason: format!("{reason:?}"),
            });
        }

        events.clear();
        for cell in self.spawns {
            world::apply(
                &mut world,
                Command::SpawnActor {
                    position: cell.origin(tile_size),
                    bounds: actor_bounds,
                },
                &mut events,
            );
        }
        let actors = events
            .iter()
            .filter_map(|event| match event {
                Event::ActorSpawned { actor, .. } => Some(*actor),
                _ => None,
            })
            .collect();

        Ok((world, actors))
    }
}

/// Renders the world as an ASCII map using the layout glyphs.
///
/// Actors take precedence over objects, which take precedence over tiles.
pub(crate) fn render(world: &World) -> String {
    let tiles = query::tile_set(world);
    let view = query::tile_view(world);
    let tile_size = query::tile_size(world);
    let (columns, rows) = view.dimensions();

    let objects: BTreeMap<CellCoord, ObjectKind> = query::objects(world)
        .into_iter()
        .map(|(cell, object)| (cell, object.kind))
        .collect();
    let actors: BTreeSet<CellCoord> = query::actor_view(world)
        .iter()
        .filter_map(|actor| actor.position.cell(tile_size))
        .collect();

    let capacity = usize::try_from(columns.saturating_add(1).saturating_mul(rows)).unwrap_or(0);
    let mut map = String::with_capacity(capacity);
    for (cell, tile) in view.iter() {
        if cell.column() == 0 && cell.row() > 0 {
            map.push('\n');
        }

        let symbol = if actors.contains(&cell) {
            ACTOR_GLYPH
        } else if let Some(kind) = objects.get(&cell) {
            object_glyph(*kind)
        } else {
            tile_glyph(tiles.definition(tile).map(TileDefinition::name))
        };
        map.push(symbol);
    }
    map
}

/// Errors raised while turning ASCII text into a world.
#[derive(Debug, thiserror::Error)]
pub(crate) enum LayoutError {
    /// The layout contained no rows.
    #[error("layout is empty")]
    Empty,
    /// A row did not match the width of the first row.
    #[error("layout row {row} has {actual} cells; expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// A character had no meaning in the layout alphabet.
    #[error("unknown layout glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },
    /// The tile set lacks a tile the layout refers to.
    #[error("tile set has no tile named `{0}`")]
    MissingTile(&'static str),
    /// The layout exceeded the addressable grid size.
    #[error("layout is too large")]
    TooLarge,
    /// The world refused an object the layout placed.
    #[error("object at {cell:?} was rejected: {reason}")]
    RejectedObject {
        /// Cell the object was meant for.
        cell: CellCoord,
        /// Reason reported by the world.
        reason: String,
    },
    /// The grid could not back a world.
    #[error(transparent)]
    World(#[from] WorldError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Feature {
    Bare,
    Object(ObjectKind),
    Spawn,
}

fn glyph(symbol: char) -> Option<(&'static str, Feature)> {
    let parsed = match symbol {
        WATER_GLYPH => (WATER_TILE_NAME, Feature::Bare),
        '.' => ("sand", Feature::Bare),
        ',' => ("grass", Feature::Bare),
        '#' => ("rock", Feature::Bare),
        'T' => ("grass", Feature::Object(ObjectKind::Tree)),
        '*' => ("grass", Feature::Object(ObjectKind::Bush)),
        'o' => ("sand", Feature::Object(ObjectKind::Rock)),
        '=' => ("sand", Feature::Object(ObjectKind::Driftwood)),
        ACTOR_GLYPH => ("sand", Feature::Spawn),
        _ => return None,
    };
    Some(parsed)
}

fn object_glyph(kind: ObjectKind) -> char {
    match kind {
        ObjectKind::Tree => 'T',
        ObjectKind::Bush => '*',
        ObjectKind::Rock => 'o',
        ObjectKind::Driftwood => '=',
    }
}

fn tile_glyph(name: Option<&str>) -> char {
    match name {
        Some(WATER_TILE_NAME) => WATER_GLYPH,
        Some("sand") => '.',
        Some("grass") => ',',
        Some("rock") => '#',
        _ => '?',
    }
}

fn narrow(value: usize) -> Result<u32, LayoutError> {
    u32::try_from(value).map_err(|_| LayoutError::TooLarge)
}
