//! Tile identifiers, the registry that names them and a read-only grid view.

use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Semantic name under which the flood tile is registered.
pub const WATER_TILE_NAME: &str = "water";

/// Compact identifier of a registered tile definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u16);

impl TileId {
    /// Creates a tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Static properties shared by every tile of one kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDefinition {
    name: String,
    solid: bool,
}

impl TileDefinition {
    /// Semantic name used to look the tile up.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether actors are blocked by this tile.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.solid
    }
}

/// Errors raised while registering tile definitions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TileSetError {
    /// A definition with the same name already exists.
    #[error("tile `{0}` is already registered")]
    DuplicateName(String),
    /// The identifier space is exhausted.
    #[error("tile set cannot hold more definitions")]
    Exhausted,
}

/// Registry resolving tile identifiers to their definitions and names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSet {
    definitions: Vec<TileDefinition>,
}

impl TileSet {
    /// Creates an empty tile set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tile set used by the default island maps.
    ///
    /// Registers `water`, `sand`, `grass` and `rock`. Water and rock block
    /// movement.
    #[must_use]
    pub fn standard() -> Self {
        let definitions = [
            (WATER_TILE_NAME, true),
            ("sand", false),
            ("grass", false),
            ("rock", true),
        ]
        .into_iter()
        .map(|(name, solid)| TileDefinition {
            name: name.to_owned(),
            solid,
        })
        .collect();
        Self { definitions }
    }

    /// Registers a new definition and returns its identifier.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        solid: bool,
    ) -> Result<TileId, TileSetError> {
        let name = name.into();
        if self.lookup(&name).is_some() {
            return Err(TileSetError::DuplicateName(name));
        }

        let id = u16::try_from(self.definitions.len()).map_err(|_| TileSetError::Exhausted)?;
        self.definitions.push(TileDefinition { name, solid });
        Ok(TileId::new(id))
    }

    /// Resolves a tile identifier by its semantic name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<TileId> {
        self.definitions
            .iter()
            .position(|definition| definition.name == name)
            .and_then(|index| u16::try_from(index).ok())
            .map(TileId::new)
    }

    /// Definition registered for the identifier, if any.
    #[must_use]
    pub fn definition(&self, id: TileId) -> Option<&TileDefinition> {
        self.definitions.get(usize::from(id.get()))
    }

    /// Whether the identifier refers to a solid definition.
    ///
    /// Unknown identifiers are treated as passable.
    #[must_use]
    pub fn is_solid(&self, id: TileId) -> bool {
        self.definition(id).is_some_and(TileDefinition::is_solid)
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no definitions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Read-only view into the dense tile grid.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    cells: &'a [TileId],
    columns: u32,
    rows: u32,
}

impl<'a> TileView<'a> {
    /// Captures a new tile view backed by the provided row-major slice.
    #[must_use]
    pub fn new(cells: &'a [TileId], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Tile stored at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Iterates over every cell in row-major order together with its tile.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TileId)> + 'a {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, tile)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            (CellCoord::new(index % columns, index / columns), *tile)
        })
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set_resolves_water_by_name() {
        let tiles = TileSet::standard();
        let water = tiles.lookup(WATER_TILE_NAME).expect("water registered");
        assert_eq!(tiles.definition(water).map(TileDefinition::name), Some("water"));
        assert!(tiles.lookup("lava").is_none());
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut tiles = TileSet::new();
        let mud = tiles.register("mud", false).expect("first registration");
        assert_eq!(mud, TileId::new(0));
        assert_eq!(
            tiles.register("mud", true),
            Err(TileSetError::DuplicateName("mud".to_owned()))
        );
        assert_eq!(tiles.len(), 1);
    }

    #[test]
    fn unknown_identifiers_are_not_solid() {
        let tiles = TileSet::standard();
        assert!(!tiles.is_solid(TileId::new(900)));
        assert!(tiles.is_solid(tiles.lookup("rock").expect("rock registered")));
        assert!(!tiles.is_solid(tiles.lookup("sand").expect("sand registered")));
    }

    #[test]
    fn view_reports_none_outside_grid() {
        let cells = vec![TileId::new(1); 6];
        let view = TileView::new(&cells, 3, 2);
        assert_eq!(view.tile(CellCoord::new(2, 1)), Some(TileId::new(1)));
        assert_eq!(view.tile(CellCoord::new(3, 0)), None);
        assert_eq!(view.tile(CellCoord::new(0, 2)), None);
    }

    #[test]
    fn view_iterates_in_row_major_order() {
        let cells = vec![TileId::new(0), TileId::new(1), TileId::new(2), TileId::new(3)];
        let view = TileView::new(&cells, 2, 2);
        let visited: Vec<_> = view.iter().map(|(cell, _)| (cell.column(), cell.row())).collect();
        assert_eq!(visited, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }
}
