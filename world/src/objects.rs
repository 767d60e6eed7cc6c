//! Sparse index of placed objects keyed by tile-aligned world position.

use std::collections::BTreeMap;

use tidefall_core::{PlacedObject, PlacementError, WorldPoint};

/// Ordered map from exact world position to the object placed there.
///
/// At most one object exists per position.
#[derive(Clone, Debug, Default)]
pub struct ObjectIndex {
    entries: BTreeMap<WorldPoint, PlacedObject>,
}

impl ObjectIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Object stored at the position, if any.
    #[must_use]
    pub fn get(&self, position: WorldPoint) -> Option<&PlacedObject> {
        self.entries.get(&position)
    }

    /// Whether an object is stored at the position.
    #[must_use]
    pub fn contains(&self, position: WorldPoint) -> bool {
        self.entries.contains_key(&position)
    }

    /// Stores the object, refusing to overwrite an existing entry.
    pub fn insert(
        &mut self,
        position: WorldPoint,
        object: PlacedObject,
    ) -> Result<(), PlacementError> {
        if self.contains(position) {
            return Err(PlacementError::Occupied);
        }

        let _ = self.entries.insert(position, object);
        Ok(())
    }

    /// Removes and returns the object stored at the position.
    pub fn remove(&mut self, position: WorldPoint) -> Option<PlacedObject> {
        self.entries.remove(&position)
    }

    /// Iterates over stored objects ordered by position.
    pub fn iter(&self) -> impl Iterator<Item = (WorldPoint, &PlacedObject)> {
        self.entries.iter().map(|(position, object)| (*position, object))
    }
}
