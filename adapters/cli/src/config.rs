use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tidefall_core::{Anchor, BoundingBox, WATER_TILE_NAME};
use tidefall_system_flood::FloodConfig;

const DEFAULT_TILE_SIZE: u32 = 32;
const DEFAULT_ACTOR_WIDTH: u32 = 16;
const DEFAULT_ACTOR_HEIGHT: u32 = 8;
const DEFAULT_WANDER_STEP: u32 = 4;

/// Island used when no configuration file is supplied.
pub(crate) const DEFAULT_LAYOUT: &str = "\
~~~~~~~~~~~~
~~....,,~~~~
~..T.,,,,.~~
~.@..##,o..~
~..,,,#,.@.~
~~.T,,,,..~~
~~~.....~~~~
~~~~~~~~~~~~";

/// Session settings read from a TOML file.
///
/// ```toml
/// [world]
/// tile_size = 32
/// actor_width = 16
/// actor_height = 8
/// wander_step = 4
/// layout = """
/// ~~~~
/// ~@.~
/// ~~~~
/// """
///
/// [flood]
/// min_interval_ms = 2000
/// max_interval_ms = 5000
/// seed = 7
/// water_tile = "water"
/// ```
///
/// Every key is optional and falls back to its default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    /// Map and actor settings.
    pub(crate) world: WorldSection,
    /// Tide settings.
    pub(crate) flood: FloodSection,
}

impl SessionConfig {
    /// Reads and validates a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid session config at {}", path.display()))
    }

    /// Parses and validates configuration text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse session config toml contents")?;
        config.world.validate()?;
        Ok(config)
    }
}

/// `[world]` section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldSection {
    /// Edge length of one tile in world units.
    pub(crate) tile_size: u32,
    /// Width of each actor's collision box.
    pub(crate) actor_width: u32,
    /// Height of each actor's collision box.
    pub(crate) actor_height: u32,
    /// Distance an actor wanders per tick.
    pub(crate) wander_step: u32,
    /// ASCII map of the island.
    pub(crate) layout: String,
}

impl WorldSection {
    /// Collision box for actors, anchored at the feet of a tile-sized frame.
    pub(crate) fn actor_bounds(&self) -> BoundingBox {
        BoundingBox::anchored(
            Anchor::BottomCenter,
            self.tile_size,
            self.tile_size,
            self.actor_width,
            self.actor_height,
        )
    }

    fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            bail!("tile_size must be greater than zero");
        }
        if self.actor_width > self.tile_size || self.actor_height > self.tile_size {
            bail!(
                "actor box {}x{} does not fit a {} unit tile",
                self.actor_width,
                self.actor_height,
                self.tile_size
            );
        }
        Ok(())
    }
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            actor_width: DEFAULT_ACTOR_WIDTH,
            actor_height: DEFAULT_ACTOR_HEIGHT,
            wander_step: DEFAULT_WANDER_STEP,
            layout: DEFAULT_LAYOUT.to_owned(),
        }
    }
}

/// `[flood]` section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FloodSection {
    /// Shortest pause between waves.
    pub(crate) min_interval_ms: u64,
    /// Longest pause between waves.
    pub(crate) max_interval_ms: u64,
    /// Seed for interval draws and actor wandering.
    pub(crate) seed: u64,
    /// Tile the tide writes into flooded cells.
    pub(crate) water_tile: String,
}

impl FloodSection {
    /// Simulator configuration, optionally with a different seed.
    pub(crate) fn flood_config(&self, seed: Option<u64>) -> FloodConfig {
        FloodConfig::new(self.min_interval_ms, self.max_interval_ms)
            .with_seed(seed.unwrap_or(self.seed))
            .with_water_tile(self.water_tile.clone())
    }
}

impl Default for FloodSection {
    fn default() -> Self {
        let defaults = FloodConfig::default();
        Self {
            min_interval_ms: defaults.min_interval_ms(),
            max_interval_ms: defaults.max_interval_ms(),
            seed: defaults.seed(),
            water_tile: WATER_TILE_NAME.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = SessionConfig::parse("").expect("empty config parses");
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.world.layout, DEFAULT_LAYOUT);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = SessionConfig::parse(
            r#"
            [world]
            tile_size = 16
            actor_width = 8

            [flood]
            seed = 99
            "#,
        )
        .expect("config parses");

        assert_eq!(config.world.tile_size, 16);
        assert_eq!(config.world.actor_width, 8);
        assert_eq!(config.world.actor_height, DEFAULT_ACTOR_HEIGHT);
        assert_eq!(config.flood.seed, 99);
        assert_eq!(
            config.flood.min_interval_ms,
            FloodConfig::default().min_interval_ms()
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = SessionConfig::parse("[world]\ntile_sise = 16\n").expect_err("typo rejected");
        assert!(format!("{error:#}").contains("tile_sise"));
    }

    #[test]
    fn actor_box_must_fit_a_tile() {
        let error = SessionConfig::parse("[world]\ntile_size = 8\n").expect_err("box too large");
        assert!(error.to_string().contains("does not fit"));
    }

    #[test]
    fn seed_override_replaces_configured_seed() {
        let section = FloodSection::default();
        assert_eq!(section.flood_config(Some(5)).seed(), 5);
        assert_eq!(section.flood_config(None).seed(), section.seed);
    }

    #[test]
    fn actor_bounds_stand_on_the_tile_floor() {
        let bounds = WorldSection::default().actor_bounds();
        assert_eq!(bounds.offset(), (8, 24));
        assert_eq!((bounds.width(), bounds.height()), (16, 8));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = SessionConfig::load(Path::new("/nonexistent/tidefall.toml"))
            .expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/tidefall.toml"));
    }
}
