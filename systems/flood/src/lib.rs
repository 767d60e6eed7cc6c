#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flood system that drowns the world wave by wave.
//!
//! The tide is calm until a randomly drawn interval elapses. It then converts
//! every dry cell bordering water (or the map edge) in a single wave,
//! relocating actors caught on flooding cells. When a due wave finds nothing
//! left to flood, or a displaced actor has nowhere to go, the world is fully
//! flooded and the simulator stops for good until [`FloodSimulator::reset`] is
//! called.

mod frontier;

pub use frontier::frontier;

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tidefall_core::{Command, Event, TileId, TileSet, WATER_TILE_NAME};
use tidefall_world::{self as world, query, World};

const DEFAULT_MIN_INTERVAL_MS: u64 = 20_000;
const DEFAULT_MAX_INTERVAL_MS: u64 = 40_000;
const DEFAULT_SEED: u64 = 0x71de_fa11_5eed_0001;

/// Configuration parameters required to construct the flood simulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FloodConfig {
    min_interval_ms: u64,
    max_interval_ms: u64,
    seed: u64,
    water_tile: String,
}

impl FloodConfig {
    /// Creates a configuration drawing wave intervals from `[min, max]` milliseconds.
    #[must_use]
    pub fn new(min_interval_ms: u64, max_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            max_interval_ms,
            ..Self::default()
        }
    }

    /// Overrides the seed used for interval draws.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Overrides the tile name the flood writes into the grid.
    #[must_use]
    pub fn with_water_tile(mut self, name: impl Into<String>) -> Self {
        self.water_tile = name.into();
        self
    }

    /// Shortest possible pause between waves, in milliseconds.
    #[must_use]
    pub const fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    /// Longest possible pause between waves, in milliseconds.
    #[must_use]
    pub const fn max_interval_ms(&self) -> u64 {
        self.max_interval_ms
    }

    /// Seed used for interval draws.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Name of the tile the flood writes into the grid.
    #[must_use]
    pub fn water_tile(&self) -> &str {
        &self.water_tile
    }
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
            seed: DEFAULT_SEED,
            water_tile: WATER_TILE_NAME.to_owned(),
        }
    }
}

/// Reasons the flood simulator refuses to start.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FloodError {
    /// The configured water tile is missing from the tile set.
    #[error("tile set has no tile named `{0}`")]
    UnknownWaterTile(String),
    /// The minimum interval must be positive.
    #[error("minimum flood interval must be greater than zero")]
    NonPositiveMinInterval,
    /// The maximum interval is below the minimum.
    #[error("maximum flood interval {max}ms is below the minimum {min}ms")]
    InvertedIntervalRange {
        /// Configured minimum in milliseconds.
        min: u64,
        /// Configured maximum in milliseconds.
        max: u64,
    },
}

/// Drives the tide and reports total submersion.
///
/// Time is supplied by the caller as a monotonic timestamp measured from the
/// start of the session. The simulator never reads a clock on its own.
#[derive(Debug)]
pub struct FloodSimulator {
    water: TileId,
    min_interval_ms: u64,
    max_interval_ms: u64,
    current_interval: Duration,
    last_wave: Duration,
    fully_flooded: bool,
    waves: u32,
    rng: ChaCha8Rng,
}

impl FloodSimulator {
    /// Validates the configuration and starts a calm tide at `now`.
    pub fn new(config: &FloodConfig, tiles: &TileSet, now: Duration) -> Result<Self, FloodError> {
        let water = tiles
            .lookup(config.water_tile())
            .ok_or_else(|| FloodError::UnknownWaterTile(config.water_tile().to_owned()))?;

        if config.min_interval_ms == 0 {
            return Err(FloodError::NonPositiveMinInterval);
        }
        if config.max_interval_ms < config.min_interval_ms {
            return Err(FloodError::InvertedIntervalRange {
                min: config.min_interval_ms,
                max: config.max_interval_ms,
            });
        }

        let mut simulator = Self {
            water,
            min_interval_ms: config.min_interval_ms,
            max_interval_ms: config.max_interval_ms,
            current_interval: Duration::ZERO,
            last_wave: now,
            fully_flooded: false,
            waves: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        };
        simulator.current_interval = simulator.draw_interval();
        Ok(simulator)
    }

    /// Advances the tide, triggering at most one wave.
    ///
    /// Every change the wave causes is appended to `out_events`. The call is a
    /// no-op while the interval has not elapsed and after the world is fully
    /// flooded.
    pub fn update(&mut self, now: Duration, world: &mut World, out_events: &mut Vec<Event>) {
        if self.fully_flooded || self.elapsed(now) < self.current_interval {
            return;
        }

        let cells = frontier(query::tile_view(world), self.water);
        if cells.is_empty() {
            self.submerge(out_events);
            return;
        }

        self.waves = self.waves.saturating_add(1);
        tracing::info!(wave = self.waves, cells = cells.len(), "tide advances");

        let first_event = out_events.len();
        world::apply(
            world,
            Command::FloodTiles {
                cells,
                water: self.water,
            },
            out_events,
        );

        let wave_events = &out_events[first_event..];
        let stranded = wave_events
            .iter()
            .any(|event| matches!(event, Event::EvacuationFailed { .. }));
        if stranded {
            self.submerge(out_events);
            return;
        }

        let flooded = wave_events
            .iter()
            .filter(|event| matches!(event, Event::TileFlooded { .. }))
            .count();
        out_events.push(Event::WaveCompleted {
            flooded: u32::try_from(flooded).unwrap_or(u32::MAX),
        });

        self.current_interval = self.draw_interval();
        self.last_wave = now;
    }

    /// Whether the world is fully flooded.
    #[must_use]
    pub const fn is_fully_flooded(&self) -> bool {
        self.fully_flooded
    }

    /// Fraction of the current interval that has elapsed, within `[0, 1]`.
    #[must_use]
    pub fn flood_progress(&self, now: Duration) -> f64 {
        let interval = self.current_interval.as_secs_f64();
        if interval <= 0.0 {
            return 1.0;
        }

        (self.elapsed(now).as_secs_f64() / interval).min(1.0)
    }

    /// Seconds remaining until the next wave, never negative.
    #[must_use]
    pub fn time_until_next_flood(&self, now: Duration) -> f64 {
        self.current_interval
            .saturating_sub(self.elapsed(now))
            .as_secs_f64()
    }

    /// Restarts a calm tide at `now` for a new play session.
    pub fn reset(&mut self, now: Duration) {
        self.fully_flooded = false;
        self.waves = 0;
        self.last_wave = now;
    }

    /// Interval the tide currently waits before the next wave.
    #[must_use]
    pub const fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Tile identifier written into flooded cells.
    #[must_use]
    pub const fn water_tile(&self) -> TileId {
        self.water
    }

    /// Number of waves triggered since construction or the last reset.
    #[must_use]
    pub const fn waves(&self) -> u32 {
        self.waves
    }

    fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.last_wave)
    }

    fn draw_interval(&mut self) -> Duration {
        Duration::from_millis(
            self.rng
                .gen_range(self.min_interval_ms..=self.max_interval_ms),
        )
    }

    fn submerge(&mut self, out_events: &mut Vec<Event>) {
        self.fully_flooded = true;
        tracing::info!(waves = self.waves, "world fully flooded");
        out_events.push(Event::WorldSubmerged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_stay_within_configured_range() {
        let tiles = TileSet::standard();
        let config = FloodConfig::new(1_000, 1_500).with_seed(7);
        let mut simulator = FloodSimulator::new(&config, &tiles, Duration::ZERO).expect("valid");

        for _ in 0..200 {
            let interval = simulator.draw_interval();
            assert!(interval >= Duration::from_millis(1_000));
            assert!(interval <= Duration::from_millis(1_500));
        }
    }

    #[test]
    fn equal_bounds_fix_the_interval() {
        let tiles = TileSet::standard();
        let config = FloodConfig::new(750, 750);
        let simulator = FloodSimulator::new(&config, &tiles, Duration::ZERO).expect("valid");
        assert_eq!(simulator.current_interval(), Duration::from_millis(750));
    }

    #[test]
    fn same_seed_draws_same_intervals() {
        let tiles = TileSet::standard();
        let config = FloodConfig::new(1, 1_000_000).with_seed(99);
        let mut first = FloodSimulator::new(&config, &tiles, Duration::ZERO).expect("valid");
        let mut second = FloodSimulator::new(&config, &tiles, Duration::ZERO).expect("valid");

        for _ in 0..10 {
            assert_eq!(first.draw_interval(), second.draw_interval());
        }
    }
}
