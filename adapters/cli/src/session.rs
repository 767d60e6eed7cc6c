use std::time::Duration;

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tidefall_core::{ActorId, Command, Direction, Event, TileSet};
use tidefall_system_flood::FloodSimulator;
use tidefall_world::{self as world, query, World};

use crate::{config::SessionConfig, layout::Layout};

const WANDER_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Island world, its tide and the actors wandering on it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    flood: FloodSimulator,
    actors: Vec<ActorId>,
    wander_step: u32,
    rng: ChaCha8Rng,
}

impl Session {
    /// Builds the world described by `config` and starts a calm tide at time zero.
    pub(crate) fn new(config: &SessionConfig, seed: Option<u64>) -> Result<Self> {
        let tiles = TileSet::standard();
        let layout = Layout::parse(&config.world.layout, &tiles).context("invalid layout")?;
        let (world, actors) = layout
            .build(
                tiles,
                config.world.tile_size,
                &config.flood.water_tile,
                config.world.actor_bounds(),
            )
            .context("failed to build world from layout")?;

        let flood_config = config.flood.flood_config(seed);
        let flood = FloodSimulator::new(&flood_config, query::tile_set(&world), Duration::ZERO)
            .context("invalid flood configuration")?;
        let rng = ChaCha8Rng::seed_from_u64(flood_config.seed() ^ WANDER_SALT);

        tracing::info!(
            columns = query::tile_view(&world).dimensions().0,
            rows = query::tile_view(&world).dimensions().1,
            actors = actors.len(),
            interval = ?flood.current_interval(),
            "session ready"
        );

        Ok(Self {
            world,
            flood,
            actors,
            wander_step: config.world.wander_step,
            rng,
        })
    }

    /// Lets every actor wander one step, then advances the tide to `now`.
    pub(crate) fn tick(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        for &actor in &self.actors {
            let direction = wander_direction(&mut self.rng);
            world::apply(
                &mut self.world,
                Command::StepActor {
                    actor,
                    direction,
                    distance: self.wander_step,
                },
                out_events,
            );
        }

        self.flood.update(now, &mut self.world, out_events);
    }

    /// World being simulated.
    pub(crate) const fn world(&self) -> &World {
        &self.world
    }

    /// Tide driving the session.
    pub(crate) const fn flood(&self) -> &FloodSimulator {
        &self.flood
    }
}

fn wander_direction(rng: &mut ChaCha8Rng) -> Option<Direction> {
    match rng.gen_range(0..5) {
        0 => Some(Direction::North),
        1 => Some(Direction::East),
        2 => Some(Direction::South),
        3 => Some(Direction::West),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(layout: &str) -> SessionConfig {
        let mut config = SessionConfig::default();
        config.world.layout = layout.to_owned();
        config.flood.min_interval_ms = 100;
        config.flood.max_interval_ms = 200;
        config
    }

    #[test]
    fn default_island_eventually_submerges() {
        let mut session = Session::new(&quick_config(crate::config::DEFAULT_LAYOUT), Some(3))
            .expect("session builds");
        let mut events = Vec::new();
        let mut now = Duration::ZERO;

        while !session.flood().is_fully_flooded() && now < Duration::from_secs(60) {
            now += Duration::from_millis(50);
            session.tick(now, &mut events);
        }

        assert!(session.flood().is_fully_flooded());
        assert_eq!(events.last(), Some(&Event::WorldSubmerged));
    }

    #[test]
    fn wandering_actors_stay_out_of_solid_terrain() {
        let mut session =
            Session::new(&quick_config("~~~~~\n~.#.~\n~@#.~\n~~~~~"), Some(11)).expect("builds");
        session.flood = FloodSimulator::new(
            &crate::config::FloodSection {
                min_interval_ms: 600_000,
                max_interval_ms: 600_000,
                ..crate::config::FloodSection::default()
            }
            .flood_config(None),
            query::tile_set(&session.world),
            Duration::ZERO,
        )
        .expect("valid flood");
        let mut events = Vec::new();

        for step in 1..200 {
            session.tick(Duration::from_millis(step * 10), &mut events);
        }

        let rock = query::tile_set(session.world())
            .lookup("rock")
            .expect("rock registered");
        let view = query::tile_view(session.world());
        for actor in query::actor_view(session.world()).iter() {
            let feet = actor.bounds;
            for (cell, tile) in view.iter() {
                if tile == rock {
                    let rock_box = tidefall_core::BoundingBox::tile(cell, 32);
                    assert!(!feet.intersects(&rock_box), "actor {actor:?} overlaps rock");
                }
            }
        }
    }

    #[test]
    fn bad_layout_is_reported_with_context() {
        let error = Session::new(&quick_config("~~\n~"), None).expect_err("ragged layout");
        assert!(format!("{error:#}").contains("invalid layout"));
    }

    #[test]
    fn bad_flood_interval_is_reported_with_context() {
        let mut config = quick_config("~@~");
        config.flood.min_interval_ms = 0;
        let error = Session::new(&config, None).expect_err("zero interval");
        assert!(format!("{error:#}").contains("minimum flood interval"));
    }

    #[test]
    fn water_tile_missing_from_tiles_is_reported() {
        let mut config = quick_config("~@~");
        config.flood.water_tile = "lava".to_owned();
        let error = Session::new(&config, None).expect_err("unknown water tile");
        assert!(format!("{error:#}").contains("no water tile named `lava`"));
    }
}
