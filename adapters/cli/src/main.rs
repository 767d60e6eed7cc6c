#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Tidefall session.

mod config;
mod layout;
mod session;

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tidefall_core::Event;
use tracing_subscriber::EnvFilter;

use crate::{config::SessionConfig, session::Session};

#[derive(Parser)]
#[command(name = "tidefall", about = "Headless island flood simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the tide until the island drowns or time runs out
    Run {
        /// Session configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Seed overriding the configured one
        #[arg(short, long)]
        seed: Option<u64>,
        /// Simulated seconds before giving up
        #[arg(short, long, default_value_t = 600)]
        duration: u64,
        /// Milliseconds advanced per tick
        #[arg(
            short,
            long,
            default_value_t = 100,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        timestep: u64,
        /// Follow the wall clock instead of simulated time
        #[arg(long)]
        realtime: bool,
    },
    /// Validate a configuration and print its island
    Check {
        /// Session configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Entry point for the Tidefall command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Run {
            config,
            seed,
            duration,
            timestep,
            realtime,
        } => {
            let config = load_config(config)?;
            let session = Session::new(&config, seed)?;
            run(
                session,
                Duration::from_secs(duration),
                Duration::from_millis(timestep),
                realtime,
            );
        }
        Commands::Check { config } => {
            let config = load_config(config)?;
            let session = Session::new(&config, None)?;
            println!("{}", layout::render(session.world()));
            println!(
                "ok: first wave in {:.1}s",
                session.flood().time_until_next_flood(Duration::ZERO)
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::load(&path),
        None => Ok(SessionConfig::default()),
    }
}

fn run(mut session: Session, limit: Duration, timestep: Duration, realtime: bool) {
    println!("{}\n", layout::render(session.world()));

    let clock = Instant::now();
    let mut now = Duration::ZERO;
    let mut events = Vec::new();

    while now < limit && !session.flood().is_fully_flooded() {
        if realtime {
            thread::sleep(timestep);
            now = clock.elapsed();
        } else {
            now += timestep;
        }

        events.clear();
        session.tick(now, &mut events);
        report(&session, now, &events);
    }

    if session.flood().is_fully_flooded() {
        println!(
            "island submerged after {} waves at t={:.1}s",
            session.flood().waves(),
            now.as_secs_f64()
        );
    } else {
        println!(
            "island survived {:.1}s; {} waves so far",
            now.as_secs_f64(),
            session.flood().waves()
        );
    }
}

fn report(session: &Session, now: Duration, events: &[Event]) {
    for event in events {
        match event {
            Event::WaveCompleted { flooded } => {
                println!(
                    "t={:.1}s wave {}: {flooded} tiles flooded, next in {:.1}s",
                    now.as_secs_f64(),
                    session.flood().waves(),
                    session.flood().time_until_next_flood(now)
                );
                println!("{}\n", layout::render(session.world()));
            }
            Event::ActorEvacuated { actor, from, to } => {
                println!(
                    "  actor {} fled ({}, {}) for ({}, {})",
                    actor.get(),
                    from.column(),
                    from.row(),
                    to.column(),
                    to.row()
                );
            }
            Event::EvacuationFailed { actor, cell } => {
                println!(
                    "  actor {} was stranded at ({}, {})",
                    actor.get(),
                    cell.column(),
                    cell.row()
                );
            }
            Event::WorldSubmerged => {
                println!("{}\n", layout::render(session.world()));
            }
            _ => {}
        }
    }

    tracing::debug!(
        progress = session.flood().flood_progress(now),
        remaining = session.flood().time_until_next_flood(now),
        "tide"
    );
}
