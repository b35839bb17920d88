//! Headless runner: loads game data, plays every year, prints the log.
//!
//! With a directory argument, loads `templates`, `sim` and `layout` files from
//! it. Without one, uses the stock templates and a small starter town.
//!
//! Run with: `RUST_LOG=sprawl=debug cargo run -p sprawl-data --example headless_runner [DIR]`

use sprawl_core::engine::Simulation;
use sprawl_core::geometry::{Cell, Rotation};
use sprawl_core::sim::SimConfig;
use sprawl_data::{builtin_catalog, load_game_data};
use std::path::PathBuf;
use tracing::info;

fn starter_town() -> Result<Simulation, Box<dyn std::error::Error>> {
    let config = SimConfig::default();
    let catalog = builtin_catalog(config.seed)?;
    let mut sim = Simulation::new(catalog, config)?;

    let town = [
        ("hub-cross", Rotation::None, Cell::new(5, 5)),
        ("residential-line", Rotation::None, Cell::new(4, 4)),
        ("industry-l", Rotation::Cw90, Cell::new(6, 6)),
        ("research-z", Rotation::None, Cell::new(1, 1)),
        ("power-core", Rotation::Cw90, Cell::new(8, 2)),
    ];
    for (key, rotation, origin) in town {
        let id = sim.catalog().require(key)?;
        sim.place_building(id, rotation, origin)?;
    }
    Ok(sim)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut sim = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(dir) => load_game_data(&dir)?.into_simulation()?,
        None => starter_town()?,
    };

    info!(
        target: "sprawl::runner",
        buildings = sim.building_count(),
        clusters = sim.cluster_count(),
        "runner.ready"
    );

    let years = sim.run_to_end();
    for summary in sim.logs().iter().rev() {
        println!("{summary}");
    }

    println!();
    println!("years simulated: {years}");
    println!("buildings:       {}", sim.building_count());
    println!("clusters:        {}", sim.cluster_count());
    println!("cumulative:      {:.2}", sim.cumulative_supply());
    println!("score:           {:.2}", sim.score());
    println!("state hash:      {:#018x}", sim.state_hash());
    Ok(())
}
