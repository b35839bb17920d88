//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`. The fixture
//! catalog mirrors the five stock templates shipped in `sprawl-data`.

use crate::building::{Building, Placement};
use crate::engine::Simulation;
use crate::geometry::{Cell, Direction, Port, Rotation};
use crate::id::BuildingId;
use crate::sim::SimConfig;
use crate::template::{CatalogBuilder, GrowthType, TemplateCatalog, TemplateDef};

// ===========================================================================
// Template keys
// ===========================================================================

pub const LINE: &str = "residential-line";
pub const ELL: &str = "industry-l";
pub const HUB: &str = "hub-cross";
pub const ZED: &str = "research-z";
pub const CORE: &str = "power-core";

pub const FIXTURE_SEED: u64 = 42;

// ===========================================================================
// Template definitions
// ===========================================================================

#[allow(clippy::too_many_arguments)]
fn def(
    key: &str,
    name: &str,
    shape: &[(i32, i32)],
    ports: &[(i32, i32, Direction)],
    growth: GrowthType,
    base_threshold: f64,
    base_cap: u32,
    range: Option<u32>,
) -> TemplateDef {
    TemplateDef {
        key: key.to_string(),
        name: name.to_string(),
        shape: shape.iter().map(|&(x, y)| Cell::new(x, y)).collect(),
        ports: ports.iter().map(|&(x, y, d)| Port::new(x, y, d)).collect(),
        growth,
        base_threshold,
        base_cap,
        auto_connect: range.is_some(),
        range: range.unwrap_or(0),
    }
}

pub fn line_def() -> TemplateDef {
    use Direction::*;
    def(
        LINE,
        "Residential Line",
        &[(0, 0), (1, 0)],
        &[(0, 0, North), (1, 0, South)],
        GrowthType::Linear,
        20.0,
        4,
        None,
    )
}

pub fn ell_def() -> TemplateDef {
    use Direction::*;
    def(
        ELL,
        "Industry L",
        &[(0, 0), (0, 1), (1, 1)],
        &[(0, 0, East), (0, 1, North), (1, 1, West)],
        GrowthType::Linear,
        26.0,
        5,
        Some(2),
    )
}

pub fn hub_def() -> TemplateDef {
    use Direction::*;
    def(
        HUB,
        "Hub Cross",
        &[(0, 0)],
        &[(0, 0, North), (0, 0, East), (0, 0, South), (0, 0, West)],
        GrowthType::Linear,
        22.0,
        6,
        Some(3),
    )
}

pub fn zed_def() -> TemplateDef {
    use Direction::*;
    def(
        ZED,
        "Research Z",
        &[(0, 0), (1, 0), (1, 1)],
        &[(0, 0, East), (1, 0, South), (1, 1, West)],
        GrowthType::Exponential,
        28.0,
        5,
        Some(2),
    )
}

pub fn core_def() -> TemplateDef {
    use Direction::*;
    def(
        CORE,
        "Power Core",
        &[(0, 0), (1, 0), (2, 0)],
        &[(0, 0, West), (1, 0, North), (1, 0, South), (2, 0, East)],
        GrowthType::Exponential,
        34.0,
        7,
        Some(3),
    )
}

// ===========================================================================
// Catalog and simulation fixtures
// ===========================================================================

pub fn fixture_builder() -> CatalogBuilder {
    let mut builder = CatalogBuilder::new();
    for def in [line_def(), ell_def(), hub_def(), zed_def(), core_def()] {
        builder.register(def);
    }
    builder
}

pub fn fixture_catalog() -> TemplateCatalog {
    fixture_builder()
        .build(FIXTURE_SEED)
        .expect("fixture templates are valid")
}

/// A building of template `key` in `slot`, as the engine would create it.
pub fn make_building(
    catalog: &TemplateCatalog,
    slot: usize,
    key: &str,
    rotation: Rotation,
    origin: Cell,
) -> Building {
    let id = catalog.id_of(key).expect("fixture key");
    let template = catalog.get(id).expect("fixture template");
    Building::new(
        BuildingId::from_slot(slot),
        id,
        Placement::new(template, rotation, origin),
    )
}

pub fn fixture_sim() -> Simulation {
    Simulation::new(fixture_catalog(), SimConfig::default()).expect("default config is valid")
}

/// Place `key` and panic if the footprint is rejected.
pub fn place(sim: &mut Simulation, key: &str, rotation: Rotation, x: i32, y: i32) -> BuildingId {
    let id = sim.catalog().id_of(key).expect("fixture key");
    sim.place_building(id, rotation, Cell::new(x, y))
        .expect("known template")
        .unwrap_or_else(|| panic!("{key} does not fit at ({x}, {y})"))
}

/// The hub at (5,5) with a line whose south port faces it from (4,4).
pub fn hub_and_line() -> Simulation {
    let mut sim = fixture_sim();
    place(&mut sim, HUB, Rotation::None, 5, 5);
    place(&mut sim, LINE, Rotation::None, 4, 4);
    sim
}
