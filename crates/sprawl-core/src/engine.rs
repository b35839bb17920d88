//! The simulation controller: owns the game state and runs the yearly
//! pipeline.
//!
//! # Year pipeline
//!
//! Each [`Simulation::advance_year`] runs:
//! 1. **Connectivity** -- rebuild links and clusters from scratch
//! 2. **Supply** -- every cluster produces and distributes supply
//! 3. **Growth** -- buildings spend stored supply on level-ups
//! 4. **Bookkeeping** -- log a [`YearSummary`] and increment the year
//!
//! Placement also triggers step 1, so clusters are always current between
//! years.

use crate::building::{Building, Placement};
use crate::connectivity::{self, Cluster, Link};
use crate::geometry::{Cell, PlacementError, Rotation};
use crate::grid::{Grid, GridError};
use crate::growth::{growth_phase, supply_phase};
use crate::id::{BuildingId, TemplateId};
use crate::score::compute_score;
use crate::sim::{ConfigError, SimConfig, StateHash, YearSummary};
use crate::template::{Template, TemplateCatalog};
use std::collections::VecDeque;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// Everything that changes while the game is played.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Next year to simulate. Starts at 1.
    pub year: u32,
    pub grid: Grid,
    /// Buildings in placement order; a building's slot is its index here.
    pub buildings: Vec<Building>,
    pub clusters: Vec<Cluster>,
    pub links: Vec<Link>,
    pub cumulative_supply: f64,
    /// Year summaries, newest first.
    pub logs: VecDeque<YearSummary>,
}

impl GameState {
    pub fn new(grid_size: u32) -> Self {
        Self {
            year: 1,
            grid: Grid::new(grid_size),
            buildings: Vec::new(),
            clusters: Vec::new(),
            links: Vec::new(),
            cumulative_supply: 0.0,
            logs: VecDeque::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// The simulation controller. All mutation goes through `&mut self`
/// methods that either complete fully or change nothing.
#[derive(Debug, Clone)]
pub struct Simulation {
    catalog: TemplateCatalog,
    config: SimConfig,
    state: GameState,
}

impl Simulation {
    pub fn new(catalog: TemplateCatalog, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = GameState::new(config.grid_size);
        Ok(Self {
            catalog,
            config,
            state,
        })
    }

    fn template(&self, id: TemplateId) -> Result<&Template, PlacementError> {
        self.catalog
            .get(id)
            .ok_or(PlacementError::UnknownTemplate(id))
    }

    // -- Placement --

    /// Cells and ports a placement would cover, valid or not.
    pub fn placement_preview(
        &self,
        template: TemplateId,
        rotation: Rotation,
        origin: Cell,
    ) -> Result<Placement, PlacementError> {
        Ok(Placement::new(self.template(template)?, rotation, origin))
    }

    /// Whether the placement fits entirely in bounds on free cells.
    pub fn can_place(
        &self,
        template: TemplateId,
        rotation: Rotation,
        origin: Cell,
    ) -> Result<bool, PlacementError> {
        let placement = self.placement_preview(template, rotation, origin)?;
        Ok(placement
            .absolute_cells()
            .is_some_and(|cells| self.state.grid.check(&cells).is_ok()))
    }

    /// Place a building and rebuild connectivity. `Ok(None)` if the
    /// footprint is blocked or out of bounds, in which case nothing changes.
    pub fn place_building(
        &mut self,
        template: TemplateId,
        rotation: Rotation,
        origin: Cell,
    ) -> Result<Option<BuildingId>, PlacementError> {
        let placement = self.placement_preview(template, rotation, origin)?;
        let id = BuildingId::from_slot(self.state.buildings.len());
        let occupied = match placement.absolute_cells() {
            Some(cells) => self.state.grid.occupy(&cells, id),
            None => Err(GridError::OutOfBounds(origin)),
        };

        if let Err(reason) = occupied {
            debug!(
                target: "sprawl::engine",
                template = template.0,
                x = origin.x,
                y = origin.y,
                %reason,
                "placement.rejected"
            );
            return Ok(None);
        }

        self.state
            .buildings
            .push(Building::new(id, template, placement));
        self.rebuild_connectivity();
        debug!(
            target: "sprawl::engine",
            building = %id,
            template = template.0,
            x = origin.x,
            y = origin.y,
            rotation = rotation.degrees(),
            clusters = self.state.clusters.len(),
            "placement.committed"
        );
        Ok(Some(id))
    }

    fn rebuild_connectivity(&mut self) {
        let conn = connectivity::rebuild(&mut self.state.buildings, &self.catalog);
        self.state.links = conn.links;
        self.state.clusters = conn.clusters;
    }

    // -- Years --

    /// Simulate one year. `None` once the last year has run, with no state
    /// change.
    pub fn advance_year(&mut self) -> Option<YearSummary> {
        if self.is_finished() {
            return None;
        }

        self.rebuild_connectivity();
        let supply = supply_phase(
            &mut self.state.buildings,
            &mut self.state.clusters,
            &self.catalog,
        );
        let total_supply: f64 = supply.iter().map(|s| s.total).sum();
        self.state.cumulative_supply += total_supply;

        let growth = growth_phase(
            &mut self.state.buildings,
            &self.state.clusters,
            &self.catalog,
            self.config.level_up_guard,
        );

        let summary = YearSummary {
            year: self.state.year,
            cluster_count: self.state.clusters.len(),
            total_supply,
            top_level: self.state.buildings.iter().map(|b| b.level).max().unwrap_or(0),
        };
        self.state.logs.push_front(summary.clone());
        self.state.logs.truncate(self.config.log_capacity);

        info!(
            target: "sprawl::engine",
            year = summary.year,
            clusters = summary.cluster_count,
            supply = summary.total_supply,
            level_ups = growth.level_ups,
            guard_trips = growth.guard_trips.len(),
            "year.advanced"
        );

        self.state.year += 1;
        Some(summary)
    }

    /// Advance until the last year has run. Returns the number of years
    /// simulated by this call.
    pub fn run_to_end(&mut self) -> u32 {
        let mut years = 0;
        while self.advance_year().is_some() {
            years += 1;
        }
        years
    }

    /// Back to year 1 on an empty board, keeping catalog and config.
    pub fn reset(&mut self) {
        self.state = GameState::new(self.config.grid_size);
        debug!(target: "sprawl::engine", "simulation.reset");
    }

    pub fn is_finished(&self) -> bool {
        self.state.year > self.config.max_year
    }

    // -- Queries --

    /// Next year to simulate; `max_year + 1` once finished.
    pub fn year(&self) -> u32 {
        self.state.year
    }

    /// Year for display, never past the last year.
    pub fn display_year(&self) -> u32 {
        self.state.year.min(self.config.max_year)
    }

    pub fn buildings(&self) -> &[Building] {
        &self.state.buildings
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.state.buildings.get(id.slot()?)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.state.clusters
    }

    pub fn links(&self) -> &[Link] {
        &self.state.links
    }

    pub fn logs(&self) -> &VecDeque<YearSummary> {
        &self.state.logs
    }

    pub fn building_count(&self) -> usize {
        self.state.buildings.len()
    }

    pub fn cluster_count(&self) -> usize {
        self.state.clusters.len()
    }

    pub fn cumulative_supply(&self) -> f64 {
        self.state.cumulative_supply
    }

    pub fn score(&self) -> f64 {
        compute_score(
            &self.state.buildings,
            &self.catalog,
            self.state.cumulative_supply,
        )
    }

    pub fn grid(&self) -> &Grid {
        &self.state.grid
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// FNV-1a hash over the year, cumulative supply, and every building's
    /// level, stored supply and cluster.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u32(self.state.year);
        hasher.write_f64(self.state.cumulative_supply);
        for (slot, b) in self.state.buildings.iter().enumerate() {
            hasher.write_u64(slot as u64);
            hasher.write_u32(b.template.0);
            hasher.write_u32(b.level);
            hasher.write_f64(b.stored_supply);
            hasher.write_u32(b.cluster.map_or(u32::MAX, |c| c.0));
        }
        hasher.finish()
    }
}
