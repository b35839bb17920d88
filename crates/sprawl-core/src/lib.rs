//! Sprawl Core -- the simulation engine for a grid-based city-growth game.
//!
//! Players place multi-cell structures on a bounded grid. Structures link to
//! their neighbors through facing ports or by proximity, linked structures
//! form clusters that pool a yearly resource ("supply"), and structures level
//! up when their stored supply crosses growth thresholds, up to a cap that
//! grows with cluster size.
//!
//! # Year pipeline
//!
//! Each call to [`engine::Simulation::advance_year`] runs:
//!
//! 1. **Connectivity** -- rebuild the link graph and clusters from scratch.
//! 2. **Supply** -- each cluster produces supply and splits it by weight,
//!    using shortest intra-cluster distances from [`distance`].
//! 3. **Growth** -- buildings spend stored supply on level-ups.
//! 4. **Bookkeeping** -- log a year summary and increment the year.
//!
//! ```rust,ignore
//! let mut sim = Simulation::new(catalog, SimConfig::default())?;
//! let hub = sim.catalog().require("hub-cross")?;
//! sim.place_building(hub, Rotation::None, Cell::new(5, 5))?;
//! while let Some(summary) = sim.advance_year() {
//!     println!("{summary}");
//! }
//! ```
//!
//! # Key Types
//!
//! - [`engine::Simulation`] -- Controller owning the game state.
//! - [`template::TemplateCatalog`] -- Immutable template catalog with seeded
//!   decay coefficients, frozen at startup.
//! - [`geometry::Rotation`] -- Quarter-turn rotation of shapes and ports.
//! - [`grid::Grid`] -- Cell occupancy.
//! - [`connectivity::Cluster`] -- A group of transitively linked buildings.
//! - [`distance::DistanceOracle`] -- Per-cluster all-pairs Dijkstra.

pub mod building;
pub mod connectivity;
pub mod distance;
pub mod engine;
pub mod geometry;
pub mod grid;
pub mod growth;
pub mod id;
pub mod rng;
pub mod score;
pub mod sim;
pub mod template;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
