//! Score: a read-only summary of how developed the board is.
//!
//! ```text
//! score = sum(level) + cumulative_supply * 0.1 + sum(complexity)
//! complexity = cells + ports * 1.5 + distinct_port_dirs * 2 (+ level * 2 if exponential)
//! ```

use crate::building::Building;
use crate::template::{GrowthType, TemplateCatalog};

pub const CUMULATIVE_SUPPLY_WEIGHT: f64 = 0.1;
pub const PORT_WEIGHT: f64 = 1.5;
pub const DIRECTION_WEIGHT: f64 = 2.0;
pub const EXPONENTIAL_LEVEL_WEIGHT: f64 = 2.0;

/// Structural complexity of one building.
pub fn complexity(building: &Building, catalog: &TemplateCatalog) -> f64 {
    let Some(template) = catalog.get(building.template) else {
        return building.shape.len() as f64;
    };
    let mut value = building.shape.len() as f64
        + template.port_count() as f64 * PORT_WEIGHT
        + template.distinct_port_directions() as f64 * DIRECTION_WEIGHT;
    if template.growth == GrowthType::Exponential {
        value += f64::from(building.level) * EXPONENTIAL_LEVEL_WEIGHT;
    }
    value
}

pub fn compute_score(
    buildings: &[Building],
    catalog: &TemplateCatalog,
    cumulative_supply: f64,
) -> f64 {
    let levels: f64 = buildings.iter().map(|b| f64::from(b.level)).sum();
    let complexity: f64 = buildings.iter().map(|b| complexity(b, catalog)).sum();
    levels + cumulative_supply * CUMULATIVE_SUPPLY_WEIGHT + complexity
}
