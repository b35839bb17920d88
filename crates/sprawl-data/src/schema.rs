//! Serde data file structs for game content.
//!
//! These structs define the on-disk format for templates and starting
//! layouts. They are deserialized from RON, JSON, or TOML data files and then
//! resolved into core types by the loader. Simulation settings deserialize
//! straight into [`sprawl_core::sim::SimConfig`].

use serde::Deserialize;
use sprawl_core::geometry::{Cell, Direction, Port};
use sprawl_core::template::{GrowthType, TemplateDef};

// ===========================================================================
// Templates
// ===========================================================================

/// A structure template in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateData {
    pub key: String,
    pub name: String,
    /// Relative cells as `(x, y)`.
    pub shape: Vec<(i32, i32)>,
    #[serde(default)]
    pub ports: Vec<PortData>,
    pub growth: GrowthType,
    pub base_threshold: f64,
    pub base_cap: u32,
    #[serde(default)]
    pub auto_connect: bool,
    #[serde(default)]
    pub range: u32,
}

/// A port on a template's shape.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PortData {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
}

impl TemplateData {
    pub fn into_def(self) -> TemplateDef {
        TemplateDef {
            key: self.key,
            name: self.name,
            shape: self.shape.into_iter().map(|(x, y)| Cell::new(x, y)).collect(),
            ports: self
                .ports
                .into_iter()
                .map(|p| Port::new(p.x, p.y, p.dir))
                .collect(),
            growth: self.growth,
            base_threshold: self.base_threshold,
            base_cap: self.base_cap,
            auto_connect: self.auto_connect,
            range: self.range,
        }
    }
}

// ===========================================================================
// Layout
// ===========================================================================

/// A building placed before the first year, referring to its template by key.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementData {
    pub template: String,
    /// Degrees clockwise; any multiple of 90.
    #[serde(default)]
    pub rotation: i32,
    pub x: i32,
    pub y: i32,
}
