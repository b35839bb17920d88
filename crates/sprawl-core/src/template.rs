//! Structure templates and the immutable catalog they live in.
//!
//! The catalog is built once through [`CatalogBuilder`], which validates the
//! definitions and draws each template's decay coefficient from a seeded
//! [`SimRng`]. After `build()` nothing in a template changes.

use crate::geometry::{Cell, Direction, Port};
use crate::id::TemplateId;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Supply produced per level by linear templates.
pub const LINEAR_SUPPLY_PER_LEVEL: f64 = 5.0;
/// Exponential templates produce `level^EXP_SUPPLY_EXPONENT * EXP_SUPPLY_SCALE`.
pub const EXP_SUPPLY_EXPONENT: f64 = 1.5;
pub const EXP_SUPPLY_SCALE: f64 = 4.0;
/// Exponential thresholds grow as `level^EXP_THRESHOLD_EXPONENT`.
pub const EXP_THRESHOLD_EXPONENT: f64 = 1.8;
/// Each cluster member adds this much to the growth cap (floored).
pub const CLUSTER_CAP_FACTOR: f64 = 0.8;
/// Templates with at least this many ports count as hubs.
pub const HUB_PORT_COUNT: usize = 4;
pub const HUB_CAP_BONUS: u32 = 2;
/// Decay coefficients are drawn uniformly from `[DECAY_LOW, DECAY_LOW + DECAY_SPAN)`.
pub const DECAY_LOW: f64 = 0.7;
pub const DECAY_SPAN: f64 = 0.5;

/// How a template's supply and thresholds scale with level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthType {
    Linear,
    Exponential,
}

/// A template definition as registered with the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDef {
    pub key: String,
    pub name: String,
    pub shape: Vec<Cell>,
    pub ports: Vec<Port>,
    pub growth: GrowthType,
    pub base_threshold: f64,
    pub base_cap: u32,
    pub auto_connect: bool,
    pub range: u32,
}

/// A finalized, immutable template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: TemplateId,
    /// Stable string key, e.g. `"hub-cross"`.
    pub key: String,
    /// Display name.
    pub name: String,
    pub shape: Vec<Cell>,
    pub ports: Vec<Port>,
    pub growth: GrowthType,
    pub base_threshold: f64,
    pub base_cap: u32,
    pub auto_connect: bool,
    /// Manhattan reach for auto links.
    pub range: u32,
    /// Cosmetic decay coefficient, fixed at catalog build.
    pub decay: f64,
}

impl Template {
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Number of distinct directions among this template's ports.
    pub fn distinct_port_directions(&self) -> usize {
        self.ports
            .iter()
            .map(|p| p.dir)
            .collect::<BTreeSet<Direction>>()
            .len()
    }

    pub fn is_hub(&self) -> bool {
        self.port_count() >= HUB_PORT_COUNT
    }

    /// Raw supply produced in one year at `level`.
    pub fn supply_output(&self, level: u32) -> f64 {
        let level = f64::from(level);
        match self.growth {
            GrowthType::Linear => level * LINEAR_SUPPLY_PER_LEVEL,
            GrowthType::Exponential => level.powf(EXP_SUPPLY_EXPONENT) * EXP_SUPPLY_SCALE,
        }
    }

    /// Stored supply needed to advance from `level` to `level + 1`.
    pub fn threshold(&self, level: u32) -> f64 {
        let level = f64::from(level);
        match self.growth {
            GrowthType::Linear => self.base_threshold * level,
            GrowthType::Exponential => self.base_threshold * level.powf(EXP_THRESHOLD_EXPONENT),
        }
    }

    /// Highest level a building of this template may reach in a cluster of
    /// `cluster_size` members.
    pub fn growth_cap(&self, cluster_size: usize) -> u32 {
        let cluster_bonus = (cluster_size as f64 * CLUSTER_CAP_FACTOR).floor() as u32;
        let hub_bonus = if self.is_hub() { HUB_CAP_BONUS } else { 0 };
        self.base_cap + cluster_bonus + hub_bonus
    }
}

/// Errors raised while building or querying the catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("template '{key}' has an empty shape")]
    EmptyShape { key: String },
    #[error("template '{key}' lists cell {cell:?} more than once")]
    DuplicateCell { key: String, cell: Cell },
    #[error("template '{key}' has a port {port:?} outside its shape")]
    PortOffShape { key: String, port: Port },
    #[error("duplicate template key '{key}'")]
    DuplicateKey { key: String },
    #[error("unknown template key '{0}'")]
    UnknownKey(String),
}

/// Builder for the immutable [`TemplateCatalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    defs: Vec<TemplateDef>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. Ids are assigned in registration order.
    pub fn register(&mut self, def: TemplateDef) -> TemplateId {
        let id = TemplateId(self.defs.len() as u32);
        self.defs.push(def);
        id
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Validate every definition and freeze the catalog. Decay coefficients
    /// are drawn from `seed` in registration order.
    pub fn build(self, seed: u64) -> Result<TemplateCatalog, CatalogError> {
        let mut rng = SimRng::new(seed);
        let mut key_to_id = HashMap::new();
        let mut templates = Vec::with_capacity(self.defs.len());

        for (index, def) in self.defs.into_iter().enumerate() {
            validate_def(&def)?;
            let id = TemplateId(index as u32);
            if key_to_id.insert(def.key.clone(), id).is_some() {
                return Err(CatalogError::DuplicateKey { key: def.key });
            }
            templates.push(Template {
                id,
                key: def.key,
                name: def.name,
                shape: def.shape,
                ports: def.ports,
                growth: def.growth,
                base_threshold: def.base_threshold,
                base_cap: def.base_cap,
                auto_connect: def.auto_connect,
                range: def.range,
                decay: rng.next_in(DECAY_LOW, DECAY_SPAN),
            });
        }

        Ok(TemplateCatalog {
            templates,
            key_to_id,
            seed,
        })
    }
}

fn validate_def(def: &TemplateDef) -> Result<(), CatalogError> {
    if def.shape.is_empty() {
        return Err(CatalogError::EmptyShape {
            key: def.key.clone(),
        });
    }
    let mut seen = BTreeSet::new();
    for &cell in &def.shape {
        if !seen.insert(cell) {
            return Err(CatalogError::DuplicateCell {
                key: def.key.clone(),
                cell,
            });
        }
    }
    if let Some(&port) = def.ports.iter().find(|p| !seen.contains(&p.cell)) {
        return Err(CatalogError::PortOffShape {
            key: def.key.clone(),
            port,
        });
    }
    Ok(())
}

/// Immutable template catalog. Frozen after `CatalogBuilder::build`.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
    key_to_id: HashMap<String, TemplateId>,
    seed: u64,
}

impl TemplateCatalog {
    pub fn get(&self, id: TemplateId) -> Option<&Template> {
        self.templates.get(id.0 as usize)
    }

    /// Look up a template id by its string key.
    pub fn id_of(&self, key: &str) -> Option<TemplateId> {
        self.key_to_id.get(key).copied()
    }

    /// Like [`id_of`](Self::id_of), but unknown keys are an error.
    pub fn require(&self, key: &str) -> Result<TemplateId, CatalogError> {
        self.id_of(key)
            .ok_or_else(|| CatalogError::UnknownKey(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Seed the decay coefficients were drawn from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
