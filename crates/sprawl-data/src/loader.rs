//! Resolution pipeline: reads data files, resolves template keys, builds the
//! catalog.
//!
//! A game data directory holds:
//! - `templates.{ron,toml,json}` (required): the template list. TOML files
//!   put it under a top-level `templates` array.
//! - `sim.{ron,toml,json}` (optional): a [`SimConfig`]; defaults otherwise.
//! - `layout.{ron,toml,json}` (optional): buildings placed before year 1.
//!   TOML files put it under a top-level `placements` array.
//!
//! Exactly one format may exist per base name.

use crate::schema::{PlacementData, TemplateData};
use serde::de::DeserializeOwned;
use sprawl_core::engine::Simulation;
use sprawl_core::geometry::{Cell, PlacementError, Rotation};
use sprawl_core::id::TemplateId;
use sprawl_core::sim::{ConfigError, SimConfig};
use sprawl_core::template::{CatalogBuilder, CatalogError, TemplateCatalog};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A template key could not be resolved.
    #[error("unresolved template '{name}' in {file}")]
    UnresolvedRef { file: PathBuf, name: String },

    /// A duplicate template key was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error("invalid template: {0}")]
    Catalog(#[from] CatalogError),

    #[error("invalid sim config: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid placement: {0}")]
    Placement(#[from] PlacementError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for `{base_name}.ron`, `.toml`, or `.json`.
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(file: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: file.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Deserialize `content` in the given format. `file` only labels errors.
pub fn parse_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(file, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(file, e)),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(file, e)),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format, path)
}

/// Deserialize a list from a file. For TOML files, extracts the array at
/// `toml_key` from the top-level table. RON and JSON hold the list directly.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    if format != Format::Toml {
        return parse_str(&content, format, path);
    }

    let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .get(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
        .clone();
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Register templates in file order and freeze the catalog. Duplicate keys
/// are reported against `file`.
pub fn build_catalog(
    templates: Vec<TemplateData>,
    file: &Path,
    seed: u64,
) -> Result<TemplateCatalog, DataLoadError> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut builder = CatalogBuilder::new();

    for (index, data) in templates.into_iter().enumerate() {
        if seen.insert(data.key.clone(), index).is_some() {
            return Err(DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name: data.key,
            });
        }
        builder.register(data.into_def());
    }

    Ok(builder.build(seed)?)
}

/// A layout entry with its template key and rotation resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedPlacement {
    pub template: TemplateId,
    pub rotation: Rotation,
    pub origin: Cell,
}

/// Resolve template keys and rotations in a layout.
pub fn resolve_layout(
    placements: Vec<PlacementData>,
    catalog: &TemplateCatalog,
    file: &Path,
) -> Result<Vec<PlannedPlacement>, DataLoadError> {
    placements
        .into_iter()
        .map(|p| {
            let template =
                catalog
                    .id_of(&p.template)
                    .ok_or_else(|| DataLoadError::UnresolvedRef {
                        file: file.to_path_buf(),
                        name: p.template.clone(),
                    })?;
            Ok(PlannedPlacement {
                template,
                rotation: Rotation::from_degrees(p.rotation)?,
                origin: Cell::new(p.x, p.y),
            })
        })
        .collect()
}

// ===========================================================================
// Game data
// ===========================================================================

/// Everything loaded from a game data directory.
#[derive(Debug, Clone)]
pub struct GameData {
    pub catalog: TemplateCatalog,
    pub config: SimConfig,
    pub layout: Vec<PlannedPlacement>,
}

impl GameData {
    /// Start a simulation and place the layout in order. Entries that do not
    /// fit are skipped with a warning.
    pub fn into_simulation(self) -> Result<Simulation, DataLoadError> {
        let mut sim = Simulation::new(self.catalog, self.config)?;
        for planned in &self.layout {
            let placed =
                sim.place_building(planned.template, planned.rotation, planned.origin)?;
            if placed.is_none() {
                warn!(
                    target: "sprawl::data",
                    template = planned.template.0,
                    x = planned.origin.x,
                    y = planned.origin.y,
                    "layout.blocked"
                );
            }
        }
        Ok(sim)
    }
}

/// Load templates, sim config, and layout from `dir`.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let config: SimConfig = match find_data_file(dir, "sim")? {
        Some(path) => deserialize_file(&path)?,
        None => SimConfig::default(),
    };
    config.validate()?;

    let templates_path = require_data_file(dir, "templates")?;
    let templates: Vec<TemplateData> = deserialize_list(&templates_path, "templates")?;
    let catalog = build_catalog(templates, &templates_path, config.seed)?;

    let layout = match find_data_file(dir, "layout")? {
        Some(path) => {
            let placements: Vec<PlacementData> = deserialize_list(&path, "placements")?;
            resolve_layout(placements, &catalog, &path)?
        }
        None => Vec::new(),
    };

    debug!(
        target: "sprawl::data",
        dir = %dir.display(),
        templates = catalog.len(),
        placements = layout.len(),
        "game_data.loaded"
    );

    Ok(GameData {
        catalog,
        config,
        layout,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
