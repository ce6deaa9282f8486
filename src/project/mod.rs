//! Project context: the named layers both pipelines read and write.
//!
//! A `Project` is built once per run and passed explicitly. When opened from a
//! directory it acts as the session that lets separate extractor and plotter
//! runs share layers.

pub mod vector;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::loader::{load_table, save_csv};
use crate::data::model::TableLayer;
use crate::error::ProjectError;
pub use vector::VectorLayer;

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Vector(VectorLayer),
    Table(TableLayer),
}

impl Layer {
    pub fn name(&self) -> &str {
        match self {
            Layer::Vector(v) => v.name(),
            Layer::Table(t) => t.name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Vector(_) => "vector",
            Layer::Table(_) => "table",
        }
    }
}

// ---------------------------------------------------------------------------
// LayerRepository
// ---------------------------------------------------------------------------

/// Lookup and registration of named layers.
pub trait LayerRepository {
    fn find_layer(&self, name: &str) -> Option<&Layer>;

    /// Register a layer, replacing any layer of the same name.
    fn register_layer(&mut self, layer: Layer);

    fn vector_layer(&self, name: &str) -> Result<&VectorLayer, ProjectError> {
        match self.find_layer(name) {
            Some(Layer::Vector(v)) => Ok(v),
            Some(other) => Err(ProjectError::WrongLayerKind {
                name: name.to_string(),
                expected: "vector",
                found: other.kind(),
            }),
            None => Err(ProjectError::LayerNotFound(name.to_string())),
        }
    }

    fn table_layer(&self, name: &str) -> Result<&TableLayer, ProjectError> {
        match self.find_layer(name) {
            Some(Layer::Table(t)) => Ok(t),
            Some(other) => Err(ProjectError::WrongLayerKind {
                name: name.to_string(),
                expected: "table",
                found: other.kind(),
            }),
            None => Err(ProjectError::LayerNotFound(name.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Project {
    dir: Option<PathBuf>,
    layers: BTreeMap<String, Layer>,
}

impl Project {
    /// An empty in-memory project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every layer file in `dir`. The layer name is the file stem.
    ///
    /// * `*.geojson` – vector layers
    /// * `*.csv`, `*.json` – table layers
    ///
    /// Files that fail to parse are logged and left out. Two files that
    /// load under the same name are an error: neither silently wins.
    pub fn open(dir: &Path) -> Result<Self> {
        let mut project = Project {
            dir: Some(dir.to_path_buf()),
            layers: BTreeMap::new(),
        };

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("reading project directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut sources: BTreeMap<String, PathBuf> = BTreeMap::new();
        for path in paths {
            let (Some(stem), Some(ext)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|e| e.to_str()),
            ) else {
                continue;
            };

            let loaded = match ext.to_ascii_lowercase().as_str() {
                "geojson" => VectorLayer::load(&path, stem).map(Layer::Vector),
                "csv" | "json" => load_table(&path, stem).map(Layer::Table),
                _ => continue,
            };
            // an unreadable file is not a layer, it does not spoil the project
            match loaded {
                Ok(layer) => {
                    if let Some(first) = sources.get(stem) {
                        return Err(ProjectError::DuplicateLayer {
                            name: stem.to_string(),
                            first: first.clone(),
                            second: path.clone(),
                        }
                        .into());
                    }
                    log::debug!("loaded {} layer '{}' from {}", layer.kind(), stem, path.display());
                    sources.insert(stem.to_string(), path.clone());
                    project.register_layer(layer);
                }
                Err(e) => log::warn!("Skipping {}: {e:#}", path.display()),
            }
        }

        log::info!(
            "Opened project {} with {} layers: {}",
            dir.display(),
            project.layers.len(),
            project.layer_names().collect::<Vec<_>>().join(", ")
        );
        Ok(project)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(|k| k.as_str())
    }

    /// Write a table layer to `<project dir>/<name>.csv`.
    pub fn save_table(&self, name: &str) -> Result<PathBuf> {
        let dir = self
            .dir
            .as_deref()
            .context("in-memory project has no directory to save into")?;
        let table = self.table_layer(name)?;
        let path = dir.join(format!("{name}.csv"));
        save_csv(table, &path)?;
        log::info!("Saved table '{name}' ({} rows) to {}", table.len(), path.display());
        Ok(path)
    }
}

impl LayerRepository for Project {
    fn find_layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    fn register_layer(&mut self, layer: Layer) {
        let name = layer.name().to_string();
        if let Some(old) = self.layers.insert(name.clone(), layer) {
            log::warn!("Replaced existing {} layer '{name}'", old.kind());
        }
    }
}
