use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::model::{FIELD_DAY, FIELD_MONTH, FIELD_SENSOR, FIELD_VALUE, FIELD_YEAR};
use crate::raster::{Statistic, ValidRange};

// ---------------------------------------------------------------------------
// Extractor configuration
// ---------------------------------------------------------------------------

/// One folder of dated rasters and the sensor label its rows get.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFolder {
    pub path: PathBuf,
    pub sensor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Processed in order; files within a folder in filename order.
    pub folders: Vec<SourceFolder>,
    /// Vector layer used as the clip polygon.
    pub aoi_layer: String,
    /// Table layer the observations are written to.
    pub output_layer: String,
    pub valid_range: ValidRange,
    pub statistic: Statistic,
    /// First acquisition date to process (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Acquisition date to stop at (exclusive).
    pub end_date: Option<NaiveDate>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            folders: Vec::new(),
            aoi_layer: "kanha_grass_1".to_string(),
            output_layer: "gl1_kanha_table".to_string(),
            valid_range: ValidRange::default(),
            statistic: Statistic::default(),
            start_date: None,
            end_date: None,
        }
    }
}

impl ExtractConfig {
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    /// Whether an acquisition date falls inside the configured window.
    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start) && self.end_date.map_or(true, |end| date < end)
    }
}

// ---------------------------------------------------------------------------
// Plot configuration
// ---------------------------------------------------------------------------

/// Which table fields hold the date components, the index value and the
/// sensor label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldBindings {
    pub value: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub sensor: String,
}

impl Default for FieldBindings {
    fn default() -> Self {
        FieldBindings {
            value: FIELD_VALUE.to_string(),
            year: FIELD_YEAR.to_string(),
            month: FIELD_MONTH.to_string(),
            day: FIELD_DAY.to_string(),
            sensor: FIELD_SENSOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub layer: String,
    pub title: String,
    pub fields: FieldBindings,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            layer: "whole_kanha_table".to_string(),
            title: "NDVI Time Series - Whole Kanha (2010-2011)".to_string(),
            fields: FieldBindings::default(),
        }
    }
}

impl PlotConfig {
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}
