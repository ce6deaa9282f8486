//! Extractor: one observation per dated raster, clipped to the AOI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use geo::MultiPolygon;

use crate::config::ExtractConfig;
use crate::data::model::{ObservationRecord, TableLayer, observation_schema};
use crate::error::{ProjectError, SkipReason};
use crate::project::{Layer, LayerRepository};
use crate::raster::{read_geotiff, reduce_frame};

/// Outcome of one extractor run.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Rows appended to the output table, in insertion order.
    pub records: Vec<ObservationRecord>,
    /// Files that produced no row, and why.
    pub skipped: Vec<(PathBuf, SkipReason)>,
    /// Files whose date fell outside the configured window.
    pub excluded: usize,
}

impl ExtractionReport {
    /// Rows whose value is undefined (no pixel survived masking).
    pub fn undefined(&self) -> usize {
        self.records.iter().filter(|r| r.value.is_none()).count()
    }
}

/// Acquisition date from a `<PREFIX>_<PREFIX>_YYYY_MM_DD` stem.
///
/// Tokens after the day are ignored.
pub fn parse_filename_date(stem: &str) -> Result<NaiveDate, SkipReason> {
    let malformed = || SkipReason::MalformedFilename(stem.to_string());
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 5 {
        return Err(malformed());
    }
    let year: i32 = parts[2].parse().map_err(|_| malformed())?;
    let month: u32 = parts[3].parse().map_err(|_| malformed())?;
    let day: u32 = parts[4].parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(SkipReason::InvalidDate { year, month, day })
}

/// `*.tif` files in `dir` (extension case-insensitive), sorted by file name.
pub fn list_rasters(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing raster folder {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("tif"))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read, clip and reduce one raster into a record.
pub fn process_raster(
    path: &Path,
    date: NaiveDate,
    sensor: &str,
    aoi: &MultiPolygon<f64>,
    config: &ExtractConfig,
) -> Result<ObservationRecord, SkipReason> {
    let frame = read_geotiff(path)?;
    let value = reduce_frame(&frame, aoi, config.valid_range, config.statistic);
    Ok(ObservationRecord::new(date, value, sensor))
}

/// Run the extractor over every configured folder and register the output
/// table with the project.
///
/// Only a missing or unusable AOI layer, an unreadable folder, or a table
/// schema violation aborts the run; per-file failures are collected in the
/// report.
pub fn run_extraction<R: LayerRepository>(project: &mut R, config: &ExtractConfig) -> Result<ExtractionReport> {
    let aoi_layer = project.vector_layer(&config.aoi_layer)?;
    if aoi_layer.is_empty() {
        return Err(ProjectError::NoPolygon(config.aoi_layer.clone()).into());
    }
    let aoi = aoi_layer.polygons().clone();

    let mut table = TableLayer::new(&config.output_layer, observation_schema());
    let mut report = ExtractionReport::default();

    for folder in &config.folders {
        let files = list_rasters(&folder.path)?;
        log::info!(
            "{}: {} rasters in {}",
            folder.sensor,
            files.len(),
            folder.path.display()
        );

        for path in files {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let outcome = parse_filename_date(stem).and_then(|date| {
                if !config.in_window(date) {
                    return Ok(None);
                }
                process_raster(&path, date, &folder.sensor, &aoi, config).map(Some)
            });

            match outcome {
                Ok(Some(record)) => {
                    log::info!("{record}");
                    table.add_feature(record.to_values())?;
                    report.records.push(record);
                }
                Ok(None) => {
                    log::debug!("{} outside date window", path.display());
                    report.excluded += 1;
                }
                Err(reason) => {
                    log::warn!("Error processing {}: {reason}", path.display());
                    report.skipped.push((path, reason));
                }
            }
        }
    }

    log::info!(
        "Table '{}' created: {} rows ({} undefined), {} files skipped, {} outside date window",
        config.output_layer,
        report.records.len(),
        report.undefined(),
        report.skipped.len(),
        report.excluded
    );
    project.register_layer(Layer::Table(table));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_comes_from_third_to_fifth_token() {
        assert_eq!(
            parse_filename_date("SENSOR_NDVI_2010_03_05").unwrap(),
            NaiveDate::from_ymd_opt(2010, 3, 5).unwrap()
        );
        assert_eq!(
            parse_filename_date("LANDSAT_NDVI_2011_12_31_v2").unwrap(),
            NaiveDate::from_ymd_opt(2011, 12, 31).unwrap()
        );
    }

    #[test]
    fn impossible_dates_are_skipped() {
        assert!(matches!(
            parse_filename_date("SENSOR_NDVI_2010_13_05"),
            Err(SkipReason::InvalidDate { year: 2010, month: 13, day: 5 })
        ));
        assert!(matches!(
            parse_filename_date("SENSOR_NDVI_2011_02_29"),
            Err(SkipReason::InvalidDate { .. })
        ));
    }

    #[test]
    fn short_or_non_numeric_names_are_malformed() {
        assert!(matches!(parse_filename_date("NDVI_2010_03"), Err(SkipReason::MalformedFilename(_))));
        assert!(matches!(
            parse_filename_date("SENSOR_NDVI_2010_March_05"),
            Err(SkipReason::MalformedFilename(_))
        ));
    }

    #[test]
    fn missing_aoi_is_fatal() {
        let mut project = crate::project::Project::new();
        let err = run_extraction(&mut project, &ExtractConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::LayerNotFound(name)) if name == "kanha_grass_1"
        ));
    }
}
