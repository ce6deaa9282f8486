use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use ndvi_timeline::config::{ExtractConfig, SourceFolder};
use ndvi_timeline::extract::run_extraction;
use ndvi_timeline::project::Project;
use ndvi_timeline::raster::Statistic;

/// Median NDVI per dated raster inside an AOI, written as a table layer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Project directory holding the AOI layer; the table is saved here
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// JSON extractor configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raster folder, as PATH or SENSOR=PATH (repeatable)
    #[arg(short, long = "folder")]
    folders: Vec<String>,

    /// Sensor label for folders given without SENSOR=
    #[arg(long, default_value = "MODIS")]
    sensor: String,

    #[arg(long)]
    aoi_layer: Option<String>,

    #[arg(long)]
    output_layer: Option<String>,

    /// median or mean
    #[arg(long)]
    statistic: Option<Statistic>,

    /// Lower bound of valid index values
    #[arg(long, allow_hyphen_values = true)]
    lower: Option<f64>,

    /// Upper bound of valid index values
    #[arg(long, allow_hyphen_values = true)]
    upper: Option<f64>,

    /// First date to process, YYYY-MM-DD (inclusive)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Date to stop at, YYYY-MM-DD (exclusive)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Keep the table in memory only
    #[arg(long)]
    no_save: bool,
}

impl Args {
    fn extract_config(&self) -> Result<ExtractConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractConfig::load(path)?,
            None => ExtractConfig::default(),
        };

        for arg in &self.folders {
            let folder = match arg.split_once('=') {
                Some((sensor, path)) => SourceFolder {
                    path: path.into(),
                    sensor: sensor.to_string(),
                },
                None => SourceFolder {
                    path: arg.into(),
                    sensor: self.sensor.clone(),
                },
            };
            config.folders.push(folder);
        }
        if let Some(v) = &self.aoi_layer {
            config.aoi_layer = v.clone();
        }
        if let Some(v) = &self.output_layer {
            config.output_layer = v.clone();
        }
        if let Some(v) = self.statistic {
            config.statistic = v;
        }
        if let Some(v) = self.lower {
            config.valid_range.lower = v;
        }
        if let Some(v) = self.upper {
            config.valid_range.upper = v;
        }
        if self.start_date.is_some() {
            config.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            config.end_date = self.end_date;
        }

        if config.folders.is_empty() {
            bail!("no raster folder given (use --folder or a config file)");
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    ndvi_timeline::init_logging();
    let args = Args::parse();

    let config = args.extract_config()?;
    let mut project = Project::open(&args.project)?;

    let report = run_extraction(&mut project, &config)?;
    if !args.no_save {
        project.save_table(&config.output_layer)?;
    }

    log::info!(
        "✅ AOI-based median NDVI table '{}' created with {} rows",
        config.output_layer,
        report.records.len()
    );
    Ok(())
}
