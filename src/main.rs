mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::NdviTimelineApp;
use clap::Parser;
use eframe::egui;
use ndvi_timeline::config::PlotConfig;
use ndvi_timeline::project::Project;
use ndvi_timeline::series::prepare_plot;

/// Plot the NDVI observations of a table layer in chronological order.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Project directory holding the table layer
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// JSON plot configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Table layer to plot
    #[arg(short, long)]
    layer: Option<String>,

    /// Chart title
    #[arg(short, long)]
    title: Option<String>,

    #[arg(long)]
    value_field: Option<String>,

    #[arg(long)]
    year_field: Option<String>,

    #[arg(long)]
    month_field: Option<String>,

    #[arg(long)]
    day_field: Option<String>,

    #[arg(long)]
    sensor_field: Option<String>,
}

impl Args {
    fn plot_config(&self) -> Result<PlotConfig> {
        let mut config = match &self.config {
            Some(path) => PlotConfig::load(path)?,
            None => PlotConfig::default(),
        };
        let fields = &mut config.fields;
        for (slot, value) in [
            (&mut config.layer, &self.layer),
            (&mut config.title, &self.title),
            (&mut fields.value, &self.value_field),
            (&mut fields.year, &self.year_field),
            (&mut fields.month, &self.month_field),
            (&mut fields.day, &self.day_field),
            (&mut fields.sensor, &self.sensor_field),
        ] {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    ndvi_timeline::init_logging();
    let args = Args::parse();

    let config = args.plot_config()?;
    let project = Project::open(&args.project)?;

    let Some(series) = prepare_plot(&project, &config).context("preparing plot")? else {
        return Ok(());
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 600.0])
            .with_min_inner_size([600.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        &config.title,
        options,
        Box::new(|_cc| Ok(Box::new(NdviTimelineApp::new(series)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
