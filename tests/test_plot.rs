use std::sync::{Mutex, Once};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use ndvi_timeline::config::{FieldBindings, PlotConfig};
use ndvi_timeline::error::ProjectError;
use ndvi_timeline::project::Project;
use ndvi_timeline::series::prepare_plot;

/// Process-wide logger that records warnings for assertions.
struct LogCapture {
    warnings: Mutex<Vec<String>>,
}

impl log::Log for LogCapture {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            self.warnings.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

impl LogCapture {
    /// Warnings mentioning `pattern`. Tests run in parallel, so each one
    /// matches on its own layer name.
    fn matching(&self, pattern: &str) -> Vec<String> {
        self.warnings
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.contains(pattern))
            .cloned()
            .collect()
    }
}

static CAPTURE: LogCapture = LogCapture {
    warnings: Mutex::new(Vec::new()),
};

fn captured_logs() -> &'static LogCapture {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(log::LevelFilter::Warn);
    });
    &CAPTURE
}

fn project_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Project) {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    let project = Project::open(dir.path()).unwrap();
    (dir, project)
}

fn plot(layer: &str) -> PlotConfig {
    PlotConfig {
        layer: layer.to_string(),
        title: "NDVI Time Series".to_string(),
        ..PlotConfig::default()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn earth_engine_export_plots_in_date_order() {
    // column order and extra columns as an Earth Engine table export writes them
    let csv = "system:index,date,day,landsat,median_ndvi,month,year,.geo\n\
               0,05-03-2010,5,MODIS,0.55,3,2010,\n\
               1,01-04-2010,1,MODIS,1.4,4,2010,\n\
               2,10-02-2010,10,MODIS,0.30,2,2010,\n";
    let (_dir, project) = project_with(&[("whole_kanha_table.csv", csv)]);

    let series = prepare_plot(&project, &plot("whole_kanha_table")).unwrap().unwrap();
    let points: Vec<(NaiveDate, f64)> = series.points.iter().map(|p| (p.date, p.value)).collect();
    assert_eq!(points, vec![(date(2010, 2, 10), 0.30), (date(2010, 3, 5), 0.55)]);
    assert_eq!(series.title, "NDVI Time Series");
    assert_eq!(series.dropped, 1);
}

#[test]
fn no_valid_rows_means_no_chart() {
    let csv = "year,month,day,median_ndvi\n\
               2010,3,5,\n\
               2010,4,1,1.7\n\
               2010,2,30,0.5\n\
               2010,5,9,-0.1\n";
    let (_dir, project) = project_with(&[("no_valid_rows.csv", csv)]);
    let logs = captured_logs();
    assert_eq!(prepare_plot(&project, &plot("no_valid_rows")).unwrap(), None);
    assert_eq!(
        logs.matching("'no_valid_rows'"),
        vec!["⚠ No valid data points found in 'no_valid_rows'".to_string()]
    );
}

#[test]
fn empty_table_means_no_chart() {
    let (_dir, project) = project_with(&[("empty_table.csv", "year,month,day,median_ndvi\n")]);
    let logs = captured_logs();
    assert_eq!(prepare_plot(&project, &plot("empty_table")).unwrap(), None);
    assert_eq!(logs.matching("No valid data points found in 'empty_table'").len(), 1);
}

#[test]
fn plottable_table_logs_no_warning() {
    let csv = "year,month,day,median_ndvi\n2010,3,5,0.5\n";
    let (_dir, project) = project_with(&[("has_points.csv", csv)]);
    let logs = captured_logs();
    assert!(prepare_plot(&project, &plot("has_points")).unwrap().is_some());
    assert!(logs.matching("'has_points'").is_empty());
}

#[test]
fn missing_layer_is_an_error() {
    let (_dir, project) = project_with(&[]);
    assert!(matches!(
        prepare_plot(&project, &plot("whole_kanha_table")),
        Err(ProjectError::LayerNotFound(_))
    ));
}

#[test]
fn custom_field_bindings_on_a_json_table() {
    let json = r#"[
        { "y": 2011, "m": 1, "d": 9, "mean_ndvi": 0.61, "sensor": "LANDSAT" },
        { "y": 2010, "m": 12, "d": 24, "mean_ndvi": 0.58, "sensor": "MODIS" },
        { "y": 2010, "m": 11, "mean_ndvi": 0.5, "sensor": "MODIS" }
    ]"#;
    let (_dir, project) = project_with(&[("mixed.json", json)]);

    let config = PlotConfig {
        fields: FieldBindings {
            value: "mean_ndvi".to_string(),
            year: "y".to_string(),
            month: "m".to_string(),
            day: "d".to_string(),
            sensor: "sensor".to_string(),
        },
        ..plot("mixed")
    };
    let series = prepare_plot(&project, &config).unwrap().unwrap();

    let points: Vec<(NaiveDate, Option<&str>)> = series
        .points
        .iter()
        .map(|p| (p.date, p.sensor.as_deref()))
        .collect();
    assert_eq!(
        points,
        vec![(date(2010, 12, 24), Some("MODIS")), (date(2011, 1, 9), Some("LANDSAT"))]
    );
    assert_eq!(series.dropped, 1);
}
