use std::path::PathBuf;

use chrono::NaiveDate;
use geo::{LineString, MultiPolygon, Polygon};
use pretty_assertions::assert_eq;

use ndvi_timeline::config::{ExtractConfig, SourceFolder};
use ndvi_timeline::data::model::{ObservationRecord, TableLayer, observation_schema};
use ndvi_timeline::error::ProjectError;
use ndvi_timeline::project::{Layer, LayerRepository, Project, VectorLayer};

fn observations(name: &str) -> TableLayer {
    let mut table = TableLayer::new(name, observation_schema());
    let date = NaiveDate::from_ymd_opt(2010, 3, 5).unwrap();
    table
        .add_feature(ObservationRecord::new(date, Some(0.5), "MODIS").to_values())
        .unwrap();
    table
}

#[test]
fn stale_json_beside_saved_csv_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let stale = r#"[{ "year": 2009, "month": 1, "day": 1, "median_ndvi": 0.1 }]"#;
    std::fs::write(dir.path().join("t.json"), stale).unwrap();

    let mut project = Project::open(dir.path()).unwrap();
    project.register_layer(Layer::Table(observations("t")));
    let saved = project.save_table("t").unwrap();

    let err = Project::open(dir.path()).unwrap_err();
    match err.downcast_ref::<ProjectError>() {
        Some(ProjectError::DuplicateLayer { name, first, second }) => {
            assert_eq!(name, "t");
            assert_eq!(first, &saved);
            assert_eq!(second, &dir.path().join("t.json"));
        }
        other => panic!("expected a duplicate layer error, got {other:?}"),
    }
}

#[test]
fn vector_and_table_with_one_name_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let ring = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
    let aoi = VectorLayer::new("aoi", MultiPolygon(vec![Polygon::new(ring, vec![])]));
    std::fs::write(dir.path().join("aoi.geojson"), aoi.to_geojson_string()).unwrap();
    std::fs::write(dir.path().join("aoi.csv"), "a,b\n1,2\n").unwrap();

    let err = Project::open(dir.path()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProjectError>(),
        Some(ProjectError::DuplicateLayer { name, .. }) if name == "aoi"
    ));
}

#[test]
fn unreadable_duplicate_does_not_block_opening() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("t.csv"), "year,month,day,median_ndvi\n2010,3,5,0.5\n").unwrap();
    std::fs::write(dir.path().join("t.json"), "{ not json").unwrap();

    let project = Project::open(dir.path()).unwrap();
    assert_eq!(project.table_layer("t").unwrap().len(), 1);
}

#[test]
fn config_folder_is_not_read_as_layers() {
    let dir = tempfile::tempdir().unwrap();
    let ring = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
    let aoi = VectorLayer::new("kanha_grass_1", MultiPolygon(vec![Polygon::new(ring, vec![])]));
    std::fs::write(dir.path().join("kanha_grass_1.geojson"), aoi.to_geojson_string()).unwrap();

    let config_dir = dir.path().join("config");
    std::fs::create_dir(&config_dir).unwrap();
    let config = ExtractConfig {
        folders: vec![SourceFolder {
            path: PathBuf::from("MODIS_NDVI_TIFS"),
            sensor: "MODIS".to_string(),
        }],
        ..ExtractConfig::default()
    };
    let config_path = config_dir.join("extract.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let project = Project::open(dir.path()).unwrap();
    assert_eq!(project.layer_names().collect::<Vec<_>>(), vec!["kanha_grass_1"]);
    assert_eq!(ExtractConfig::load(&config_path).unwrap(), config);
}
