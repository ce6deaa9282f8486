use std::path::Path;

use anyhow::{Context, Result};
use geo::{Geometry, GeometryCollection, MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson};

/// A named polygon layer. All polygon features are kept together as one
/// multipolygon; other geometry types are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayer {
    name: String,
    polygons: MultiPolygon<f64>,
}

impl VectorLayer {
    pub fn new(name: &str, polygons: MultiPolygon<f64>) -> Self {
        VectorLayer {
            name: name.to_string(),
            polygons,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.0.is_empty()
    }

    pub fn load(path: &Path, name: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_geojson_str(name, &text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_geojson_str(name: &str, text: &str) -> Result<Self> {
        let geojson: GeoJson = text.parse().context("invalid GeoJSON")?;
        let collection =
            GeometryCollection::<f64>::try_from(&geojson).context("unsupported GeoJSON geometry")?;

        let mut polygons: Vec<Polygon<f64>> = Vec::new();
        for geometry in collection {
            collect_polygons(geometry, &mut polygons);
        }
        Ok(VectorLayer::new(name, MultiPolygon(polygons)))
    }

    /// Serialize as a GeoJSON feature collection with one feature per polygon.
    pub fn to_geojson_string(&self) -> String {
        let features = self
            .polygons
            .0
            .iter()
            .map(|p| Feature {
                geometry: Some(geojson::Geometry::new(geojson::Value::from(p))),
                ..Default::default()
            })
            .collect();
        GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
        .to_string()
    }
}

fn collect_polygons(geometry: Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p),
        Geometry::MultiPolygon(mp) => out.extend(mp.0),
        Geometry::GeometryCollection(gc) => {
            for g in gc {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use geo::{Area, LineString};

    use super::*;

    const KANHA: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "name": "grass 1" },
              "geometry": { "type": "Polygon", "coordinates": [
                [[80.53, 22.05], [81.2, 22.05], [81.2, 22.45], [80.53, 22.45], [80.53, 22.05]]
              ] } },
            { "type": "Feature", "properties": {},
              "geometry": { "type": "Point", "coordinates": [80.9, 22.2] } }
        ]
    }"#;

    #[test]
    fn polygons_are_collected_points_ignored() {
        let layer = VectorLayer::from_geojson_str("kanha_grass_1", KANHA).unwrap();
        assert_eq!(layer.name(), "kanha_grass_1");
        assert_eq!(layer.polygons().0.len(), 1);
        assert!((layer.polygons().unsigned_area() - 0.67 * 0.40).abs() < 1e-9);
    }

    #[test]
    fn geojson_round_trip_keeps_rings() {
        let ring = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let layer = VectorLayer::new("aoi", MultiPolygon(vec![Polygon::new(ring, vec![])]));
        let back = VectorLayer::from_geojson_str("aoi", &layer.to_geojson_string()).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn point_only_layer_is_empty() {
        let text = r#"{ "type": "Point", "coordinates": [1.0, 2.0] }"#;
        assert!(VectorLayer::from_geojson_str("p", text).unwrap().is_empty());
    }
}
