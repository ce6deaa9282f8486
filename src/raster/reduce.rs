use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use super::{RasterFrame, clip_to_polygon};

/// Physically plausible index range. Values outside it are treated as
/// undefined before reduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub lower: f64,
    pub upper: f64,
}

impl Default for ValidRange {
    /// MODIS NDVI: water and bad retrievals fall below -0.3.
    fn default() -> Self {
        ValidRange {
            lower: -0.3,
            upper: 1.0,
        }
    }
}

impl ValidRange {
    /// Inclusive at both ends. NaN is never contained.
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && v <= self.upper
    }
}

/// How the defined pixels of one raster collapse into one number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    #[default]
    Median,
    Mean,
}

impl Statistic {
    /// `None` for an empty sample.
    pub fn apply(self, values: Vec<f64>) -> Option<f64> {
        match self {
            Statistic::Median => median(values),
            Statistic::Mean => mean(&values),
        }
    }
}

impl std::str::FromStr for Statistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "median" => Ok(Statistic::Median),
            "mean" => Ok(Statistic::Mean),
            other => Err(format!("unknown statistic '{other}' (expected median or mean)")),
        }
    }
}

/// Median of a sample; the mean of the two middle values when the count is even.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Clip a frame to the AOI, drop no-data and out-of-range pixels, and reduce
/// the rest. `None` means no pixel survived.
pub fn reduce_frame(
    frame: &RasterFrame,
    aoi: &MultiPolygon<f64>,
    range: ValidRange,
    statistic: Statistic,
) -> Option<f64> {
    let clipped = clip_to_polygon(frame, aoi);
    let valid: Vec<f64> = clipped.defined().filter(|v| range.contains(*v)).collect();
    statistic.apply(valid)
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};

    use super::*;
    use crate::raster::GeoTransform;

    fn whole_raster_aoi() -> MultiPolygon<f64> {
        let ring = LineString::from(vec![(0.0, 0.0), (3.0, 0.0), (3.0, 2.0), (0.0, 2.0), (0.0, 0.0)]);
        MultiPolygon(vec![Polygon::new(ring, vec![])])
    }

    fn frame(values: Vec<f64>) -> RasterFrame {
        RasterFrame {
            width: 3,
            height: 2,
            values,
            nodata: Some(-9999.0),
            transform: GeoTransform::north_up(0.0, 2.0, 1.0, 1.0),
        }
    }

    #[test]
    fn median_of_odd_and_even_samples() {
        assert_eq!(median(vec![0.3, 0.1, 0.2]), Some(0.2));
        assert_eq!(median(vec![0.4, 0.1, 0.3, 0.2]), Some(0.25));
        assert_eq!(median(Vec::new()), None);
    }

    #[test]
    fn median_ignores_pixel_order() {
        let a = frame(vec![0.2, 0.8, -9999.0, 0.5, 1.7, 0.4]);
        let b = frame(vec![1.7, 0.4, 0.5, -9999.0, 0.2, 0.8]);
        let aoi = whole_raster_aoi();
        let ra = reduce_frame(&a, &aoi, ValidRange::default(), Statistic::Median);
        let rb = reduce_frame(&b, &aoi, ValidRange::default(), Statistic::Median);
        // valid pixels {0.2, 0.4, 0.5, 0.8}
        assert_eq!(ra, Some(0.45));
        assert_eq!(ra, rb);
    }

    #[test]
    fn out_of_range_and_nodata_only_is_undefined() {
        let f = frame(vec![-9999.0, -0.5, 1.2, f64::NAN, -9999.0, 3.0]);
        assert_eq!(reduce_frame(&f, &whole_raster_aoi(), ValidRange::default(), Statistic::Median), None);
        assert_eq!(reduce_frame(&f, &whole_raster_aoi(), ValidRange::default(), Statistic::Mean), None);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let f = frame(vec![-0.3, 1.0, -0.31, 1.01, -9999.0, -9999.0]);
        assert_eq!(reduce_frame(&f, &whole_raster_aoi(), ValidRange::default(), Statistic::Mean), Some(0.35));
    }

    #[test]
    fn statistic_parses_case_insensitively() {
        assert_eq!("Median".parse::<Statistic>(), Ok(Statistic::Median));
        assert_eq!("mean".parse::<Statistic>(), Ok(Statistic::Mean));
        assert!("mode".parse::<Statistic>().is_err());
    }
}
