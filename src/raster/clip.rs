use geo::{BoundingRect, Intersects, MultiPolygon, Point};

use super::RasterFrame;

/// The part of a raster covered by a polygon's bounding rectangle.
///
/// Pixels whose centre falls outside the polygon, and the raster's own
/// no-data pixels, are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedGrid {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl ClippedGrid {
    fn empty() -> Self {
        ClippedGrid {
            width: 0,
            height: 0,
            values: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterator over pixels that are neither masked nor no-data.
    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| !v.is_nan())
    }
}

/// Crop `frame` to the bounding rectangle of `aoi` and mask everything the
/// polygon does not cover. A polygon that misses the raster yields an empty grid.
pub fn clip_to_polygon(frame: &RasterFrame, aoi: &MultiPolygon<f64>) -> ClippedGrid {
    let Some(bbox) = aoi.bounding_rect() else {
        return ClippedGrid::empty();
    };

    // pixel window spanned by the four bbox corners
    let (min, max) = (bbox.min(), bbox.max());
    let corners = [(min.x, min.y), (min.x, max.y), (max.x, min.y), (max.x, max.y)]
        .map(|(x, y)| frame.transform.invert(x, y));

    let col_lo = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let col_hi = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let row_lo = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let row_hi = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let col0 = clamp_index(col_lo.floor(), frame.width);
    let col1 = clamp_index(col_hi.ceil(), frame.width);
    let row0 = clamp_index(row_lo.floor(), frame.height);
    let row1 = clamp_index(row_hi.ceil(), frame.height);
    if col0 >= col1 || row0 >= row1 {
        return ClippedGrid::empty();
    }

    let (width, height) = (col1 - col0, row1 - row0);
    let mut values = Vec::with_capacity(width * height);
    for row in row0..row1 {
        for col in col0..col1 {
            let (x, y) = frame.transform.pixel_center(col, row);
            let v = frame.get(col, row);
            if frame.is_nodata(v) || !aoi.intersects(&Point::new(x, y)) {
                values.push(f64::NAN);
            } else {
                values.push(v);
            }
        }
    }

    ClippedGrid { width, height, values }
}

fn clamp_index(v: f64, len: usize) -> usize {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        (v as usize).min(len)
    }
}
