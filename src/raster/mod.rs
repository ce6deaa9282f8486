//! Raster layer: dated index grids, their georeferencing, and the
//! clip → mask → reduce chain that turns one grid into one number.

pub mod clip;
pub mod geotiff;
pub mod reduce;

pub use clip::{ClippedGrid, clip_to_polygon};
pub use geotiff::{read_geotiff, write_geotiff};
pub use reduce::{Statistic, ValidRange, reduce_frame};

// ---------------------------------------------------------------------------
// GeoTransform – pixel ↔ map coordinates
// ---------------------------------------------------------------------------

/// Affine pixel-to-map transform in GDAL coefficient order:
///
/// ```text
/// x = c[0] + col * c[1] + row * c[2]
/// y = c[3] + col * c[4] + row * c[5]
/// ```
///
/// `(col, row)` address the upper-left corner of a pixel, so the pixel
/// centre is at `(col + 0.5, row + 0.5)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    /// North-up transform from the upper-left corner and pixel size.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        GeoTransform([origin_x, pixel_width, 0.0, origin_y, 0.0, -pixel_height.abs()])
    }

    /// From a GeoTIFF tie point (raster `i, j` ↔ model `x, y`) and pixel scale.
    pub fn from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> Option<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);
        let t = GeoTransform([x - i * sx, sx, 0.0, y + j * sy, 0.0, -sy]);
        t.is_invertible().then_some(t)
    }

    /// From a row-major 4x4 GeoTIFF `ModelTransformationTag` matrix.
    pub fn from_model_transformation(m: &[f64]) -> Option<Self> {
        if m.len() < 16 {
            return None;
        }
        let t = GeoTransform([m[3], m[0], m[1], m[7], m[4], m[5]]);
        t.is_invertible().then_some(t)
    }

    pub fn is_rotated(&self) -> bool {
        self.0[2] != 0.0 || self.0[4] != 0.0
    }

    fn determinant(&self) -> f64 {
        self.0[1] * self.0[5] - self.0[2] * self.0[4]
    }

    fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det != 0.0
    }

    /// Map coordinates of a (fractional) pixel position.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let c = &self.0;
        (c[0] + col * c[1] + row * c[2], c[3] + col * c[4] + row * c[5])
    }

    /// Fractional pixel position of a map coordinate.
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let c = &self.0;
        let det = self.determinant();
        let (dx, dy) = (x - c[0], y - c[3]);
        ((dx * c[5] - dy * c[2]) / det, (dy * c[1] - dx * c[4]) / det)
    }

    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }
}

// ---------------------------------------------------------------------------
// RasterFrame – one band of one dated raster
// ---------------------------------------------------------------------------

/// A single-band grid in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterFrame {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
    pub nodata: Option<f64>,
    pub transform: GeoTransform,
}

impl RasterFrame {
    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.values[row * self.width + col]
    }

    /// Whether a sample is the no-data sentinel or NaN.
    pub fn is_nodata(&self, v: f64) -> bool {
        v.is_nan() || self.nodata.is_some_and(|nd| v == nd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiepoint_transform_round_trips_pixel_centres() {
        let t = GeoTransform::from_tiepoint(&[0.0, 0.0, 0.0, 80.5, 22.5, 0.0], &[0.01, 0.01, 0.0]).unwrap();
        let (x, y) = t.pixel_center(2, 3);
        assert!((x - 80.525).abs() < 1e-9);
        assert!((y - 22.465).abs() < 1e-9);

        let (col, row) = t.invert(x, y);
        assert!((col - 2.5).abs() < 1e-9);
        assert!((row - 3.5).abs() < 1e-9);
    }

    #[test]
    fn model_transformation_reads_affine_terms() {
        let m = [
            0.5, 0.1, 0.0, 100.0, //
            0.2, -0.5, 0.0, 50.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        let t = GeoTransform::from_model_transformation(&m).unwrap();
        assert!(t.is_rotated());
        let (x, y) = t.apply(2.0, 4.0);
        assert!((x - 101.4).abs() < 1e-9 && (y - 48.4).abs() < 1e-9);

        let (col, row) = t.invert(101.4, 48.4);
        assert!((col - 2.0).abs() < 1e-9 && (row - 4.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_transform_is_rejected() {
        assert!(GeoTransform::from_tiepoint(&[0.0; 6], &[0.0, 0.0, 0.0]).is_none());
        assert!(GeoTransform::from_model_transformation(&[0.0; 4]).is_none());
    }
}
