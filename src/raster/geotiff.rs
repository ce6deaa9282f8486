use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype};
use tiff::tags::Tag;

use super::{GeoTransform, RasterFrame};
use crate::error::RasterError;

// GeoTIFF / GDAL private tags
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

/// GeoKeyDirectory for geographic WGS84 (EPSG:4326), pixel-is-area.
const GEO_KEYS_WGS84: [u16; 16] = [
    1, 1, 0, 3, //
    1024, 0, 1, 2, // GTModelTypeGeoKey = geographic
    1025, 0, 1, 1, // GTRasterTypeGeoKey = pixel is area
    2048, 0, 1, 4326, // GeographicTypeGeoKey
];

fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Decode band 1 of a GeoTIFF.
///
/// Any integer or float sample type is widened to `f64`. Interleaved
/// multi-sample images keep only the first sample of every pixel.
pub fn read_geotiff(path: &Path) -> Result<RasterFrame, RasterError> {
    let file = File::open(path).map_err(|source| RasterError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let (width, height) = decoder.dimensions()?;
    let transform = read_transform(&mut decoder)?;
    let nodata = read_nodata(&mut decoder)?;

    let samples = match decoder.read_image()? {
        DecodingResult::U8(v) => widen(v),
        DecodingResult::U16(v) => widen(v),
        DecodingResult::U32(v) => widen(v),
        DecodingResult::U64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::I8(v) => widen(v),
        DecodingResult::I16(v) => widen(v),
        DecodingResult::I32(v) => widen(v),
        DecodingResult::I64(v) => v.into_iter().map(|s| s as f64).collect(),
        DecodingResult::F32(v) => widen(v),
        DecodingResult::F64(v) => v,
        #[allow(unreachable_patterns)]
        _ => return Err(RasterError::UnsupportedSampleType("unknown")),
    };

    let pixels = width as usize * height as usize;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(RasterError::SizeMismatch {
            width,
            height,
            len: samples.len(),
        });
    }
    let stride = samples.len() / pixels;
    let values = if stride == 1 {
        samples
    } else {
        samples.into_iter().step_by(stride).collect()
    };

    Ok(RasterFrame {
        width: width as usize,
        height: height as usize,
        values,
        nodata,
        transform,
    })
}

fn widen<T: Into<f64>>(v: Vec<T>) -> Vec<f64> {
    v.into_iter().map(Into::into).collect()
}

fn read_f64_tag<R>(decoder: &mut Decoder<R>, code: u16) -> Result<Option<Vec<f64>>, RasterError>
where
    R: std::io::Read + std::io::Seek,
{
    match decoder.find_tag(tag(code))? {
        Some(value) => Ok(Some(value.into_f64_vec()?)),
        None => Ok(None),
    }
}

fn read_transform<R>(decoder: &mut Decoder<R>) -> Result<GeoTransform, RasterError>
where
    R: std::io::Read + std::io::Seek,
{
    if let Some(matrix) = read_f64_tag(decoder, MODEL_TRANSFORMATION)? {
        return GeoTransform::from_model_transformation(&matrix).ok_or(RasterError::NotGeoreferenced);
    }
    let tiepoint = read_f64_tag(decoder, MODEL_TIEPOINT)?;
    let scale = read_f64_tag(decoder, MODEL_PIXEL_SCALE)?;
    match (tiepoint, scale) {
        (Some(tp), Some(sc)) => GeoTransform::from_tiepoint(&tp, &sc).ok_or(RasterError::NotGeoreferenced),
        _ => Err(RasterError::NotGeoreferenced),
    }
}

/// `GDAL_NODATA` is ASCII; an unparsable value means "no sentinel".
fn read_nodata<R>(decoder: &mut Decoder<R>) -> Result<Option<f64>, RasterError>
where
    R: std::io::Read + std::io::Seek,
{
    match decoder.find_tag(tag(GDAL_NODATA))? {
        Some(value) => {
            let text = value.into_string()?;
            Ok(text.trim_matches(|c: char| c == '\0' || c.is_whitespace()).parse::<f64>().ok())
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write a frame as a single-band float32 GeoTIFF in EPSG:4326.
///
/// North-up frames get tie point + pixel scale tags, rotated ones a
/// model transformation matrix.
pub fn write_geotiff(path: &Path, frame: &RasterFrame) -> Result<(), RasterError> {
    let file = File::create(path).map_err(|source| RasterError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    let mut image = encoder.new_image::<colortype::Gray32Float>(frame.width as u32, frame.height as u32)?;

    let c = frame.transform.0;
    if frame.transform.is_rotated() {
        let matrix = [
            c[1], c[2], 0.0, c[0], //
            c[4], c[5], 0.0, c[3], //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        image.encoder().write_tag(tag(MODEL_TRANSFORMATION), &matrix[..])?;
    } else {
        image.encoder().write_tag(tag(MODEL_PIXEL_SCALE), &[c[1], -c[5], 0.0][..])?;
        image.encoder().write_tag(tag(MODEL_TIEPOINT), &[0.0, 0.0, 0.0, c[0], c[3], 0.0][..])?;
    }
    image.encoder().write_tag(tag(GEO_KEY_DIRECTORY), &GEO_KEYS_WGS84[..])?;
    if let Some(nodata) = frame.nodata {
        image.encoder().write_tag(tag(GDAL_NODATA), nodata.to_string().as_str())?;
    }

    let data: Vec<f32> = frame.values.iter().map(|&v| v as f32).collect();
    image.write_data(&data)?;
    Ok(())
}
