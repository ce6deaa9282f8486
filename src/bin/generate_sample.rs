use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use clap::Parser;
use geo::{LineString, MultiPolygon, Polygon};
use ndvi_timeline::config::{ExtractConfig, SourceFolder};
use ndvi_timeline::index::ndvi_from_reflectance;
use ndvi_timeline::project::VectorLayer;
use ndvi_timeline::raster::{GeoTransform, RasterFrame, write_geotiff};

/// Write a synthetic MODIS NDVI project: an AOI layer, one 8-day composite
/// GeoTIFF per date, and an extractor config.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Output project directory
    #[arg(short, long, default_value = "sample_project")]
    out: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value = "2010-02-02")]
    start: NaiveDate,

    #[arg(long, default_value = "2011-06-26")]
    end: NaiveDate,
}

const NODATA: f64 = -9999.0;
const PIXEL: f64 = 0.01;
// raster extent, a little wider than the AOI
const WEST: f64 = 80.45;
const NORTH: f64 = 22.55;
const WIDTH: usize = 85;
const HEIGHT: usize = 60;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut state = [0u64; 4];
        let mut x = seed;
        for slot in &mut state {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state }
    }

    fn next_u64(&mut self) -> u64 {
        let s = &mut self.state;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;
        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        mean + std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

/// Seasonal grassland NDVI: monsoon green-up peaking in late August.
fn seasonal_ndvi(date: NaiveDate) -> f64 {
    let doy = date.ordinal() as f64;
    0.42 + 0.22 * (2.0 * PI * (doy - 150.0) / 365.25).sin()
}

fn kanha_aoi() -> VectorLayer {
    let ring = LineString::from(vec![
        (80.53, 22.05),
        (81.2, 22.05),
        (81.2, 22.45),
        (80.53, 22.45),
        (80.53, 22.05),
    ]);
    VectorLayer::new("kanha_grass_1", MultiPolygon(vec![Polygon::new(ring, vec![])]))
}

/// One composite: red/NIR reflectance around the seasonal NDVI, a small
/// water body inside the AOI, and clouds flagged in StateQA.
fn composite(date: NaiveDate, rng: &mut SimpleRng) -> RasterFrame {
    let target = seasonal_ndvi(date);
    // monsoon months are cloudier
    let cloud_cover = match date.month() {
        7 | 8 => 0.6,
        6 | 9 => 0.3,
        _ => 0.05,
    };
    // an occasional fully overcast composite
    let overcast = rng.next_f64() < 0.04;

    let n = WIDTH * HEIGHT;
    let mut red = Vec::with_capacity(n);
    let mut nir = Vec::with_capacity(n);
    let mut qa = Vec::with_capacity(n);
    for row in 0..HEIGHT {
        for col in 0..WIDTH {
            let water = (12..18).contains(&row) && (10..20).contains(&col);
            let ndvi = if water {
                -0.45 + rng.gauss(0.0, 0.05)
            } else {
                (target + rng.gauss(0.0, 0.06)).clamp(-0.2, 0.95)
            };
            let r = (0.08 + rng.gauss(0.0, 0.01)).max(0.01);
            red.push(r);
            nir.push(r * (1.0 + ndvi) / (1.0 - ndvi));
            qa.push(if overcast || rng.next_f64() < cloud_cover { 1u16 } else { 0 });
        }
    }

    let values = ndvi_from_reflectance(&nir, &red, Some(&qa))
        .into_iter()
        .map(|v| if v.is_nan() { NODATA } else { v })
        .collect();

    RasterFrame {
        width: WIDTH,
        height: HEIGHT,
        values,
        nodata: Some(NODATA),
        transform: GeoTransform::north_up(WEST, NORTH, PIXEL, PIXEL),
    }
}

fn main() -> Result<()> {
    ndvi_timeline::init_logging();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let tif_dir = args.out.join("MODIS_NDVI_TIFS");
    std::fs::create_dir_all(&tif_dir).with_context(|| format!("creating {}", tif_dir.display()))?;

    let aoi = kanha_aoi();
    let aoi_path = args.out.join(format!("{}.geojson", aoi.name()));
    std::fs::write(&aoi_path, aoi.to_geojson_string())
        .with_context(|| format!("writing {}", aoi_path.display()))?;

    let mut count = 0;
    let mut date = args.start;
    while date <= args.end {
        let path = tif_dir.join(format!("MODIS_NDVI_{}.tif", date.format("%Y_%m_%d")));
        write_geotiff(&path, &composite(date, &mut rng))
            .with_context(|| format!("writing {}", path.display()))?;
        count += 1;
        date += Duration::days(8);
    }

    let config = ExtractConfig {
        folders: vec![SourceFolder {
            path: tif_dir.clone(),
            sensor: "MODIS".to_string(),
        }],
        aoi_layer: aoi.name().to_string(),
        ..ExtractConfig::default()
    };
    // kept out of the project's top level, where every file is a layer
    let config_dir = args.out.join("config");
    std::fs::create_dir_all(&config_dir).with_context(|| format!("creating {}", config_dir.display()))?;
    let config_path = config_dir.join("extract.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("writing {}", config_path.display()))?;

    log::info!(
        "Wrote {count} composites ({WIDTH}x{HEIGHT} px) to {}, AOI to {}, config to {}",
        tif_dir.display(),
        aoi_path.display(),
        config_path.display()
    );
    Ok(())
}
