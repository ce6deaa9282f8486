//! Per-date NDVI statistics over an area of interest, and the chronological
//! series built from them.
//!
//! ```text
//!  *.tif (dated)      AOI (*.geojson)
//!        │                 │
//!        ▼                 ▼
//!   ┌──────────┐     ┌──────────┐
//!   │  raster   │────▶│ extract  │  clip → mask → median, one row per file
//!   └──────────┘     └──────────┘
//!                          │
//!                          ▼
//!                   ┌────────────┐
//!                   │  project   │  named layers (vector + table)
//!                   └────────────┘
//!                          │
//!                          ▼
//!                   ┌────────────┐
//!                   │  series    │  parse dates, filter (0,1], sort
//!                   └────────────┘
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod extract;
pub mod index;
pub mod project;
pub mod raster;
pub mod series;

/// Initialise `env_logger` with an `info` default that `RUST_LOG` overrides.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
