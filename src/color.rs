use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// `n` distinct colours at evenly spaced hues, starting from green so a
/// single-sensor series reads as vegetation.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = 120.0 + (i as f32 / n as f32) * 360.0;
            let hsl: Hsl = Hsl::new(hue, 0.65, 0.45);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sensor label → Color32
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SensorColors {
    mapping: BTreeMap<Option<String>, Color32>,
}

impl SensorColors {
    pub fn new(labels: &BTreeSet<Option<String>>) -> Self {
        let mapping = labels
            .iter()
            .cloned()
            .zip(generate_palette(labels.len()))
            .collect();
        SensorColors { mapping }
    }

    pub fn color_for(&self, sensor: &Option<String>) -> Color32 {
        self.mapping.get(sensor).copied().unwrap_or(Color32::GRAY)
    }
}

/// Display text for a sensor label.
pub fn sensor_name(sensor: &Option<String>) -> &str {
    sensor.as_deref().unwrap_or("unlabelled")
}
