//! Spectral index helpers for surface-reflectance products.

/// `(a - b) / (a + b)`, NaN when either input is NaN or the sum is zero.
pub fn normalized_difference(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum == 0.0 {
        f64::NAN
    } else {
        (a - b) / sum
    }
}

/// MOD09A1 `StateQA`: cloud state lives in bits 0–1, `00` is clear.
pub fn modis_clear_sky(state_qa: u16) -> bool {
    state_qa & 0b11 == 0
}

/// Per-pixel NDVI from NIR (MODIS band 2) and red (band 1) reflectance.
/// Pixels flagged cloudy in `state_qa` become NaN.
pub fn ndvi_from_reflectance(nir: &[f64], red: &[f64], state_qa: Option<&[u16]>) -> Vec<f64> {
    nir.iter()
        .zip(red.iter())
        .enumerate()
        .map(|(i, (&n, &r))| {
            let clear = state_qa.map_or(true, |qa| qa.get(i).copied().is_some_and(modis_clear_sky));
            if clear {
                normalized_difference(n, r)
            } else {
                f64::NAN
            }
        })
        .collect()
}
