// src/processing/indices/savi.rs
use super::ratio;

/// Soil brightness correction used by the registry's SAVI.
pub const SOIL_FACTOR: f32 = 0.428;

/// Soil Adjusted Vegetation Index over `[B8, B4]`:
/// `(NIR - RED) / (NIR + RED + L) * (1 + L)`.
pub fn savi(bands: &[f32]) -> Option<f32> {
    savi_with(bands[0], bands[1], SOIL_FACTOR)
}

pub fn savi_with(nir: f32, red: f32, soil_factor: f32) -> Option<f32> {
    ratio(nir - red, nir + red + soil_factor).map(|v| v * (1.0 + soil_factor))
}
