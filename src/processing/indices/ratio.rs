// src/processing/indices/ratio.rs
use super::ratio;

/// Moisture Stress Index over `[B11, B8]`.
pub fn msi(bands: &[f32]) -> Option<f32> {
    ratio(bands[0], bands[1])
}

/// Pigment Specific Simple Ratio (chlorophyll b) over `[B8, B4]`.
pub fn pssrb1(bands: &[f32]) -> Option<f32> {
    ratio(bands[0], bands[1])
}

/// Structure Insensitive Pigment Index over `[B8, B1, B4]`:
/// `(B8 - B1) / (B8 - B4)`.
pub fn sipi(bands: &[f32]) -> Option<f32> {
    let (b8, b1, b4) = (bands[0], bands[1], bands[2]);
    ratio(b8 - b1, b8 - b4)
}
