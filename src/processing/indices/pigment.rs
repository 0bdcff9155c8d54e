// src/processing/indices/pigment.rs
//! Pigment and chlorophyll indices built on the red-edge bands.

use super::ratio;

/// Anthocyanin Reflectance Index over `[B3, B5]`: `1/B3 - 1/B5`.
pub fn ari(bands: &[f32]) -> Option<f32> {
    Some(ratio(1.0, bands[0])? - ratio(1.0, bands[1])?)
}

/// Modified ARI over `[B3, B5, B7]`: `(1/B3 - 1/B5) * B7`.
pub fn mari(bands: &[f32]) -> Option<f32> {
    ari(&bands[..2]).map(|v| v * bands[2])
}

/// Red-edge chlorophyll index over `[B7, B5]`: `B7/B5 - 1`.
pub fn chl_red_edge(bands: &[f32]) -> Option<f32> {
    ratio(bands[0], bands[1]).map(|v| v - 1.0)
}

/// MCARI over `[B5, B4, B3]`: `((B5 - B4) - 0.2 (B5 - B3)) * (B5 / B4)`.
pub fn mcari(bands: &[f32]) -> Option<f32> {
    let (b5, b4, b3) = (bands[0], bands[1], bands[2]);
    ratio(b5, b4).map(|r| ((b5 - b4) - 0.2 * (b5 - b3)) * r)
}
