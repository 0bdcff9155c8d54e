// src/processing/indices/evi.rs
use super::ratio;

// EVI coefficients from MODIS documentation
const G: f32 = 2.5; // Gain factor
const L: f32 = 1.0; // Canopy background adjustment
const C1: f32 = 6.0; // Aerosol resistance (red)
const C2: f32 = 7.5; // Aerosol resistance (blue)

/// Enhanced Vegetation Index over `[B8, B4, B2]`, unclamped.
pub fn evi(bands: &[f32]) -> Option<f32> {
    let (nir, red, blue) = (bands[0], bands[1], bands[2]);
    ratio(G * (nir - red), nir + C1 * red - C2 * blue + L)
}
