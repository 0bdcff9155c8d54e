// src/processing/indices/ndi.rs

/// Normalized difference `(a - b) / (a + b)`.
///
/// Undefined when `a + b` is exactly zero.
pub fn normalized_difference(a: f32, b: f32) -> Option<f32> {
    let sum = a + b;
    if sum == 0.0 {
        None
    } else {
        Some((a - b) / sum)
    }
}

/// Shared formula for every two-band normalized difference index.
///
/// Band order is taken from the registry entry: `[a, b]`.
pub fn nd_pair(bands: &[f32]) -> Option<f32> {
    normalized_difference(bands[0], bands[1])
}
