// src/processing/indices/mod.rs
//! Registry of spectral index formulas.
//!
//! Each index is one [`IndexDefinition`] record in [`REGISTRY`]: the bands it
//! reads, a per-pixel formula over those bands (in declaration order), and
//! the fixed range and colour ramp it is displayed with. Adding an index
//! means adding a record.

pub mod evi;
pub mod ndi;
pub mod palettes;
pub mod pigment;
pub mod ratio;
pub mod savi;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-pixel formula. `None` marks a singular pixel (zero denominator).
pub type Formula = fn(&[f32]) -> Option<f32>;

/// `num / den`, undefined when `den` is exactly zero.
pub fn ratio(num: f32, den: f32) -> Option<f32> {
    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}

/// Fixed display range and ramp of an index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisDefaults {
    pub min: f64,
    pub max: f64,
    pub palette: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct IndexDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub bands: &'static [&'static str],
    pub formula: Formula,
    pub vis: VisDefaults,
}

impl std::fmt::Debug for IndexDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexDefinition")
            .field("name", &self.name)
            .field("bands", &self.bands)
            .field("vis", &self.vis)
            .finish_non_exhaustive()
    }
}

/// Visualization parameters handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
    pub palette: Vec<String>,
}

impl From<VisDefaults> for VisParams {
    fn from(vis: VisDefaults) -> Self {
        Self {
            min: vis.min,
            max: vis.max,
            palette: vis.palette.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Trait for per-pixel spectral index calculators.
pub trait IndexCalculator: Send + Sync {
    /// Name of the index
    fn name(&self) -> &str;

    /// Bands the calculator reads, in the order `compute` receives them
    fn required_bands(&self) -> &[&str];

    /// Index value for one pixel; `None` if the formula is singular there
    fn compute(&self, bands: &[f32]) -> Option<f32>;
}

impl IndexCalculator for IndexDefinition {
    fn name(&self) -> &str {
        self.name
    }

    fn required_bands(&self) -> &[&str] {
        self.bands
    }

    fn compute(&self, bands: &[f32]) -> Option<f32> {
        (self.formula)(bands)
    }
}

const fn vis(min: f64, max: f64, palette: &'static [&'static str]) -> VisDefaults {
    VisDefaults { min, max, palette }
}

pub static REGISTRY: [IndexDefinition; 15] = [
    IndexDefinition {
        name: "NDVI",
        description: "Normalized Difference Vegetation Index",
        bands: &["B8", "B4"],
        formula: ndi::nd_pair,
        vis: vis(0.0, 1.0, palettes::RED_YELLOW_GREEN),
    },
    IndexDefinition {
        name: "ARI",
        description: "Anthocyanin Reflectance Index",
        bands: &["B3", "B5"],
        formula: pigment::ari,
        vis: vis(0.0, 3.0, palettes::ANTHOCYANIN),
    },
    IndexDefinition {
        name: "mARI",
        description: "Modified Anthocyanin Reflectance Index",
        bands: &["B3", "B5", "B7"],
        formula: pigment::mari,
        vis: vis(0.0, 1.0, palettes::ANTHOCYANIN),
    },
    IndexDefinition {
        name: "CHL-RED-EDGE",
        description: "Red-edge Chlorophyll Index",
        bands: &["B7", "B5"],
        formula: pigment::chl_red_edge,
        vis: vis(0.0, 5.0, palettes::CHLOROPHYLL),
    },
    IndexDefinition {
        name: "EVI",
        description: "Enhanced Vegetation Index",
        bands: &["B8", "B4", "B2"],
        formula: evi::evi,
        vis: vis(-1.0, 1.0, palettes::VEGETATION),
    },
    IndexDefinition {
        name: "GNDVI",
        description: "Green Normalized Difference Vegetation Index",
        bands: &["B8", "B3"],
        formula: ndi::nd_pair,
        vis: vis(-1.0, 1.0, palettes::GREEN_NDVI),
    },
    IndexDefinition {
        name: "MCARI",
        description: "Modified Chlorophyll Absorption in Reflectance Index",
        bands: &["B5", "B4", "B3"],
        formula: pigment::mcari,
        vis: vis(0.0, 0.3, palettes::MCARI),
    },
    IndexDefinition {
        name: "MSI",
        description: "Moisture Stress Index",
        bands: &["B11", "B8"],
        formula: ratio::msi,
        vis: vis(0.0, 3.0, palettes::STRESS),
    },
    IndexDefinition {
        name: "NDMI",
        description: "Normalized Difference Moisture Index",
        bands: &["B8A", "B11"],
        formula: ndi::nd_pair,
        vis: vis(-0.8, 0.8, palettes::MOISTURE),
    },
    IndexDefinition {
        name: "NDWI",
        description: "Normalized Difference Water Index",
        bands: &["B3", "B8"],
        formula: ndi::nd_pair,
        vis: vis(-1.0, 1.0, palettes::WATER),
    },
    IndexDefinition {
        name: "NDMI_MoistureStress",
        description: "Normalized Difference Moisture Index (NIR/SWIR moisture stress)",
        bands: &["B8", "B11"],
        formula: ndi::nd_pair,
        vis: vis(-1.0, 1.0, palettes::DRY_WET),
    },
    IndexDefinition {
        name: "NDCI",
        description: "Normalized Difference Chlorophyll Index",
        bands: &["B5", "B4"],
        formula: ndi::nd_pair,
        vis: vis(-0.2, 0.5, palettes::BLUE_TO_RED),
    },
    IndexDefinition {
        name: "PSSRb1",
        description: "Pigment Specific Simple Ratio (chlorophyll b)",
        bands: &["B8", "B4"],
        formula: ratio::pssrb1,
        vis: vis(0.0, 10.0, palettes::PSSR),
    },
    IndexDefinition {
        name: "SAVI",
        description: "Soil Adjusted Vegetation Index (L = 0.428)",
        bands: &["B8", "B4"],
        formula: savi::savi,
        vis: vis(-0.5, 1.0, palettes::TERRAIN),
    },
    IndexDefinition {
        name: "SIPI",
        description: "Structure Insensitive Pigment Index",
        bands: &["B8", "B1", "B4"],
        formula: ratio::sipi,
        vis: vis(0.0, 2.0, palettes::SIPI),
    },
];

/// Find an index by name. Exact matches win; otherwise names compare
/// ASCII case-insensitively.
pub fn lookup(name: &str) -> Result<&'static IndexDefinition> {
    REGISTRY
        .iter()
        .find(|def| def.name == name)
        .or_else(|| REGISTRY.iter().find(|def| def.name.eq_ignore_ascii_case(name)))
        .ok_or_else(|| Error::UnknownIndex(name.to_string()))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|def| def.name)
}

/// Default visualization of an index; never depends on the data.
pub fn resolve_vis(name: &str) -> Result<VisParams> {
    lookup(name).map(|def| def.vis.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_ignoring_case() {
        let names: Vec<String> = names().map(str::to_ascii_lowercase).collect();
        for (i, a) in names.iter().enumerate() {
            assert!(!names[i + 1..].contains(a), "duplicate index {a}");
        }
    }

    #[test]
    fn ranges_are_ordered() {
        for def in &REGISTRY {
            assert!(def.vis.min < def.vis.max, "{}", def.name);
            assert!(def.vis.palette.len() >= 2, "{}", def.name);
        }
    }
}
