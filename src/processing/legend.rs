// src/processing/legend.rs
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::processing::indices::VisParams;

pub const DEFAULT_LEGEND_WIDTH: usize = 300;

/// A 1-row gradient raster plus the labels that go with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSpec {
    pub title: String,
    /// `width` values running linearly from `min` to `max`.
    pub gradient: Vec<f64>,
    pub palette: Vec<String>,
    pub min: f64,
    pub max: f64,
    pub min_label: String,
    pub max_label: String,
}

impl LegendSpec {
    /// Gradient raster shape as `(width, height)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.gradient.len(), 1)
    }

    pub fn vis(&self) -> VisParams {
        VisParams {
            min: self.min,
            max: self.max,
            palette: self.palette.clone(),
        }
    }
}

/// Column `i` holds `min + (max - min) * i / (width - 1)`.
pub fn build_legend(title: &str, vis: &VisParams, width: usize) -> Result<LegendSpec> {
    if width < 2 {
        return Err(Error::InvalidParameter {
            name: "legend_width",
            value: width.to_string(),
            reason: "a gradient needs at least 2 columns".to_string(),
        });
    }
    if !(vis.min.is_finite() && vis.max.is_finite() && vis.min < vis.max) {
        return Err(Error::InvalidParameter {
            name: "vis range",
            value: format!("[{}, {}]", vis.min, vis.max),
            reason: "bounds must be finite with min < max".to_string(),
        });
    }

    let (min, max) = (vis.min, vis.max);
    let last = width - 1;
    let gradient = (0..width)
        .into_par_iter()
        .map(|i| {
            if i == last {
                max
            } else {
                min + (max - min) * i as f64 / last as f64
            }
        })
        .collect();

    Ok(LegendSpec {
        title: title.to_string(),
        gradient,
        palette: vis.palette.clone(),
        min,
        max,
        min_label: min.to_string(),
        max_label: max.to_string(),
    })
}
