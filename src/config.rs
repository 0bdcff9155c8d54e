// src/config.rs
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::date_window::DEFAULT_WINDOW_MONTHS;
use crate::error::{Error, Result};
use crate::processing::legend::DEFAULT_LEGEND_WIDTH;

/// Order in which surviving scenes are offered to the mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeOrder {
    /// Stable sort by acquisition date, oldest first; ties keep list order.
    #[default]
    Acquisition,
    /// Exactly the order the imagery source returned.
    Input,
}

/// What to do with pixels whose formula divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingularityPolicy {
    /// Leave the pixel undefined.
    #[default]
    Undefined,
    /// Fail the evaluation with `DivisionSingularity`.
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scenes are kept only when their cloud percentage is strictly below this.
    pub cloud_threshold: f64,
    pub window_months: u32,
    pub legend_width: usize,
    pub merge_order: MergeOrder,
    pub singularity: SingularityPolicy,
    /// Rows per parallel tile.
    pub tile_rows: usize,
    /// Worker threads; defaults to the CPU count.
    pub workers: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cloud_threshold: 10.0,
            window_months: DEFAULT_WINDOW_MONTHS,
            legend_width: DEFAULT_LEGEND_WIDTH,
            merge_order: MergeOrder::default(),
            singularity: SingularityPolicy::default(),
            tile_rows: 64,
            workers: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.cloud_threshold) {
            return Err(Error::InvalidParameter {
                name: "cloud_threshold",
                value: self.cloud_threshold.to_string(),
                reason: "must be a percentage in [0, 100]".to_string(),
            });
        }
        if self.window_months == 0 {
            return Err(Error::InvalidParameter {
                name: "window_months",
                value: "0".to_string(),
                reason: "window must be at least one month wide".to_string(),
            });
        }
        if self.legend_width < 2 {
            return Err(Error::InvalidParameter {
                name: "legend_width",
                value: self.legend_width.to_string(),
                reason: "a gradient needs at least 2 columns".to_string(),
            });
        }
        if self.tile_rows == 0 {
            return Err(Error::InvalidParameter {
                name: "tile_rows",
                value: "0".to_string(),
                reason: "tiles need at least one row".to_string(),
            });
        }
        if self.workers == Some(0) {
            return Err(Error::InvalidParameter {
                name: "workers",
                value: "0".to_string(),
                reason: "at least one worker is required".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"merge_order": "input", "cloud_threshold": 20}"#).unwrap();
        assert_eq!(config.merge_order, MergeOrder::Input);
        assert_eq!(config.cloud_threshold, 20.0);
        assert_eq!(config.legend_width, 300);
        assert_eq!(config.window_months, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_legend() {
        let config = PipelineConfig {
            legend_width: 1,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
