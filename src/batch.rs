// src/batch.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aoi::Aoi;
use crate::config::PipelineConfig;
use crate::pipeline::PipelineRequest;

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub operations: Vec<Operation>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GlobalParams {
    #[serde(default = "default_compress")]
    pub compress: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default)]
    pub fixed_point: bool,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: i32,
    #[serde(default = "default_true")]
    pub tiled: bool,
    /// Scene catalog used by operations that don't name their own.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            compress: default_compress(),
            compress_level: default_compress_level(),
            fixed_point: false,
            scale_factor: default_scale_factor(),
            tiled: default_true(),
            catalog: None,
            pipeline: PipelineConfig::default(),
        }
    }
}

fn default_compress() -> String {
    "DEFLATE".to_string()
}

fn default_compress_level() -> u8 {
    6
}

fn default_scale_factor() -> i32 {
    10000
}

fn default_true() -> bool {
    true
}

/// AOI of one operation: a square around a point, explicit rings, or GeoJSON.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum AoiSpec {
    Square {
        lon: f64,
        lat: f64,
        side_m: f64,
    },
    Rings {
        exterior: Vec<(f64, f64)>,
        #[serde(default)]
        holes: Vec<Vec<(f64, f64)>>,
    },
    GeoJson(serde_json::Value),
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Operation {
    pub index: String,
    pub date: String,
    pub aoi: AoiSpec,
    pub output: PathBuf,
    pub legend: Option<PathBuf>,
    pub preview: Option<PathBuf>,
    pub rgb: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub fixed_point: Option<bool>,
    pub scale_factor: Option<i32>,
    pub compress: Option<String>,
    pub compress_level: Option<u8>,
    pub tiled: Option<bool>,
}

impl Operation {
    /// Build the pipeline request. Ring AOIs are validated by the pipeline
    /// itself so the failure carries the request context.
    pub fn request(&self) -> crate::error::Result<PipelineRequest> {
        match &self.aoi {
            AoiSpec::Square { lon, lat, side_m } => {
                let aoi = Aoi::square(*lon, *lat, *side_m)?;
                Ok(PipelineRequest::from_aoi(&aoi, &self.date, &self.index))
            }
            AoiSpec::Rings { exterior, holes } => {
                let mut request = PipelineRequest::new(exterior.clone(), &self.date, &self.index);
                request.holes = holes.clone();
                Ok(request)
            }
            AoiSpec::GeoJson(value) => {
                let aoi = Aoi::from_geojson(&value.to_string())?;
                Ok(PipelineRequest::from_aoi(&aoi, &self.date, &self.index))
            }
        }
    }
}

pub fn load_batch(config_path: &Path) -> Result<BatchConfig> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("reading batch file {}", config_path.display()))?;
    let config: BatchConfig = serde_json::from_str(&config_content)
        .with_context(|| format!("parsing batch file {}", config_path.display()))?;
    config.global.pipeline.validate()?;
    Ok(config)
}

#[cfg(feature = "gdal")]
pub fn process_batch(config_path: &Path) -> Result<()> {
    use std::collections::BTreeMap;

    use crate::io::{write_products, CatalogSource, OutputPaths, WriteOptions};
    use crate::pipeline::{CancelToken, Pipeline};

    let config = load_batch(config_path)?;
    let pipeline = Pipeline::new(config.global.pipeline.clone())?;
    let cancel = CancelToken::new();
    let mut sources: BTreeMap<PathBuf, CatalogSource> = BTreeMap::new();

    log::info!(
        "Starting batch processing with {} operations...",
        config.operations.len()
    );

    for (i, op) in config.operations.iter().enumerate() {
        log::info!(
            "[{}/{}] {} {} -> {}",
            i + 1,
            config.operations.len(),
            op.index,
            op.date,
            op.output.display()
        );

        // Operation-specific overrides
        let options = WriteOptions {
            fixed_point: op.fixed_point.unwrap_or(config.global.fixed_point),
            scale_factor: op.scale_factor.unwrap_or(config.global.scale_factor),
            compress: op
                .compress
                .clone()
                .unwrap_or_else(|| config.global.compress.clone()),
            compress_level: op.compress_level.unwrap_or(config.global.compress_level),
            tiled: op.tiled.unwrap_or(config.global.tiled),
        };

        let catalog = op
            .catalog
            .as_ref()
            .or(config.global.catalog.as_ref())
            .with_context(|| format!("operation {}: no catalog given", i + 1))?;
        if !sources.contains_key(catalog) {
            sources.insert(catalog.clone(), CatalogSource::open(catalog)?);
        }
        let source = sources
            .get(catalog)
            .with_context(|| format!("catalog {} not loaded", catalog.display()))?;

        let request = op.request()?;
        let output = pipeline.run(&request, source, &cancel)?;

        let paths = OutputPaths {
            index: op.output.clone(),
            legend: op.legend.clone(),
            preview: op.preview.clone(),
            rgb: op.rgb.clone(),
        };
        write_products(&output, &paths, &options)
            .with_context(|| format!("writing {}", op.output.display()))?;
    }

    log::info!("Batch processing complete!");
    Ok(())
}
