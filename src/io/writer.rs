// src/io/writer.rs
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use gdal::raster::{Buffer, RasterCreationOptions};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager, DriverType, Metadata};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::PipelineOutput;
use crate::processing::indices::VisParams;
use crate::raster::{GeoTransform, IndexRaster};
use crate::render::{colorize, composite_rgb};
use crate::utils::fixed_point::to_fixed_point;

pub const NODATA_VALUE_INT: i16 = -10000;
pub const NODATA_VALUE_FLOAT: f32 = -999.0;

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

/// Output encoding and GeoTIFF creation options.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WriteOptions {
    /// Store int16 scaled by `scale_factor` instead of float32.
    #[serde(default)]
    pub fixed_point: bool,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: i32,
    #[serde(default = "default_compress")]
    pub compress: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default = "default_true")]
    pub tiled: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            fixed_point: false,
            scale_factor: default_scale_factor(),
            compress: default_compress(),
            compress_level: default_compress_level(),
            tiled: default_true(),
        }
    }
}

impl WriteOptions {
    fn creation_options(&self) -> Result<RasterCreationOptions> {
        let mut options = Vec::new();
        let compress = self.compress.to_uppercase();

        // Add compression if not NONE
        if compress != "NONE" {
            options.push(format!("COMPRESS={compress}"));
            match compress.as_str() {
                "DEFLATE" => options.push(format!("ZLEVEL={}", self.compress_level.min(9))),
                "ZSTD" => options.push(format!("ZSTD_LEVEL={}", self.compress_level.min(22))),
                _ => {}
            }
        }

        if self.tiled {
            options.push("TILED=YES".to_string());
        }
        options.push("NUM_THREADS=ALL_CPUS".to_string());

        Ok(RasterCreationOptions::from_iter(options))
    }
}

fn create<T: gdal::raster::GdalType>(
    path: &Path,
    shape: (usize, usize),
    bands: usize,
    transform: &GeoTransform,
    options: &RasterCreationOptions,
) -> Result<Dataset> {
    let driver = DriverManager::get_output_driver_for_dataset_name(path, DriverType::Raster)
        .ok_or_else(|| Error::InvalidParameter {
            name: "output",
            value: path.display().to_string(),
            reason: "no GDAL raster driver for this extension".to_string(),
        })?;

    let mut dataset =
        driver.create_with_band_type_with_options::<T, _>(path, shape.0, shape.1, bands, options)?;
    let srs = SpatialRef::from_epsg(4326)?;
    dataset.set_projection(&srs.to_wkt()?)?;
    dataset.set_geo_transform(&transform.to_gdal())?;
    Ok(dataset)
}

/// Write a single-band index raster, recording its display range and ramp
/// as band metadata.
pub fn write_index_raster(
    path: &Path,
    raster: &IndexRaster,
    transform: &GeoTransform,
    name: &str,
    vis: &VisParams,
    options: &WriteOptions,
) -> Result<()> {
    let shape = raster.shape();
    let creation_options = options.creation_options()?;

    if options.fixed_point {
        if options.scale_factor <= 0 {
            return Err(Error::InvalidParameter {
                name: "scale_factor",
                value: options.scale_factor.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        let mut dataset = create::<i16>(path, shape, 1, transform, &creation_options)?;
        {
            let mut band = dataset.rasterband(1)?;
            band.set_no_data_value(Some(NODATA_VALUE_INT as f64))?;
            band.set_metadata_item("SCALE", &format!("{}", 1.0 / options.scale_factor as f64), "")?;
            band.set_metadata_item("OFFSET", "0", "")?;
            band.set_description(&format!("{} (scaled by {})", name, options.scale_factor))?;
            write_vis_metadata(&mut band, vis)?;

            let data = to_fixed_point(raster.data(), options.scale_factor, NODATA_VALUE_INT);
            let mut buffer = Buffer::new(shape, data);
            band.write((0, 0), shape, &mut buffer)?;
        }
        dataset.flush_cache()?;
    } else {
        let mut dataset = create::<f32>(path, shape, 1, transform, &creation_options)?;
        {
            let mut band = dataset.rasterband(1)?;
            band.set_no_data_value(Some(NODATA_VALUE_FLOAT as f64))?;
            band.set_description(name)?;
            write_vis_metadata(&mut band, vis)?;

            let data = raster
                .data()
                .iter()
                .map(|v| v.unwrap_or(NODATA_VALUE_FLOAT))
                .collect();
            let mut buffer = Buffer::new(shape, data);
            band.write((0, 0), shape, &mut buffer)?;
        }
        dataset.flush_cache()?;
    }

    log::info!("wrote {} ({}x{})", path.display(), shape.0, shape.1);
    Ok(())
}

fn write_vis_metadata(band: &mut gdal::raster::RasterBand, vis: &VisParams) -> Result<()> {
    band.set_metadata_item("VIS_MIN", &vis.min.to_string(), "")?;
    band.set_metadata_item("VIS_MAX", &vis.max.to_string(), "")?;
    band.set_metadata_item("VIS_PALETTE", &vis.palette.join(","), "")?;
    Ok(())
}

/// Write interleaved RGBA bytes as a 4-band byte raster.
pub fn write_rgba(
    path: &Path,
    rgba: &[u8],
    shape: (usize, usize),
    transform: &GeoTransform,
) -> Result<()> {
    let pixels = shape.0 * shape.1;
    if rgba.len() != pixels * 4 {
        return Err(Error::GridMismatch(format!(
            "{} RGBA bytes for a {}x{} raster",
            rgba.len(),
            shape.0,
            shape.1
        )));
    }

    let options = WriteOptions::default().creation_options()?;
    let mut dataset = create::<u8>(path, shape, 4, transform, &options)?;
    for channel in 0..4 {
        let plane: Vec<u8> = rgba.iter().skip(channel).step_by(4).copied().collect();
        let mut band = dataset.rasterband(channel + 1)?;
        let mut buffer = Buffer::new(shape, plane);
        band.write((0, 0), shape, &mut buffer)?;
    }
    dataset.flush_cache()?;
    Ok(())
}

/// Where the products of one request go.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub index: PathBuf,
    pub legend: Option<PathBuf>,
    pub preview: Option<PathBuf>,
    pub rgb: Option<PathBuf>,
}

/// Write the index raster plus whichever optional products were requested.
pub fn write_products(
    output: &PipelineOutput,
    paths: &OutputPaths,
    options: &WriteOptions,
) -> Result<()> {
    let transform = &output.composite.transform;
    write_index_raster(
        &paths.index,
        &output.index,
        transform,
        &output.index_name,
        &output.vis,
        options,
    )?;

    if let Some(path) = &paths.legend {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &output.legend)?;
        log::info!("wrote legend {}", path.display());
    }
    if let Some(path) = &paths.preview {
        let rgba = colorize(&output.index, &output.vis)?;
        write_rgba(path, &rgba, output.index.shape(), transform)?;
        log::info!("wrote preview {}", path.display());
    }
    if let Some(path) = &paths.rgb {
        let rgba = composite_rgb(&output.composite)?;
        write_rgba(path, &rgba, output.composite.shape(), transform)?;
        log::info!("wrote true-color composite {}", path.display());
    }
    Ok(())
}
