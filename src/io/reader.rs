// src/io/reader.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use gdal::Dataset;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aoi::Aoi;
use crate::date_window::DateWindow;
use crate::error::{Error, Result};
use crate::raster::{Band, GeoTransform, MultispectralImage, Raster};
use crate::source::ImagerySource;

fn default_reflectance_scale() -> f32 {
    10000.0
}

/// JSON scene catalog: one single-band GeoTIFF per band and scene.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Catalog {
    /// Divisor from stored digital numbers to reflectance.
    #[serde(default = "default_reflectance_scale")]
    pub reflectance_scale: f32,
    pub scenes: Vec<SceneEntry>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SceneEntry {
    pub id: String,
    pub acquired: NaiveDate,
    pub cloud_percentage: f64,
    /// Band name to file path, relative to the catalog file.
    pub bands: BTreeMap<String, PathBuf>,
}

/// Imagery source backed by a catalog of GeoTIFF band files.
pub struct CatalogSource {
    root: PathBuf,
    catalog: Catalog,
}

impl CatalogSource {
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&text)?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        log::info!(
            "catalog {} lists {} scenes",
            path.display(),
            catalog.scenes.len()
        );
        Ok(Self { root, catalog })
    }

    pub fn from_catalog(root: impl Into<PathBuf>, catalog: Catalog) -> Self {
        Self {
            root: root.into(),
            catalog,
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn footprint(&self, scene: &SceneEntry) -> Result<[f64; 4]> {
        let (_, path) = scene.bands.iter().next().ok_or_else(|| Error::MissingBand {
            band: "any".to_string(),
            image: format!("catalog scene {}", scene.id),
        })?;
        let path = self.resolve(path);
        let dataset = Dataset::open(&path)?;
        check_geographic(&dataset, &path)?;
        let transform = GeoTransform::from_gdal(dataset.geo_transform()?)?;
        let (width, height) = dataset.raster_size();
        Ok(transform.bounds(width, height))
    }

    fn load(&self, scene: &SceneEntry) -> Result<MultispectralImage> {
        let bands = scene
            .bands
            .par_iter()
            .map(|(name, path)| {
                let (transform, band) = read_band(&self.resolve(path))?;
                Ok((name.clone(), transform, band))
            })
            .collect::<Result<Vec<_>>>()?;

        let (_, transform, first) = bands.first().ok_or_else(|| Error::MissingBand {
            band: "any".to_string(),
            image: format!("catalog scene {}", scene.id),
        })?;
        let mut image = MultispectralImage::new(
            scene.id.clone(),
            scene.acquired,
            scene.cloud_percentage,
            *transform,
            first.shape(),
        )
        .with_reflectance_scale(self.catalog.reflectance_scale);

        let base = *transform;
        for (name, transform, band) in bands {
            if transform != base {
                return Err(Error::GridMismatch(format!(
                    "scene {}: band {name} is georeferenced differently",
                    scene.id
                )));
            }
            image.insert_band(name, band)?;
        }
        Ok(image)
    }
}

impl ImagerySource for CatalogSource {
    fn query(&self, aoi: &Aoi, window: &DateWindow) -> Result<Vec<MultispectralImage>> {
        let mut images = Vec::new();
        for scene in &self.catalog.scenes {
            if !window.contains(scene.acquired) {
                continue;
            }
            if !aoi.intersects_rect(self.footprint(scene)?) {
                log::debug!("{}: footprint misses the AOI", scene.id);
                continue;
            }
            log::debug!("loading scene {}", scene.id);
            images.push(self.load(scene)?);
        }
        Ok(images)
    }
}

/// AOIs are longitude/latitude, so a projected raster would be clipped
/// against the wrong coordinates. Files without an SRS are taken as-is.
fn check_geographic(dataset: &Dataset, path: &Path) -> Result<()> {
    let Ok(srs) = dataset.spatial_ref() else {
        return Ok(());
    };
    if srs.is_geographic() {
        return Ok(());
    }
    let crs = match (srs.auth_name(), srs.auth_code()) {
        (Ok(name), Ok(code)) => format!("{name}:{code}"),
        _ => "without an authority code".to_string(),
    };
    Err(Error::UnsupportedCrs {
        path: path.display().to_string(),
        crs,
    })
}

/// Read band 1 of a raster file. Nodata and NaN become undefined pixels.
pub fn read_band(path: &Path) -> Result<(GeoTransform, Band)> {
    let dataset = Dataset::open(path)?;
    check_geographic(&dataset, path)?;
    let transform = GeoTransform::from_gdal(dataset.geo_transform()?)?;
    let band = dataset.rasterband(1)?;
    let (width, height) = band.size();
    let nodata = band.no_data_value();

    let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;
    let values = buffer
        .data()
        .iter()
        .map(|&v| match nodata {
            _ if v.is_nan() => None,
            Some(nd) if v as f64 == nd => None,
            _ => Some(v),
        })
        .collect();

    Ok((transform, Raster::new((width, height), values)?))
}
