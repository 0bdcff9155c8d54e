// src/raster.rs
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the Sentinel-2 quality band carrying the cloud bits.
pub const QA_BAND: &str = "QA60";

/// North-up affine transform in GDAL coefficient order.
///
/// `x = origin_x + col * pixel_width`, `y = origin_y + row * pixel_height`,
/// with `pixel_height` negative for north-up rasters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Build from `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    ///
    /// Rotated grids are rejected.
    pub fn from_gdal(coeffs: [f64; 6]) -> Result<Self> {
        if coeffs[2] != 0.0 || coeffs[4] != 0.0 {
            return Err(Error::GridMismatch(format!(
                "rotated geotransform {coeffs:?} is not supported"
            )));
        }
        Ok(Self::new(coeffs[0], coeffs[3], coeffs[1], coeffs[5]))
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            0.0,
            self.origin_y,
            0.0,
            self.pixel_height,
        ]
    }

    /// Geographic coordinates of the pixel center.
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y + (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Footprint of a `width x height` grid as `[west, south, east, north]`.
    pub fn bounds(&self, width: usize, height: usize) -> [f64; 4] {
        let x1 = self.origin_x + width as f64 * self.pixel_width;
        let y1 = self.origin_y + height as f64 * self.pixel_height;
        [
            self.origin_x.min(x1),
            self.origin_y.min(y1),
            self.origin_x.max(x1),
            self.origin_y.max(y1),
        ]
    }
}

/// Row-major 2-D buffer, shaped `(width, height)` like a GDAL buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    shape: (usize, usize),
    data: Vec<T>,
}

impl<T> Raster<T> {
    pub fn new(shape: (usize, usize), data: Vec<T>) -> Result<Self> {
        if data.len() != shape.0 * shape.1 {
            return Err(Error::GridMismatch(format!(
                "{} values do not fill a {}x{} raster",
                data.len(),
                shape.0,
                shape.1
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn width(&self) -> usize {
        self.shape.0
    }

    pub fn height(&self) -> usize {
        self.shape.1
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&T> {
        if col >= self.shape.0 || row >= self.shape.1 {
            return None;
        }
        self.data.get(row * self.shape.0 + col)
    }
}

impl<T: Clone> Raster<T> {
    pub fn filled(shape: (usize, usize), value: T) -> Self {
        Self {
            shape,
            data: vec![value; shape.0 * shape.1],
        }
    }
}

/// A reflectance (or quality) band; `None` marks an undefined pixel.
pub type Band = Raster<Option<f32>>;

/// Per-pixel validity, `true` = clear.
pub type Mask = Raster<bool>;

/// Single-band output of the index evaluator.
pub type IndexRaster = Raster<Option<f32>>;

impl Band {
    /// Band of defined values.
    pub fn from_values(shape: (usize, usize), values: Vec<f32>) -> Result<Self> {
        Raster::new(shape, values.into_iter().map(Some).collect())
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_some()).count()
    }
}

/// One acquisition as delivered by an imagery source.
#[derive(Debug, Clone)]
pub struct MultispectralImage {
    pub id: String,
    pub acquired: NaiveDate,
    /// Scene-level cloud cover in percent.
    pub cloud_percentage: f64,
    /// Divisor mapping stored digital numbers to reflectance in [0, 1].
    pub reflectance_scale: f32,
    pub transform: GeoTransform,
    shape: (usize, usize),
    bands: BTreeMap<String, Band>,
}

impl MultispectralImage {
    pub fn new(
        id: impl Into<String>,
        acquired: NaiveDate,
        cloud_percentage: f64,
        transform: GeoTransform,
        shape: (usize, usize),
    ) -> Self {
        Self {
            id: id.into(),
            acquired,
            cloud_percentage,
            reflectance_scale: 1.0,
            transform,
            shape,
            bands: BTreeMap::new(),
        }
    }

    pub fn with_reflectance_scale(mut self, scale: f32) -> Self {
        self.reflectance_scale = scale;
        self
    }

    /// Add a band; its shape must match the image.
    pub fn with_band(mut self, name: impl Into<String>, band: Band) -> Result<Self> {
        self.insert_band(name, band)?;
        Ok(self)
    }

    pub fn insert_band(&mut self, name: impl Into<String>, band: Band) -> Result<()> {
        let name = name.into();
        if band.shape() != self.shape {
            return Err(Error::GridMismatch(format!(
                "band {name} is {:?}, image {} is {:?}",
                band.shape(),
                self.id,
                self.shape
            )));
        }
        self.bands.insert(name, band);
        Ok(())
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn band(&self, name: &str) -> Result<&Band> {
        self.bands.get(name).ok_or_else(|| Error::MissingBand {
            band: name.to_string(),
            image: format!("image {}", self.id),
        })
    }

    pub fn bands(&self) -> impl Iterator<Item = (&str, &Band)> {
        self.bands.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn bands_mut(&mut self) -> impl Iterator<Item = (&str, &mut Band)> {
        self.bands.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn bounds(&self) -> [f64; 4] {
        self.transform.bounds(self.shape.0, self.shape.1)
    }
}

/// Blended, AOI-clipped scene. Carries no acquisition date.
#[derive(Debug, Clone)]
pub struct Composite {
    pub transform: GeoTransform,
    shape: (usize, usize),
    bands: BTreeMap<String, Band>,
}

impl Composite {
    pub fn new(transform: GeoTransform, shape: (usize, usize)) -> Self {
        Self {
            transform,
            shape,
            bands: BTreeMap::new(),
        }
    }

    pub fn with_band(mut self, name: impl Into<String>, band: Band) -> Result<Self> {
        let name = name.into();
        if band.shape() != self.shape {
            return Err(Error::GridMismatch(format!(
                "band {name} is {:?}, composite is {:?}",
                band.shape(),
                self.shape
            )));
        }
        self.bands.insert(name, band);
        Ok(self)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn band(&self, name: &str) -> Result<&Band> {
        self.bands.get(name).ok_or_else(|| Error::MissingBand {
            band: name.to_string(),
            image: "composite".to_string(),
        })
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }
}
