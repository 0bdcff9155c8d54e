// tests/common/mod.rs
#![allow(dead_code)]

use chrono::NaiveDate;
use sentinel_index::raster::{Band, GeoTransform, MultispectralImage, QA_BAND};
use sentinel_index::Aoi;

/// 20x20 grid of 0.001 degree pixels around (11.0, 46.0).
pub const SHAPE: (usize, usize) = (20, 20);

pub fn grid() -> GeoTransform {
    GeoTransform::new(10.99, 46.01, 0.001, -0.001)
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 1 km square centred on the grid.
pub fn square_aoi() -> Aoi {
    Aoi::square(11.0, 46.0, 1000.0).unwrap()
}

/// Polygon strictly larger than the grid, so no pixel is clipped.
pub fn covering_aoi() -> Aoi {
    Aoi::new(
        vec![(10.98, 45.98), (11.02, 45.98), (11.02, 46.02), (10.98, 46.02)],
        Vec::new(),
    )
    .unwrap()
}

pub fn constant(value: f32) -> Band {
    Band::from_values(SHAPE, vec![value; SHAPE.0 * SHAPE.1]).unwrap()
}

/// Image with the given constant bands and a uniform QA60 value.
pub fn image(id: &str, acquired: &str, cloud: f64, qa: f32, bands: &[(&str, f32)]) -> MultispectralImage {
    let mut image = MultispectralImage::new(id, date(acquired), cloud, grid(), SHAPE)
        .with_band(QA_BAND, constant(qa))
        .unwrap();
    for &(name, value) in bands {
        image.insert_band(name, constant(value)).unwrap();
    }
    image
}

/// Image stored as digital numbers scaled by 10000.
pub fn scaled_image(id: &str, acquired: &str, cloud: f64, qa: f32, bands: &[(&str, f32)]) -> MultispectralImage {
    image(id, acquired, cloud, qa, bands).with_reflectance_scale(10000.0)
}
