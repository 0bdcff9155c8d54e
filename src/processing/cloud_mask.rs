// src/processing/cloud_mask.rs
use crate::error::Result;
use crate::raster::{Mask, MultispectralImage, Raster, QA_BAND};

/// QA60 bit 10: opaque clouds.
pub const OPAQUE_CLOUD_BIT: u16 = 1 << 10;
/// QA60 bit 11: cirrus clouds.
pub const CIRRUS_BIT: u16 = 1 << 11;

const CLOUD_BITS: u16 = OPAQUE_CLOUD_BIT | CIRRUS_BIT;

/// True when a QA60 value flags neither opaque nor cirrus cloud.
///
/// Undefined or non-integral QA values count as contaminated.
pub fn is_clear(qa: Option<f32>) -> bool {
    match qa {
        Some(v) if v.is_finite() && v >= 0.0 && v <= u16::MAX as f32 && v.fract() == 0.0 => {
            (v as u16) & CLOUD_BITS == 0
        }
        _ => false,
    }
}

/// Per-pixel clear-sky mask from the image's QA60 band.
///
/// Fails with `MissingBand` when the image has no QA60 band.
pub fn cloud_mask(image: &MultispectralImage) -> Result<Mask> {
    let qa = image.band(QA_BAND)?;
    Raster::new(qa.shape(), qa.data().iter().map(|&v| is_clear(v)).collect())
}

/// Undefine every band of `image` where `mask` is false.
pub fn apply_mask(image: &mut MultispectralImage, mask: &Mask) {
    for (_, band) in image.bands_mut() {
        for (value, &clear) in band.data_mut().iter_mut().zip(mask.data()) {
            if !clear {
                *value = None;
            }
        }
    }
}

/// Mask clouds in place. Applying it again changes nothing.
pub fn mask_clouds(mut image: MultispectralImage) -> Result<MultispectralImage> {
    let mask = cloud_mask(&image)?;
    apply_mask(&mut image, &mask);
    Ok(image)
}
