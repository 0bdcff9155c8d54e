// src/processing/composite.rs
use std::collections::BTreeSet;

use itertools::Itertools;
use rayon::prelude::*;

use crate::aoi::Aoi;
use crate::config::{MergeOrder, PipelineConfig};
use crate::date_window::DateWindow;
use crate::error::{Error, Result};
use crate::processing::cloud_mask::mask_clouds;
use crate::processing::parallel::TiledProcessor;
use crate::raster::{Band, Composite, MultispectralImage, Raster, QA_BAND};

/// Builds one cloud-free scene from the candidates covering an AOI.
pub struct Compositor {
    cloud_threshold: f64,
    merge_order: MergeOrder,
    processor: TiledProcessor,
}

impl Compositor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            cloud_threshold: config.cloud_threshold,
            merge_order: config.merge_order,
            processor: TiledProcessor::new(config.workers, config.tile_rows),
        }
    }

    pub fn with_processor(mut self, processor: TiledProcessor) -> Self {
        self.processor = processor;
        self
    }

    /// Filter, mask, mosaic (first valid pixel wins) and clip to the AOI.
    ///
    /// With the default `MergeOrder::Acquisition` the oldest valid pixel wins,
    /// not the first one listed; set `merge_order = "input"` to mosaic in the
    /// order the candidates were given.
    pub fn composite(
        &self,
        aoi: &Aoi,
        window: &DateWindow,
        candidates: Vec<MultispectralImage>,
    ) -> Result<Composite> {
        let considered = candidates.len();
        let mut selected = self.select(aoi, window, candidates);
        if selected.is_empty() {
            return Err(Error::NoImagery { considered });
        }

        if self.merge_order == MergeOrder::Acquisition {
            selected.sort_by_key(|image| image.acquired);
        }

        let prepared = selected
            .into_par_iter()
            .map(prepare)
            .collect::<Vec<Result<Option<MultispectralImage>>>>();
        let images = prepared
            .into_iter()
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>>>()?;
        if images.is_empty() {
            return Err(Error::NoImagery { considered });
        }
        // Only scenes that survived QA masking have to share a grid.
        check_grids(&images)?;

        log::info!(
            "compositing {} of {} candidate scenes: {}",
            images.len(),
            considered,
            images.iter().map(|i| &i.id).join(", ")
        );

        let shape = images[0].shape();
        let transform = images[0].transform;
        let inside = self.processor.map_tiles(shape, |tile| {
            tile.map(|i| {
                let (lon, lat) = transform.pixel_center(i % shape.0, i / shape.0);
                aoi.contains(lon, lat)
            })
            .collect()
        });

        let band_names: BTreeSet<&str> = images
            .iter()
            .flat_map(|image| image.bands().map(|(name, _)| name))
            .filter(|&name| name != QA_BAND)
            .collect();

        let mut composite = Composite::new(transform, shape);
        for name in band_names {
            let layers: Vec<&Band> = images.iter().filter_map(|i| i.band(name).ok()).collect();
            let merged = self.processor.map_tiles(shape, |tile| {
                tile.map(|i| {
                    if !inside[i] {
                        return None;
                    }
                    layers.iter().find_map(|layer| layer.data()[i])
                })
                .collect()
            });
            composite = composite.with_band(name, Raster::new(shape, merged)?)?;
        }

        Ok(composite)
    }

    fn select(
        &self,
        aoi: &Aoi,
        window: &DateWindow,
        candidates: Vec<MultispectralImage>,
    ) -> Vec<MultispectralImage> {
        candidates
            .into_iter()
            .filter(|image| {
                if !window.contains(image.acquired) {
                    log::debug!("{}: acquired {} outside window", image.id, image.acquired);
                    return false;
                }
                if !(image.cloud_percentage < self.cloud_threshold) {
                    log::debug!(
                        "{}: cloud cover {}% not below {}%",
                        image.id,
                        image.cloud_percentage,
                        self.cloud_threshold
                    );
                    return false;
                }
                if !aoi.intersects_rect(image.bounds()) {
                    log::debug!("{}: footprint misses the AOI", image.id);
                    return false;
                }
                true
            })
            .collect()
    }
}

fn check_grids(images: &[MultispectralImage]) -> Result<()> {
    let first = &images[0];
    for image in &images[1..] {
        if image.shape() != first.shape() || image.transform != first.transform {
            return Err(Error::GridMismatch(format!(
                "{} is {:?} at {:?}, {} is {:?} at {:?}",
                image.id,
                image.shape(),
                image.transform,
                first.id,
                first.shape(),
                first.transform
            )));
        }
    }
    Ok(())
}

/// Cloud-mask and rescale one scene. Scenes without a QA band are dropped.
fn prepare(image: MultispectralImage) -> Result<Option<MultispectralImage>> {
    let id = image.id.clone();
    let mut image = match mask_clouds(image) {
        Ok(image) => image,
        Err(Error::MissingBand { band, .. }) => {
            log::warn!("{id}: no {band} band, excluded from the composite");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let scale = image.reflectance_scale;
    if !(scale.is_finite() && scale > 0.0) {
        return Err(Error::InvalidParameter {
            name: "reflectance_scale",
            value: scale.to_string(),
            reason: format!("scene {id} needs a positive scale"),
        });
    }
    if scale != 1.0 {
        for (name, band) in image.bands_mut() {
            if name == QA_BAND {
                continue;
            }
            for value in band.data_mut().iter_mut().flatten() {
                *value /= scale;
            }
        }
    }
    image.reflectance_scale = 1.0;

    Ok(Some(image))
}
