// src/source/mod.rs
use crate::aoi::Aoi;
use crate::date_window::DateWindow;
use crate::error::Result;
use crate::raster::MultispectralImage;

/// Supplier of candidate scenes for a request.
///
/// Implementations filter by footprint and acquisition window; the
/// compositor re-applies both filters, so a coarse pre-filter is enough.
/// Queries must be idempotent.
pub trait ImagerySource: Send + Sync {
    fn query(&self, aoi: &Aoi, window: &DateWindow) -> Result<Vec<MultispectralImage>>;
}

/// Scenes already held in memory, returned in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    images: Vec<MultispectralImage>,
}

impl MemorySource {
    pub fn new(images: Vec<MultispectralImage>) -> Self {
        Self { images }
    }

    pub fn push(&mut self, image: MultispectralImage) {
        self.images.push(image);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImagerySource for MemorySource {
    fn query(&self, aoi: &Aoi, window: &DateWindow) -> Result<Vec<MultispectralImage>> {
        let hits: Vec<_> = self
            .images
            .iter()
            .filter(|image| window.contains(image.acquired) && aoi.intersects_rect(image.bounds()))
            .cloned()
            .collect();
        log::debug!(
            "memory source: {} of {} scenes match {}..{}",
            hits.len(),
            self.images.len(),
            window.start(),
            window.end()
        );
        Ok(hits)
    }
}
