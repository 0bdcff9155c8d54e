// src/processing/evaluate.rs
use crate::config::{PipelineConfig, SingularityPolicy};
use crate::error::{Error, Result};
use crate::processing::indices::{lookup, IndexCalculator};
use crate::processing::parallel::TiledProcessor;
use crate::raster::{Composite, IndexRaster, Raster};

#[derive(Clone, Copy)]
enum Pixel {
    Value(f32),
    /// At least one input band undefined.
    Masked,
    /// Formula divided by zero or produced a non-finite value.
    Singular,
}

/// Applies index formulas to a composite, tile by tile.
pub struct Evaluator {
    processor: TiledProcessor,
    singularity: SingularityPolicy,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl Evaluator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            processor: TiledProcessor::new(config.workers, config.tile_rows),
            singularity: config.singularity,
        }
    }

    pub fn with_processor(mut self, processor: TiledProcessor) -> Self {
        self.processor = processor;
        self
    }

    /// Evaluate a registered index by name.
    pub fn evaluate(&self, index: &str, composite: &Composite) -> Result<IndexRaster> {
        let definition = lookup(index)?;
        self.evaluate_with(definition, composite)
    }

    /// Evaluate any calculator. Undefined inputs give undefined outputs.
    pub fn evaluate_with<I: IndexCalculator + ?Sized>(
        &self,
        calculator: &I,
        composite: &Composite,
    ) -> Result<IndexRaster> {
        let inputs = calculator
            .required_bands()
            .iter()
            .map(|name| composite.band(name).map(|band| band.data()))
            .collect::<Result<Vec<_>>>()?;

        let shape = composite.shape();
        let pixels = self.processor.map_tiles(shape, |tile| {
            let mut values = vec![0.0f32; inputs.len()];
            tile.map(|i| {
                for (slot, band) in values.iter_mut().zip(&inputs) {
                    match band[i] {
                        Some(v) => *slot = v,
                        None => return Pixel::Masked,
                    }
                }
                match calculator.compute(&values) {
                    Some(v) if v.is_finite() => Pixel::Value(v),
                    _ => Pixel::Singular,
                }
            })
            .collect()
        });

        let singular = pixels
            .iter()
            .filter(|p| matches!(p, Pixel::Singular))
            .count();
        if singular > 0 {
            log::debug!("{}: {singular} singular pixels", calculator.name());
            if self.singularity == SingularityPolicy::Error {
                return Err(Error::DivisionSingularity {
                    index: calculator.name().to_string(),
                    pixels: singular,
                });
            }
        }

        let values = pixels
            .into_iter()
            .map(|p| match p {
                Pixel::Value(v) => Some(v),
                Pixel::Masked | Pixel::Singular => None,
            })
            .collect();
        Raster::new(shape, values)
    }
}

/// Evaluate a registered index with default settings.
pub fn evaluate(index: &str, composite: &Composite) -> Result<IndexRaster> {
    Evaluator::default().evaluate(index, composite)
}
