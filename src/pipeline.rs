// src/pipeline.rs
//! Request orchestration: validate, query, composite, evaluate, visualize,
//! build the legend.
//!
//! Cancellation is cooperative and checked before every stage. A request
//! either returns a complete [`PipelineOutput`] or a [`PipelineError`]; no
//! intermediate product escapes.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde::Serialize;

use crate::aoi::Aoi;
use crate::config::PipelineConfig;
use crate::date_window::DateWindow;
use crate::error::{Error, PipelineError, RequestContext, Result, Stage};
use crate::processing::indices::{lookup, resolve_vis, VisParams};
use crate::processing::legend::{build_legend, LegendSpec};
use crate::processing::{Compositor, Evaluator};
use crate::raster::{Composite, IndexRaster};
use crate::source::ImagerySource;

/// Shared flag a caller flips to abort a running request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self, stage: Stage) -> Result<()> {
        if self.is_cancelled() {
            log::info!("request cancelled before {stage}");
            Err(Error::Cancelled { stage })
        } else {
            Ok(())
        }
    }
}

/// Raw request as received from the host: AOI rings, date string, index name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRequest {
    pub exterior: Vec<(f64, f64)>,
    pub holes: Vec<Vec<(f64, f64)>>,
    pub date: String,
    pub index: String,
}

impl PipelineRequest {
    pub fn new(exterior: Vec<(f64, f64)>, date: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
            date: date.into(),
            index: index.into(),
        }
    }

    pub fn from_aoi(aoi: &Aoi, date: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            exterior: aoi.exterior().to_vec(),
            holes: aoi.holes().to_vec(),
            date: date.into(),
            index: index.into(),
        }
    }
}

/// Everything a renderer needs for one request.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub aoi: Aoi,
    pub window: DateWindow,
    pub composite: Composite,
    pub index_name: String,
    pub index: IndexRaster,
    pub vis: VisParams,
    pub legend: LegendSpec,
}

pub struct Pipeline {
    config: PipelineConfig,
    compositor: Compositor,
    evaluator: Evaluator,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_valid(PipelineConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: PipelineConfig) -> Self {
        Self {
            compositor: Compositor::new(&config),
            evaluator: Evaluator::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(
        &self,
        request: &PipelineRequest,
        source: &dyn ImagerySource,
        cancel: &CancelToken,
    ) -> std::result::Result<PipelineOutput, PipelineError> {
        let mut context = RequestContext {
            aoi_bounds: None,
            date: request.date.clone(),
            index: request.index.clone(),
        };

        let aoi = cancel
            .check(Stage::Validate)
            .and_then(|_| Aoi::new(request.exterior.clone(), request.holes.clone()))
            .map_err(|e| PipelineError::new(context.clone(), e))?;
        context.aoi_bounds = Some(aoi.bounds());

        self.run_stages(aoi, request, source, cancel)
            .map_err(|e| PipelineError::new(context, e))
    }

    fn run_stages(
        &self,
        aoi: Aoi,
        request: &PipelineRequest,
        source: &dyn ImagerySource,
        cancel: &CancelToken,
    ) -> Result<PipelineOutput> {
        let window = DateWindow::around(&request.date, self.config.window_months)?;
        let definition = lookup(&request.index)?;
        log::debug!(
            "request {} over {:?}, window {}..{}",
            definition.name,
            aoi.bounds(),
            window.start(),
            window.end()
        );

        cancel.check(Stage::Query)?;
        let candidates = source.query(&aoi, &window)?;
        log::info!("imagery source returned {} candidate scenes", candidates.len());

        cancel.check(Stage::Composite)?;
        let composite = self.compositor.composite(&aoi, &window, candidates)?;

        cancel.check(Stage::Evaluate)?;
        let index = self.evaluator.evaluate_with(definition, &composite)?;
        log::info!(
            "{}: {} of {} pixels defined",
            definition.name,
            index.valid_count(),
            index.data().len()
        );

        cancel.check(Stage::Visualize)?;
        let vis = resolve_vis(definition.name)?;

        cancel.check(Stage::Legend)?;
        let legend = build_legend(definition.name, &vis, self.config.legend_width)?;

        Ok(PipelineOutput {
            aoi,
            window,
            composite,
            index_name: definition.name.to_string(),
            index,
            vis,
            legend,
        })
    }
}
