// src/error.rs
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Pipeline stage, used to report where a request was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Validate,
    Query,
    Composite,
    Evaluate,
    Visualize,
    Legend,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Query => "query",
            Stage::Composite => "composite",
            Stage::Evaluate => "evaluate",
            Stage::Visualize => "visualize",
            Stage::Legend => "legend",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid area of interest: {0}")]
    InvalidAoi(String),

    #[error("invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("no imagery passed the spatial, temporal and cloud filters ({considered} candidates considered)")]
    NoImagery { considered: usize },

    #[error("band {band} missing from {image}")]
    MissingBand { band: String, image: String },

    #[error("unknown index '{0}'")]
    UnknownIndex(String),

    #[error("{index}: {pixels} pixels with a zero denominator")]
    DivisionSingularity { index: String, pixels: usize },

    #[error("raster grid mismatch: {0}")]
    GridMismatch(String),

    #[error("{path}: unsupported coordinate system {crs} (expected geographic longitude/latitude)")]
    UnsupportedCrs { path: String, crs: String },

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("request cancelled before the {stage} stage")]
    Cancelled { stage: Stage },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Gdal(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// What a failed request was asking for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestContext {
    /// AOI bounds as `[west, south, east, north]`, if the AOI was valid.
    pub aoi_bounds: Option<[f64; 4]>,
    pub date: String,
    pub index: String,
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index {}, date {}", self.index, self.date)?;
        match self.aoi_bounds {
            Some([w, s, e, n]) => write!(f, ", aoi [{w}, {s}, {e}, {n}]"),
            None => write!(f, ", aoi invalid"),
        }
    }
}

/// A pipeline failure with the request it belongs to.
#[derive(Error, Debug)]
#[error("{error} ({context})")]
pub struct PipelineError {
    pub context: RequestContext,
    #[source]
    pub error: Error,
}

impl PipelineError {
    pub fn new(context: RequestContext, error: Error) -> Self {
        Self { context, error }
    }
}
