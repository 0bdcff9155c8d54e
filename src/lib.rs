// src/lib.rs
pub mod aoi;
pub mod batch;
pub mod cli;
pub mod config;
pub mod date_window;
pub mod error;
#[cfg(feature = "gdal")]
pub mod io;
pub mod pipeline;
pub mod processing;
pub mod raster;
pub mod render;
pub mod source;
pub mod utils;

pub use aoi::Aoi;
pub use config::PipelineConfig;
pub use date_window::DateWindow;
pub use error::{Error, PipelineError, Result};
pub use pipeline::{CancelToken, Pipeline, PipelineOutput, PipelineRequest};
pub use source::{ImagerySource, MemorySource};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
