use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sentinel-index")]
#[command(about = "Cloud-masked Sentinel-2 composites and spectral index maps", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output file path
    #[arg(short, long, default_value = "output.tif", global = true)]
    pub output: PathBuf,

    /// Use int16 fixed-point output instead of float32
    #[arg(long, global = true)]
    pub fixed_point: bool,

    /// Scaling factor for fixed-point
    #[arg(long, default_value = "10000", global = true)]
    pub scale_factor: i32,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Composite the scenes around DATE over an AOI and compute an index
    Run {
        /// Scene catalog (JSON) listing band files per scene
        #[arg(short, long)]
        catalog: PathBuf,

        /// AOI polygon as a GeoJSON file
        #[arg(short, long, required_unless_present = "center")]
        aoi: Option<PathBuf>,

        /// AOI center as LON,LAT; builds a square AOI of --side metres
        #[arg(long, value_delimiter = ',', num_args = 2, conflicts_with = "aoi")]
        center: Option<Vec<f64>>,

        /// Side of the square AOI in metres
        #[arg(long, default_value = "1000")]
        side: f64,

        /// Center date, YYYY-MM-DD
        #[arg(short, long)]
        date: String,

        /// Index name (see `indices`)
        #[arg(short, long, default_value = "NDVI")]
        index: String,

        /// Pipeline configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the legend spec as JSON to this path
        #[arg(long)]
        legend: Option<PathBuf>,

        /// Write a colorized RGBA preview GeoTIFF to this path
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Write a true-color RGBA GeoTIFF of the composite to this path
        #[arg(long)]
        rgb: Option<PathBuf>,
    },

    /// List the supported indices with their bands and display defaults
    Indices,

    /// Print the legend spec of an index as JSON
    Legend {
        /// Index name
        #[arg(short, long)]
        index: String,

        /// Gradient width in columns
        #[arg(short, long, default_value = "300")]
        width: usize,
    },

    /// Run several requests from a JSON batch file
    Batch {
        /// Batch configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}
