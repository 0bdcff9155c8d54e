// src/io/mod.rs
pub mod reader;
pub mod writer;

pub use reader::{read_band, Catalog, CatalogSource, SceneEntry};
pub use writer::{write_index_raster, write_products, write_rgba, OutputPaths, WriteOptions};
