// src/processing/mod.rs
pub mod cloud_mask;
pub mod composite;
pub mod evaluate;
pub mod indices;
pub mod legend;
pub mod parallel;

// Re-export main components
pub use composite::Compositor;
pub use evaluate::{evaluate, Evaluator};
pub use indices::{resolve_vis, IndexCalculator, IndexDefinition, VisParams};
pub use legend::{build_legend, LegendSpec};
pub use parallel::TiledProcessor;
