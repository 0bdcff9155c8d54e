// src/processing/indices/palettes.rs
//! Default colour ramps, low to high.

pub const RED_YELLOW_GREEN: &[&str] = &["red", "yellow", "green"];

/// Terrain ramp sampled at 21 evenly spaced stops.
pub const TERRAIN: &[&str] = &[
    "#333399", "#2255bb", "#1177dd", "#0099ff", "#00b3b2", "#00cc66", "#33d670",
    "#66e07a", "#99eb85", "#ccf58f", "#ffff99", "#e5de8b", "#ccbe7d", "#b29d70",
    "#997c62", "#805c54", "#997c76", "#b29d98", "#ccbebb", "#e5dedd", "#ffffff",
];

/// Brown to teal diverging ramp.
pub const MOISTURE: &[&str] = &["#8c510a", "#d8b365", "#f6e8c3", "#c7eae5", "#5ab4ac", "#01665e"];

pub const VEGETATION: &[&str] = &[
    "#ce7e45", "#df923d", "#f1b555", "#fcd163", "#99b718", "#74a901", "#66a000", "#529400",
    "#3e8601", "#207401", "#056201", "#004c00", "#023b01", "#012e01", "#011d01", "#011301",
];

pub const GREEN_NDVI: &[&str] = &["#a50026", "#f46d43", "#fee08b", "#d9ef8b", "#66bd63", "#006837"];

pub const ANTHOCYANIN: &[&str] = &["#ffffff", "#fcc5c0", "#fa9fb5", "#c51b8a", "#7a0177"];

pub const CHLOROPHYLL: &[&str] = &["#ffffe5", "#d9f0a3", "#78c679", "#238443", "#004529"];

pub const MCARI: &[&str] = &["#ffffcc", "#c2e699", "#78c679", "#31a354", "#006837"];

/// Green (wet) to red (stressed).
pub const STRESS: &[&str] = &["#1a9850", "#91cf60", "#d9ef8b", "#fee08b", "#fc8d59", "#d73027"];

pub const WATER: &[&str] = &["#f7fbff", "#c6dbef", "#6baed6", "#2171b5", "#08306b"];

pub const DRY_WET: &[&str] = &["#d73027", "#fc8d59", "#fee090", "#e0f3f8", "#91bfdb", "#4575b4"];

pub const BLUE_TO_RED: &[&str] = &["blue", "cyan", "green", "yellow", "red"];

pub const PSSR: &[&str] = &["#ffffcc", "#a1dab4", "#41b6c4", "#2c7fb8", "#253494"];

pub const SIPI: &[&str] = &["#2c7bb6", "#abd9e9", "#ffffbf", "#fdae61", "#d7191c"];
