// src/render.rs
//! RGBA rendering of index rasters, legends and true-colour composites.
//!
//! Index rasters and legend gradients go through the same [`ColorRamp`]
//! lookup, so a legend column and a raster pixel with equal values get
//! equal colours.

use itertools::izip;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::processing::indices::VisParams;
use crate::processing::legend::LegendSpec;
use crate::raster::{Composite, IndexRaster};

/// Display range for the B4/B3/B2 true-colour view.
pub const RGB_RANGE: (f32, f32) = (0.0, 0.3);

/// Fully transparent, used for undefined pixels.
pub const NODATA_RGBA: [u8; 4] = [0, 0, 0, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("lime", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("orange", Rgb::new(255, 165, 0)),
    ("purple", Rgb::new(128, 0, 128)),
    ("brown", Rgb::new(165, 42, 42)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("darkgreen", Rgb::new(0, 100, 0)),
    ("navy", Rgb::new(0, 0, 128)),
];

/// Parse a CSS colour name or a `#rrggbb` / `rrggbb` hex string.
pub fn parse_color(spec: &str) -> Result<Rgb> {
    let spec = spec.trim();
    if let Some(&(_, rgb)) = NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(spec))
    {
        return Ok(rgb);
    }

    let hex = spec.strip_prefix('#').unwrap_or(spec);
    let invalid = || Error::InvalidParameter {
        name: "palette color",
        value: spec.to_string(),
        reason: "expected a colour name or #rrggbb".to_string(),
    };
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).map_err(|_| invalid());
    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Evenly spaced colour stops with linear interpolation between them.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<Rgb>,
}

impl ColorRamp {
    pub fn from_palette(palette: &[String]) -> Result<Self> {
        if palette.is_empty() {
            return Err(Error::InvalidParameter {
                name: "palette",
                value: "[]".to_string(),
                reason: "at least one colour is required".to_string(),
            });
        }
        let stops = palette
            .iter()
            .map(|c| parse_color(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stops })
    }

    /// Colour at `t` in `[0, 1]`; values outside are clamped.
    pub fn at(&self, t: f64) -> Rgb {
        if self.stops.len() == 1 {
            return self.stops[0];
        }
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let segments = (self.stops.len() - 1) as f64;
        let pos = t * segments;
        let idx = (pos.floor() as usize).min(self.stops.len() - 2);
        let frac = pos - idx as f64;

        let (a, b) = (self.stops[idx], self.stops[idx + 1]);
        let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        Rgb::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
    }

    /// Colour of a data value under a `[min, max]` stretch.
    pub fn color_for(&self, value: f64, min: f64, max: f64) -> Rgb {
        self.at((value - min) / (max - min))
    }
}

fn write_pixel(out: &mut [u8], value: Option<f64>, ramp: &ColorRamp, vis: &VisParams) {
    match value {
        Some(v) if v.is_finite() => {
            let Rgb { r, g, b } = ramp.color_for(v, vis.min, vis.max);
            out.copy_from_slice(&[r, g, b, 255]);
        }
        _ => out.copy_from_slice(&NODATA_RGBA),
    }
}

/// Row-major RGBA bytes for an index raster.
pub fn colorize(raster: &IndexRaster, vis: &VisParams) -> Result<Vec<u8>> {
    let ramp = ColorRamp::from_palette(&vis.palette)?;
    let mut rgba = vec![0u8; raster.data().len() * 4];
    rgba.par_chunks_mut(4)
        .zip(raster.data().par_iter())
        .for_each(|(out, value)| write_pixel(out, value.map(f64::from), &ramp, vis));
    Ok(rgba)
}

/// RGBA bytes of the legend gradient, one row `legend.gradient.len()` wide.
pub fn legend_rgba(legend: &LegendSpec) -> Result<Vec<u8>> {
    let vis = legend.vis();
    let ramp = ColorRamp::from_palette(&vis.palette)?;
    let mut rgba = vec![0u8; legend.gradient.len() * 4];
    rgba.par_chunks_mut(4)
        .zip(legend.gradient.par_iter())
        .for_each(|(out, &value)| write_pixel(out, Some(value), &ramp, &vis));
    Ok(rgba)
}

/// True-colour RGBA (B4, B3, B2 stretched over [`RGB_RANGE`]).
///
/// A pixel is transparent when any of the three bands is undefined.
pub fn composite_rgb(composite: &Composite) -> Result<Vec<u8>> {
    let red = composite.band("B4")?.data();
    let green = composite.band("B3")?.data();
    let blue = composite.band("B2")?.data();
    let (lo, hi) = RGB_RANGE;
    let stretch = |v: f32| (((v - lo) / (hi - lo)).clamp(0.0, 1.0) * 255.0).round() as u8;

    let mut rgba = Vec::with_capacity(red.len() * 4);
    for (r, g, b) in izip!(red, green, blue) {
        match (r, g, b) {
            (Some(r), Some(g), Some(b)) => {
                rgba.extend_from_slice(&[stretch(*r), stretch(*g), stretch(*b), 255])
            }
            _ => rgba.extend_from_slice(&NODATA_RGBA),
        }
    }
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex() {
        assert_eq!(parse_color("Red").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(parse_color("#00cc66").unwrap(), Rgb::new(0, 204, 102));
        assert_eq!(parse_color("0099ff").unwrap(), Rgb::new(0, 153, 255));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }

    #[test]
    fn ramp_hits_its_stops() {
        let ramp =
            ColorRamp::from_palette(&["red".to_string(), "yellow".to_string(), "green".to_string()])
                .unwrap();
        assert_eq!(ramp.at(0.0), Rgb::new(255, 0, 0));
        assert_eq!(ramp.at(0.5), Rgb::new(255, 255, 0));
        assert_eq!(ramp.at(1.0), Rgb::new(0, 128, 0));
        assert_eq!(ramp.at(-3.0), Rgb::new(255, 0, 0));
        assert_eq!(ramp.at(7.0), Rgb::new(0, 128, 0));
        assert_eq!(ramp.at(0.25), Rgb::new(255, 128, 0));
    }
}
