// src/aoi.rs
//! Area-of-interest polygons in lon/lat.
//!
//! An [`Aoi`] is validated once on construction and read-only afterwards.
//! Rings may be given open or closed; the closing vertex is dropped.

use serde::Deserialize;

use crate::error::{Error, Result};

const METERS_PER_DEGREE: f64 = 111_320.0;

/// A validated polygon: one exterior ring and optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Aoi {
    exterior: Vec<(f64, f64)>,
    holes: Vec<Vec<(f64, f64)>>,
    bounds: [f64; 4],
}

impl Aoi {
    pub fn new(exterior: Vec<(f64, f64)>, holes: Vec<Vec<(f64, f64)>>) -> Result<Self> {
        let exterior = normalize_ring(exterior, "exterior ring")?;
        let holes = holes
            .into_iter()
            .enumerate()
            .map(|(i, ring)| normalize_ring(ring, &format!("hole {i}")))
            .collect::<Result<Vec<_>>>()?;

        let bounds = ring_bounds(&exterior);
        Ok(Self {
            exterior,
            holes,
            bounds,
        })
    }

    /// Axis-aligned square of `side_m` metres centred on a lon/lat point.
    pub fn square(center_lon: f64, center_lat: f64, side_m: f64) -> Result<Self> {
        if !(side_m.is_finite() && side_m > 0.0) {
            return Err(Error::InvalidAoi(format!("square side must be positive, got {side_m}")));
        }
        let half_lat = side_m / 2.0 / METERS_PER_DEGREE;
        let half_lon = side_m / 2.0 / (METERS_PER_DEGREE * center_lat.to_radians().cos());
        Self::new(
            vec![
                (center_lon - half_lon, center_lat - half_lat),
                (center_lon + half_lon, center_lat - half_lat),
                (center_lon + half_lon, center_lat + half_lat),
                (center_lon - half_lon, center_lat + half_lat),
            ],
            Vec::new(),
        )
    }

    /// Parse a GeoJSON `Polygon`, a `Feature` holding one, or a
    /// `FeatureCollection` with exactly one feature.
    pub fn from_geojson(text: &str) -> Result<Self> {
        let doc: GeoJson = serde_json::from_str(text)?;
        let rings = match doc {
            GeoJson::Polygon { coordinates } => coordinates,
            GeoJson::Feature { geometry } => geometry.into_rings()?,
            GeoJson::FeatureCollection { mut features } => {
                if features.len() != 1 {
                    return Err(Error::InvalidAoi(format!(
                        "expected one feature, found {}",
                        features.len()
                    )));
                }
                features.remove(0).geometry.into_rings()?
            }
        };

        let mut rings = rings
            .into_iter()
            .map(|ring| ring.into_iter().map(|[lon, lat]| (lon, lat)).collect::<Vec<_>>());
        let exterior = rings
            .next()
            .ok_or_else(|| Error::InvalidAoi("polygon has no rings".to_string()))?;
        Self::new(exterior, rings.collect())
    }

    pub fn exterior(&self) -> &[(f64, f64)] {
        &self.exterior
    }

    pub fn holes(&self) -> &[Vec<(f64, f64)>] {
        &self.holes
    }

    /// `[west, south, east, north]`.
    pub fn bounds(&self) -> [f64; 4] {
        self.bounds
    }

    /// Even-odd point-in-polygon; points inside a hole are outside.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let [w, s, e, n] = self.bounds;
        if lon < w || lon > e || lat < s || lat > n {
            return false;
        }
        ring_contains(&self.exterior, lon, lat)
            && !self.holes.iter().any(|h| ring_contains(h, lon, lat))
    }

    /// Whether the polygon shares any area with the rectangle `[west, south, east, north]`.
    pub fn intersects_rect(&self, rect: [f64; 4]) -> bool {
        let [w, s, e, n] = rect;
        let [aw, as_, ae, an] = self.bounds;
        if ae < w || aw > e || an < s || as_ > n {
            return false;
        }

        if self
            .exterior
            .iter()
            .any(|&(x, y)| x >= w && x <= e && y >= s && y <= n)
        {
            return true;
        }

        let corners = [(w, s), (e, s), (e, n), (w, n)];
        if corners.iter().any(|&(x, y)| self.contains(x, y)) {
            return true;
        }

        ring_edges(&self.exterior).any(|(a, b)| {
            ring_edges(&corners).any(|(c, d)| segments_intersect(a, b, c, d))
        })
    }
}

fn normalize_ring(mut ring: Vec<(f64, f64)>, what: &str) -> Result<Vec<(f64, f64)>> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring.dedup();

    if ring.len() < 3 {
        return Err(Error::InvalidAoi(format!(
            "{what} needs at least 3 distinct vertices, got {}",
            ring.len()
        )));
    }

    for &(lon, lat) in &ring {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(Error::InvalidAoi(format!("{what} has a non-finite vertex")));
        }
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidAoi(format!(
                "{what} vertex ({lon}, {lat}) is outside lon/lat range"
            )));
        }
    }

    if signed_area(&ring).abs() <= f64::EPSILON * 1e-6 {
        return Err(Error::InvalidAoi(format!("{what} has zero area")));
    }

    if self_intersects(&ring) {
        return Err(Error::InvalidAoi(format!("{what} is self-intersecting")));
    }

    Ok(ring)
}

fn ring_bounds(ring: &[(f64, f64)]) -> [f64; 4] {
    ring.iter().fold(
        [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
        |[w, s, e, n], &(x, y)| [w.min(x), s.min(y), e.max(x), n.max(y)],
    )
}

fn signed_area(ring: &[(f64, f64)]) -> f64 {
    ring_edges(ring)
        .map(|((x0, y0), (x1, y1))| x0 * y1 - x1 * y0)
        .sum::<f64>()
        / 2.0
}

fn ring_edges(ring: &[(f64, f64)]) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
    ring.iter()
        .enumerate()
        .map(move |(i, &a)| (a, ring[(i + 1) % ring.len()]))
}

fn ring_contains(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    let mut inside = false;
    for ((x0, y0), (x1, y1)) in ring_edges(ring) {
        if (y0 > lat) != (y1 > lat) {
            let x = x0 + (lat - y0) * (x1 - x0) / (y1 - y0);
            if lon < x {
                inside = !inside;
            }
        }
    }
    inside
}

// Non-adjacent edges must not touch.
fn self_intersects(ring: &[(f64, f64)]) -> bool {
    let n = ring.len();
    let edges: Vec<_> = ring_edges(ring).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (a, b) = edges[i];
            let (c, d) = edges[j];
            if segments_intersect(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

fn orientation(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn on_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}

fn segments_intersect(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    if ((o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0))
        && ((o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0))
    {
        return true;
    }

    (o1 == 0.0 && on_segment(a, b, c))
        || (o2 == 0.0 && on_segment(a, b, d))
        || (o3 == 0.0 && on_segment(c, d, a))
        || (o4 == 0.0 && on_segment(c, d, b))
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum GeoJson {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    Feature { geometry: Geometry },
    FeatureCollection { features: Vec<Feature> },
}

#[derive(Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl Geometry {
    fn into_rings(self) -> Result<Vec<Vec<[f64; 2]>>> {
        match self {
            Geometry::Polygon { coordinates } => Ok(coordinates),
            Geometry::MultiPolygon { mut coordinates } if coordinates.len() == 1 => {
                Ok(coordinates.remove(0))
            }
            Geometry::MultiPolygon { coordinates } => Err(Error::InvalidAoi(format!(
                "multipolygon with {} parts is not supported",
                coordinates.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_edges_are_detected() {
        let a = (0.0, 0.0);
        let b = (1.0, 1.0);
        assert!(segments_intersect(a, b, (0.0, 1.0), (1.0, 0.0)));
        assert!(!segments_intersect(a, b, (2.0, 0.0), (3.0, 1.0)));
    }

    #[test]
    fn ccw_square_has_positive_area() {
        let ring = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)];
        assert!((signed_area(&ring) - 4.0).abs() < 1e-12);
    }
}
