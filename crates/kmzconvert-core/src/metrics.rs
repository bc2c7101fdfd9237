//! Planar polygon metrics over raw lon/lat values.
//!
//! Longitude is used as x and latitude as y with no projection. The area in
//! "square degrees" is multiplied by [`HECTARE_SCALE`] to land on the hectare
//! magnitudes the report consumers expect; this is an empirical constant with no
//! latitude correction, not a geodesic area.

use crate::error::ConvertError;
use crate::geom::format_float;
use crate::model::{Coordinate, MetricsResult};
use geo::{Area, Centroid, LineString, Polygon};
use std::collections::HashSet;

pub const HECTARE_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Fail rings with fewer than 3 distinct points instead of reporting a zero area.
    pub reject_degenerate: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            reject_degenerate: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    cfg: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(cfg: MetricsConfig) -> Self {
        Self { cfg }
    }

    pub fn compute(&self, coords: &[Coordinate]) -> Result<MetricsResult, ConvertError> {
        if coords.is_empty() {
            return Err(ConvertError::EmptyGeometry);
        }

        let ring = close_ring(coords);
        if self.cfg.reject_degenerate {
            let distinct = count_distinct(&ring, 3);
            if distinct < 3 {
                return Err(ConvertError::Degenerate { distinct });
            }
        }

        let polygon = Polygon::new(
            LineString::from(ring.iter().map(|c| (c.lon, c.lat)).collect::<Vec<_>>()),
            Vec::new(),
        );

        let area_hectares = round1(polygon.unsigned_area() * HECTARE_SCALE);
        let centroid = polygon.centroid().ok_or(ConvertError::EmptyGeometry)?;

        Ok(MetricsResult {
            area_hectares,
            centroid: format!("{}, {}", format_float(centroid.y()), format_float(centroid.x())),
        })
    }
}

/// Metrics with the default configuration.
pub fn compute(coords: &[Coordinate]) -> Result<MetricsResult, ConvertError> {
    MetricsEngine::default().compute(coords)
}

/// Returns the ring with the first vertex repeated at the end, unless it is already closed.
pub fn close_ring(coords: &[Coordinate]) -> Vec<Coordinate> {
    let mut ring = coords.to_vec();
    if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
        if first != last {
            ring.push(*first);
        }
    }
    ring
}

pub fn is_closed(coords: &[Coordinate]) -> bool {
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) => first == last,
        _ => false,
    }
}

fn count_distinct(coords: &[Coordinate], stop_at: usize) -> usize {
    let mut seen = HashSet::new();
    for c in coords {
        // +0.0 folds -0.0 into 0.0 so bit patterns agree with float equality.
        seen.insert(((c.lon + 0.0).to_bits(), (c.lat + 0.0).to_bits()));
        if seen.len() >= stop_at {
            break;
        }
    }
    seen.len()
}

/// Rounds the exact binary value to one decimal, sending exact ties to the even digit.
fn round1(value: f64) -> f64 {
    // A binary float sits exactly on a .x5 tie only when its fraction is .25 or .75.
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        let tenths = (value * 10.0).floor();
        let even = if tenths % 2.0 == 0.0 { tenths } else { tenths + 1.0 };
        return even / 10.0;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}
