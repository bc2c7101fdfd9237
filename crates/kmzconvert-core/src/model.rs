use crate::error::{ConvertError, ErrorKind};
use crate::geom::format_float;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A KML vertex. Longitude comes first, matching the `lon,lat[,alt]` text order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

pub type CoordinateSequence = Vec<Coordinate>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Kml,
    Kmz,
}

impl SourceFormat {
    /// Picks the format from the file extension, ignoring case.
    pub fn from_filename(filename: &str) -> Result<Self, ConvertError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "kml" => Ok(SourceFormat::Kml),
            "kmz" => Ok(SourceFormat::Kmz),
            _ => Err(ConvertError::UnsupportedFormat(filename.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Kml => "kml",
            SourceFormat::Kmz => "kmz",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub area_hectares: f64,
    /// `"lat, lon"` of the area-weighted centroid.
    pub centroid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub source_filename: String,
    pub coordinates: CoordinateSequence,
    pub centroid: String,
    pub area_hectares: f64,
}

impl ReportRow {
    pub fn new(
        source_filename: impl Into<String>,
        coordinates: CoordinateSequence,
        metrics: MetricsResult,
    ) -> Self {
        Self {
            source_filename: source_filename.into(),
            coordinates,
            centroid: metrics.centroid,
            area_hectares: metrics.area_hectares,
        }
    }

    /// Spreadsheet cell text for the coordinate column: `[(lon, lat), (lon, lat)]`.
    pub fn coordinates_text(&self) -> String {
        format_coordinates(&self.coordinates)
    }
}

pub fn format_coordinates(coords: &[Coordinate]) -> String {
    let mut out = String::with_capacity(coords.len() * 24 + 2);
    out.push('[');
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('(');
        out.push_str(&format_float(c.lon));
        out.push_str(", ");
        out.push_str(&format_float(c.lat));
        out.push(')');
    }
    out.push(']');
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub filename: String,
    pub kind: ErrorKind,
    pub reason: String,
}

impl ErrorRecord {
    pub fn new(filename: impl Into<String>, err: &ConvertError) -> Self {
        Self {
            filename: filename.into(),
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (error: {})", self.filename, self.reason)
    }
}
