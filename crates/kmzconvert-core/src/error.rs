use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything that can go wrong while turning one input file into a report row.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed XML: {0}")]
    Xml(String),
    #[error("malformed coordinate `{token}`, expected `lon,lat[,alt]`")]
    Coordinate { token: String },
    #[error("cannot open KMZ archive: {0}")]
    Archive(String),
    #[error("`{entry}` is not valid UTF-8")]
    Decode { entry: String },
    #[error("unsupported file `{0}`, expected a .kml or .kmz extension")]
    UnsupportedFormat(String),
    #[error("no coordinates found")]
    EmptyGeometry,
    #[error("polygon has {distinct} distinct point(s), at least 3 are required")]
    Degenerate { distinct: usize },
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Parse,
    Archive,
    Decode,
    UnsupportedFormat,
    EmptyGeometry,
    Degenerate,
    Io,
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Xml(_) | ConvertError::Coordinate { .. } => ErrorKind::Parse,
            ConvertError::Archive(_) => ErrorKind::Archive,
            ConvertError::Decode { .. } => ErrorKind::Decode,
            ConvertError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ConvertError::EmptyGeometry => ErrorKind::EmptyGeometry,
            ConvertError::Degenerate { .. } => ErrorKind::Degenerate,
            ConvertError::Io(_) => ErrorKind::Io,
        }
    }
}
