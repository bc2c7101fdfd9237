use kmzconvert_core::batch::CoordinateReader;
use kmzconvert_core::model::{Coordinate, CoordinateSequence, SourceFormat};
use kmzconvert_core::source::InputSource;
use kmzconvert_core::ConvertError;
use log::debug;
use roxmltree::Document;
use std::io::{Cursor, Read};
use std::path::Path;

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Extracts every `<coordinates>` pair of a KML document, in document order.
///
/// Only elements in the KML 2.2 namespace are matched. Altitude is dropped.
pub fn parse_kml(xml: &str) -> Result<CoordinateSequence, ConvertError> {
    let doc = Document::parse(xml).map_err(|e| ConvertError::Xml(e.to_string()))?;

    let mut coords = Vec::new();
    for node in doc
        .descendants()
        .filter(|n| n.has_tag_name((KML_NAMESPACE, "coordinates")))
    {
        let text = node.text().unwrap_or("").trim();
        for token in text.split_whitespace() {
            coords.push(parse_token(token)?);
        }
    }
    Ok(coords)
}

fn parse_token(token: &str) -> Result<Coordinate, ConvertError> {
    let mut fields = token.split(',');
    let lon = fields.next().and_then(parse_field);
    let lat = fields.next().and_then(parse_field);
    match (lon, lat) {
        (Some(lon), Some(lat)) => Ok(Coordinate::new(lon, lat)),
        _ => Err(ConvertError::Coordinate {
            token: token.to_string(),
        }),
    }
}

fn parse_field(s: &str) -> Option<f64> {
    s.trim().parse().ok()
}

/// Reads a `.kml` or `.kmz` source, choosing by `filename`'s extension.
pub fn read_source(
    source: &InputSource,
    filename: &str,
) -> Result<CoordinateSequence, ConvertError> {
    let format = SourceFormat::from_filename(filename)?;
    // The buffer lives only for this call; it is dropped on every return path.
    let bytes = source.read_all()?;
    let coords = match format {
        SourceFormat::Kml => read_kml_bytes(&bytes, filename)?,
        SourceFormat::Kmz => read_kmz_bytes(&bytes)?,
    };
    debug!(
        "event=file_read file={filename} format={} points={}",
        format.as_str(),
        coords.len()
    );
    Ok(coords)
}

pub fn import_kml(path: &Path) -> Result<CoordinateSequence, ConvertError> {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    read_source(&InputSource::Path(path.to_path_buf()), &filename)
}

pub fn read_kml_bytes(bytes: &[u8], name: &str) -> Result<CoordinateSequence, ConvertError> {
    let xml = std::str::from_utf8(bytes).map_err(|_| ConvertError::Decode {
        entry: name.to_string(),
    })?;
    parse_kml(xml)
}

/// Concatenates the coordinates of every `.kml` entry, in archive order.
pub fn read_kmz_bytes(bytes: &[u8]) -> Result<CoordinateSequence, ConvertError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ConvertError::Archive(e.to_string()))?;

    let mut coords = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ConvertError::Archive(e.to_string()))?;
        if entry.is_dir() || !entry.name().ends_with(".kml") {
            continue;
        }
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| ConvertError::Archive(format!("{name}: {e}")))?;
        let found = read_kml_bytes(&data, &name)?;
        debug!("event=kmz_entry entry={name} points={}", found.len());
        coords.extend(found);
    }
    Ok(coords)
}

/// [`CoordinateReader`] backed by this crate's KML/KMZ reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmlReader;

impl CoordinateReader for KmlReader {
    fn read(
        &self,
        source: &InputSource,
        filename: &str,
    ) -> Result<CoordinateSequence, ConvertError> {
        read_source(source, filename)
    }
}
