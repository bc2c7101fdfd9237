use kmzconvert_core::batch::process;
use kmzconvert_core::model::Coordinate;
use kmzconvert_core::source::{InputFile, InputSource};
use kmzconvert_core::{ConvertError, ErrorKind};
use kmzconvert_import_kml::{import_kml, read_source, KmlReader};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

fn polygon_kml(coords: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Placemark><Polygon><outerBoundaryIs><LinearRing>
<coordinates>{coords}</coordinates>
</LinearRing></outerBoundaryIs></Polygon></Placemark></kml>"#
    )
}

fn kmz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

const SQUARE: &str = "0,0,0 0,1,0 1,1,0 1,0,0 0,0,0";

#[test]
fn kmz_with_one_entry_matches_plain_kml() {
    let kml = polygon_kml(SQUARE);
    let archive = kmz(&[("doc.kml", kml.as_bytes())]);

    let from_kml = read_source(&InputSource::Buffer(kml.into_bytes()), "field.kml").unwrap();
    let from_kmz = read_source(&InputSource::Buffer(archive), "field.kmz").unwrap();
    assert_eq!(from_kml, from_kmz);
    assert_eq!(5, from_kmz.len());
}

#[test]
fn kmz_concatenates_kml_entries_in_archive_order() {
    let first = polygon_kml("1,1 2,2");
    let second = polygon_kml("3,3");
    let archive = kmz(&[
        ("b.kml", first.as_bytes()),
        ("files/icon.png", &b"\x89PNG"[..]),
        ("a.kml", second.as_bytes()),
        ("notes.KML.txt", &b"not xml"[..]),
    ]);

    let coords = read_source(&InputSource::Buffer(archive), "LOTE.KMZ").unwrap();
    assert_eq!(
        vec![
            Coordinate::new(1.0, 1.0),
            Coordinate::new(2.0, 2.0),
            Coordinate::new(3.0, 3.0),
        ],
        coords
    );
}

#[test]
fn corrupt_archive_is_an_archive_error() {
    let err = read_source(&InputSource::Buffer(b"plain text".to_vec()), "x.kmz").unwrap_err();
    assert!(matches!(err, ConvertError::Archive(_)));
}

#[test]
fn non_utf8_entry_is_a_decode_error() {
    let archive = kmz(&[("doc.kml", &[0xffu8, 0xfe, 0x00][..])]);
    let err = read_source(&InputSource::Buffer(archive), "x.kmz").unwrap_err();
    match err {
        ConvertError::Decode { entry } => assert_eq!("doc.kml", entry),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_utf8_kml_is_a_decode_error() {
    let err = read_source(&InputSource::Buffer(vec![0xc3, 0x28]), "x.kml").unwrap_err();
    assert_eq!(ErrorKind::Decode, err.kind());
}

#[test]
fn parse_errors_inside_kmz_propagate() {
    let archive = kmz(&[("doc.kml", &b"<kml>"[..])]);
    let err = read_source(&InputSource::Buffer(archive), "x.kmz").unwrap_err();
    assert_eq!(ErrorKind::Parse, err.kind());
}

#[test]
fn unknown_extension_is_rejected() {
    let err = read_source(&InputSource::Buffer(Vec::new()), "route.gpx").unwrap_err();
    assert_eq!(ErrorKind::UnsupportedFormat, err.kind());
}

#[test]
fn reads_kml_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Campo.KML");
    std::fs::write(&path, polygon_kml(SQUARE)).unwrap();
    assert_eq!(5, import_kml(&path).unwrap().len());
}

#[test]
fn batch_over_real_reader() {
    let files = vec![
        InputFile::from_bytes("one.kml", polygon_kml(SQUARE).into_bytes()),
        InputFile::from_bytes("two.kml", b"<kml><unclosed>".to_vec()),
        InputFile::from_bytes(
            "three.kmz",
            kmz(&[("doc.kml", polygon_kml("0,0 0,2 2,2 2,0").as_bytes())]),
        ),
        InputFile::from_bytes("four.kml", polygon_kml("").into_bytes()),
    ];
    let outcome = process(KmlReader, &files);

    assert_eq!(2, outcome.rows.len());
    assert_eq!(1_000_000.0, outcome.rows[0].area_hectares);
    assert_eq!("0.5, 0.5", outcome.rows[0].centroid);
    assert_eq!(4_000_000.0, outcome.rows[1].area_hectares);
    assert_eq!("1.0, 1.0", outcome.rows[1].centroid);

    let failed: Vec<_> = outcome.errors.iter().map(|e| (e.filename.as_str(), e.kind)).collect();
    assert_eq!(
        vec![("two.kml", ErrorKind::Parse), ("four.kml", ErrorKind::EmptyGeometry)],
        failed
    );
}
