use kmzconvert_core::model::Coordinate;
use kmzconvert_core::{ConvertError, ErrorKind};
use kmzconvert_import_kml::parse_kml;

const FIELD_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Lote 12</name>
    <Placemark>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>
              -60.5,-33.25,0 -60.4,-33.25,0
              -60.4,-33.15,0
            </coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </Placemark>
    <Folder>
      <Placemark>
        <Point><coordinates>-60.45,-33.2</coordinates></Point>
      </Placemark>
    </Folder>
  </Document>
</kml>
"#;

#[test]
fn extracts_lon_lat_pairs_in_document_order() {
    let coords = parse_kml(FIELD_KML).unwrap();
    assert_eq!(
        vec![
            Coordinate::new(-60.5, -33.25),
            Coordinate::new(-60.4, -33.25),
            Coordinate::new(-60.4, -33.15),
            Coordinate::new(-60.45, -33.2),
        ],
        coords
    );
}

#[test]
fn prefixed_namespace_is_matched() {
    let xml = r#"<k:kml xmlns:k="http://www.opengis.net/kml/2.2">
        <k:Placemark><k:coordinates>1,2 3,4,5</k:coordinates></k:Placemark>
    </k:kml>"#;
    assert_eq!(
        vec![Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)],
        parse_kml(xml).unwrap()
    );
}

#[test]
fn other_namespaces_yield_nothing() {
    let unqualified = "<kml><coordinates>1,2</coordinates></kml>";
    let legacy = r#"<kml xmlns="http://earth.google.com/kml/2.1"><coordinates>1,2</coordinates></kml>"#;
    assert!(parse_kml(unqualified).unwrap().is_empty());
    assert!(parse_kml(legacy).unwrap().is_empty());
}

#[test]
fn blank_coordinates_contribute_nothing() {
    let xml = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
        <coordinates>   </coordinates><coordinates/>
    </kml>"#;
    assert!(parse_kml(xml).unwrap().is_empty());
}

#[test]
fn malformed_xml_is_a_parse_error() {
    let err = parse_kml("<kml><Placemark></kml>").unwrap_err();
    assert!(matches!(err, ConvertError::Xml(_)));
    assert_eq!(ErrorKind::Parse, err.kind());
}

#[test]
fn single_field_token_is_a_parse_error() {
    let xml = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><coordinates>1,2 3</coordinates></kml>"#;
    let err = parse_kml(xml).unwrap_err();
    match err {
        ConvertError::Coordinate { token } => assert_eq!("3", token),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_numeric_field_is_a_parse_error() {
    let xml = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><coordinates>a,b</coordinates></kml>"#;
    assert_eq!(ErrorKind::Parse, parse_kml(xml).unwrap_err().kind());
}
