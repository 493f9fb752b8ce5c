//! Tests d'intégration: lecture de fichiers réels écrits dans un dossier temporaire

use std::path::PathBuf;

use geojson::Value;
use vecsource::repair::{buffer_zero, drop_z, has_z, to_geo};
use vecsource::{LoadError, Source, SourceFormat, SourceReader, UploadedFile};

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vecsource-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// .shp minimal: un enregistrement Polygon, anneau horaire
fn polygon_shp(ring: &[(f64, f64)]) -> Vec<u8> {
    let content_len = 48 + 16 * ring.len();
    let file_len = 108 + content_len;

    let mut buf = Vec::new();
    buf.extend_from_slice(&9994i32.to_be_bytes());
    buf.extend_from_slice(&[0u8; 20]);
    buf.extend_from_slice(&((file_len / 2) as i32).to_be_bytes());
    buf.extend_from_slice(&1000i32.to_le_bytes());
    buf.extend_from_slice(&5i32.to_le_bytes());
    let bbox = [
        ring.iter().map(|p| p.0).fold(f64::MAX, f64::min),
        ring.iter().map(|p| p.1).fold(f64::MAX, f64::min),
        ring.iter().map(|p| p.0).fold(f64::MIN, f64::max),
        ring.iter().map(|p| p.1).fold(f64::MIN, f64::max),
    ];
    for v in bbox.iter().chain([0.0; 4].iter()) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    buf.extend_from_slice(&1i32.to_be_bytes());
    buf.extend_from_slice(&((content_len / 2) as i32).to_be_bytes());
    buf.extend_from_slice(&5i32.to_le_bytes());
    for v in &bbox {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf.extend_from_slice(&1i32.to_le_bytes());
    buf.extend_from_slice(&(ring.len() as i32).to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes());
    for (x, y) in ring {
        buf.extend_from_slice(&x.to_le_bytes());
        buf.extend_from_slice(&y.to_le_bytes());
    }
    buf
}

const KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Plot 12</name>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>72.50,23.00,42 72.51,23.00,42 72.51,23.01,42 72.50,23.01,42 72.50,23.00,42</coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </Placemark>
  </Document>
</kml>"#;

#[test]
fn test_read_kml_path() {
    let dir = fixture_dir("kml");
    let path = dir.join("plot.kml");
    std::fs::write(&path, KML).unwrap();

    let dataset = SourceReader::default().read(&Source::Path(path)).unwrap();
    assert_eq!(dataset.format, SourceFormat::Kml);
    assert_eq!(dataset.len(), 1);

    let raw = &dataset.records[0].geometry;
    assert!(has_z(raw));

    let flat = drop_z(raw);
    assert!(!has_z(&flat));
    let geometry = buffer_zero(&to_geo(&flat).unwrap());
    assert!(matches!(geometry, geo::Geometry::Polygon(_)));
}

#[test]
fn test_read_geojson_without_extension() {
    let dir = fixture_dir("geojson");
    let path = dir.join("download");
    std::fs::write(
        &path,
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"crop":"cotton"},"geometry":{"type":"Point","coordinates":[72.5,23.0]}}]}"#,
    )
    .unwrap();

    let dataset = vecsource::read(&Source::Path(path)).unwrap();
    assert_eq!(dataset.format, SourceFormat::GeoJson);
    assert_eq!(
        dataset.records[0].attributes.get("crop").map(|v| v.to_string()),
        Some("cotton".to_string())
    );
}

#[test]
fn test_read_shapefile_with_prj_sidecar() {
    let dir = fixture_dir("shp");
    let shp = dir.join("field.shp");
    std::fs::write(
        &shp,
        polygon_shp(&[
            (1_000_000.0, 1_000_000.0),
            (1_000_000.0, 1_000_100.0),
            (1_000_100.0, 1_000_100.0),
            (1_000_100.0, 1_000_000.0),
            (1_000_000.0, 1_000_000.0),
        ]),
    )
    .unwrap();
    std::fs::write(
        dir.join("field.prj"),
        r#"PROJCS["WGS 84 / Gujarat NSF LCC",PROJECTION["Lambert_Conformal_Conic_2SP"],AUTHORITY["EPSG","7761"]]"#,
    )
    .unwrap();

    let dataset = SourceReader::default().read(&Source::Path(shp)).unwrap();
    assert_eq!(dataset.format, SourceFormat::Shapefile);
    assert_eq!(dataset.source_epsg, 7761);
    assert_eq!(dataset.len(), 1);
    assert!(matches!(dataset.records[0].geometry, Value::Polygon(_)));
    assert!(dataset.records[0].attributes.is_empty());
}

#[test]
fn test_read_upload_kml() {
    let upload = UploadedFile::new("plot.kml", KML.as_bytes().to_vec());
    let dataset = SourceReader::default()
        .read(&Source::Upload(upload))
        .unwrap();
    assert_eq!(dataset.format, SourceFormat::Kml);
}

#[test]
fn test_read_unsupported_upload() {
    let upload = UploadedFile::new("plot.gpkg", b"SQLite format 3\0".to_vec());
    let result = SourceReader::default().read(&Source::Upload(upload));
    assert!(matches!(result, Err(LoadError::UnsupportedFormat(_))));
}
