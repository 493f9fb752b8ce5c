//! Lecture des Shapefiles (.shp + .dbf + .prj)
//!
//! Le `.shp` est obligatoire. Sans `.dbf` les attributs sont vides, sans
//! `.prj` les coordonnées sont supposées en WGS84. Un `.prj` non reconnu
//! est une erreur.
//!
//! Les anneaux extérieurs ouvrent un nouveau polygone, les anneaux
//! intérieurs sont rattachés au dernier polygone ouvert. Un seul polygone
//! donne un `Polygon`, plusieurs un `MultiPolygon`.

use std::collections::HashMap;
use std::io::Cursor;

use geojson::{Position, Value};
use shapefile::dbase::{FieldValue, Record as DbfRecord};
use shapefile::{PolygonRing, Shape, ShapeReader};
use tracing::warn;

use crate::reader::crs;
use crate::types::{
    AttributeValue, Attributes, CalendarDate, Record, SourceFormat, VectorDataset, WGS84_EPSG,
};
use crate::LoadError;

const FORMAT: &str = "Shapefile";

/// Contenu d'un shapefile et de ses fichiers annexes
#[derive(Debug, Clone, Default)]
pub struct ShapefileBundle {
    pub shp: Vec<u8>,
    pub dbf: Option<Vec<u8>>,
    pub prj: Option<String>,
}

/// Parse un shapefile en jeu de données
pub fn read(bundle: ShapefileBundle) -> Result<VectorDataset, LoadError> {
    let ShapefileBundle { shp, dbf, prj } = bundle;

    let shape_reader =
        ShapeReader::new(Cursor::new(shp)).map_err(|e| LoadError::parse_error(FORMAT, e))?;

    let records = match dbf {
        Some(dbf) => {
            let dbase_reader = shapefile::dbase::Reader::new(Cursor::new(dbf))
                .map_err(|e| LoadError::parse_error(FORMAT, e))?;
            let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);

            let mut records = Vec::new();
            for (index, item) in reader.iter_shapes_and_records().enumerate() {
                let (shape, record) = item.map_err(|e| LoadError::parse_error(FORMAT, e))?;
                records.push(Record::new(
                    shape_to_value(index, shape)?,
                    record_attributes(record),
                ));
            }
            records
        }
        None => {
            warn!("No .dbf sidecar found, records will have no attributes");
            let shapes = shape_reader
                .read()
                .map_err(|e| LoadError::parse_error(FORMAT, e))?;

            shapes
                .into_iter()
                .enumerate()
                .map(|(index, shape)| {
                    Ok(Record::new(shape_to_value(index, shape)?, Attributes::new()))
                })
                .collect::<Result<Vec<_>, LoadError>>()?
        }
    };

    let source_epsg = match prj.as_deref() {
        Some(wkt) => crs::epsg_from_wkt(wkt)
            .ok_or_else(|| LoadError::UnsupportedCrs(format!(".prj {}", wkt_name(wkt))))?,
        None => {
            warn!("No .prj sidecar found, assuming EPSG:4326");
            WGS84_EPSG
        }
    };

    crs::check_geographic_range(VectorDataset {
        records,
        source_epsg,
        format: SourceFormat::Shapefile,
    })
}

/// Nom du CRS racine d'un WKT (`PROJCS["nom",...` -> `nom`)
fn wkt_name(wkt: &str) -> &str {
    wkt.split('"').nth(1).unwrap_or_else(|| wkt.trim())
}

/// Convertit une forme shapefile en valeur GeoJSON (Z conservé, M ignoré)
fn shape_to_value(index: usize, shape: Shape) -> Result<Value, LoadError> {
    let value = match shape {
        Shape::NullShape => Value::GeometryCollection(Vec::new()),
        Shape::Point(p) => Value::Point(vec![p.x, p.y]),
        Shape::PointM(p) => Value::Point(vec![p.x, p.y]),
        Shape::PointZ(p) => Value::Point(vec![p.x, p.y, p.z]),
        Shape::Multipoint(mp) => {
            Value::MultiPoint(mp.points().iter().map(|p| vec![p.x, p.y]).collect())
        }
        Shape::MultipointM(mp) => {
            Value::MultiPoint(mp.points().iter().map(|p| vec![p.x, p.y]).collect())
        }
        Shape::MultipointZ(mp) => {
            Value::MultiPoint(mp.points().iter().map(|p| vec![p.x, p.y, p.z]).collect())
        }
        Shape::Polyline(line) => lines_value(line.parts(), |p| vec![p.x, p.y]),
        Shape::PolylineM(line) => lines_value(line.parts(), |p| vec![p.x, p.y]),
        Shape::PolylineZ(line) => lines_value(line.parts(), |p| vec![p.x, p.y, p.z]),
        Shape::Polygon(polygon) => polygons_value(polygon.rings(), |p| vec![p.x, p.y]),
        Shape::PolygonM(polygon) => polygons_value(polygon.rings(), |p| vec![p.x, p.y]),
        Shape::PolygonZ(polygon) => polygons_value(polygon.rings(), |p| vec![p.x, p.y, p.z]),
        Shape::Multipatch(_) => {
            return Err(LoadError::invalid_geometry(
                index,
                "Multipatch shapes are not supported",
            ))
        }
    };

    Ok(value)
}

fn lines_value<P>(parts: &[Vec<P>], position: impl Fn(&P) -> Position) -> Value {
    let mut lines: Vec<Vec<Position>> = parts
        .iter()
        .map(|part| part.iter().map(&position).collect())
        .collect();

    if lines.len() == 1 {
        Value::LineString(lines.remove(0))
    } else {
        Value::MultiLineString(lines)
    }
}

fn polygons_value<P>(rings: &[PolygonRing<P>], position: impl Fn(&P) -> Position) -> Value {
    let mut polygons: Vec<Vec<Vec<Position>>> = Vec::new();

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => {
                polygons.push(vec![points.iter().map(&position).collect()]);
            }
            PolygonRing::Inner(points) => {
                let coords = points.iter().map(&position).collect();
                match polygons.last_mut() {
                    Some(polygon) => polygon.push(coords),
                    // Trou orphelin: traité comme un anneau extérieur
                    None => polygons.push(vec![coords]),
                }
            }
        }
    }

    match polygons.len() {
        0 => Value::Polygon(Vec::new()),
        1 => Value::Polygon(polygons.remove(0)),
        _ => Value::MultiPolygon(polygons),
    }
}

fn record_attributes(record: DbfRecord) -> Attributes {
    HashMap::<String, FieldValue>::from(record)
        .into_iter()
        .map(|(name, value)| (name, field_value(value)))
        .collect()
}

fn field_value(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(s)) => AttributeValue::Text(s.trim_end().to_string()),
        FieldValue::Numeric(Some(n)) => AttributeValue::Number(n),
        FieldValue::Float(Some(f)) => AttributeValue::Number(f64::from(f)),
        FieldValue::Integer(i) => AttributeValue::Number(f64::from(i)),
        FieldValue::Double(d) => AttributeValue::Number(d),
        FieldValue::Currency(c) => AttributeValue::Number(c),
        FieldValue::Logical(Some(b)) => AttributeValue::Boolean(b),
        FieldValue::Date(Some(date)) => AttributeValue::Date(CalendarDate {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }),
        FieldValue::Memo(s) => AttributeValue::Text(s),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => AttributeValue::Null,
        other => AttributeValue::Text(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Construit un .shp (type Polygon) avec un seul enregistrement
    fn polygon_shp(ring: &[(f64, f64)]) -> Vec<u8> {
        let content_len = 4 + 32 + 4 + 4 + 4 + 16 * ring.len();
        let file_len = 100 + 8 + content_len;

        let (mut xmin, mut ymin, mut xmax, mut ymax) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for &(x, y) in ring {
            xmin = xmin.min(x);
            ymin = ymin.min(y);
            xmax = xmax.max(x);
            ymax = ymax.max(y);
        }

        let mut buf = Vec::with_capacity(file_len);
        buf.extend_from_slice(&9994i32.to_be_bytes());
        buf.extend_from_slice(&[0u8; 20]);
        buf.extend_from_slice(&((file_len / 2) as i32).to_be_bytes());
        buf.extend_from_slice(&1000i32.to_le_bytes());
        buf.extend_from_slice(&5i32.to_le_bytes());
        for v in [xmin, ymin, xmax, ymax, 0.0, 0.0, 0.0, 0.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }

        buf.extend_from_slice(&1i32.to_be_bytes());
        buf.extend_from_slice(&((content_len / 2) as i32).to_be_bytes());
        buf.extend_from_slice(&5i32.to_le_bytes());
        for v in [xmin, ymin, xmax, ymax] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.extend_from_slice(&(ring.len() as i32).to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());
        for &(x, y) in ring {
            buf.extend_from_slice(&x.to_le_bytes());
            buf.extend_from_slice(&y.to_le_bytes());
        }

        buf
    }

    /// Construit un .dbf dBase III: champs (nom, type, longueur, décimales) et
    /// un seul enregistrement dont les valeurs sont déjà cadrées
    fn single_record_dbf(fields: &[(&str, u8, u8, u8)], values: &[&str]) -> Vec<u8> {
        let header_len = 32 + 32 * fields.len() + 1;
        let record_len = 1 + fields.iter().map(|f| f.2 as usize).sum::<usize>();

        let mut buf = vec![0x03, 124, 6, 15];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&(header_len as u16).to_le_bytes());
        buf.extend_from_slice(&(record_len as u16).to_le_bytes());
        buf.extend_from_slice(&[0u8; 20]);

        for &(name, kind, length, decimals) in fields {
            let mut descriptor = [0u8; 32];
            descriptor[..name.len()].copy_from_slice(name.as_bytes());
            descriptor[11] = kind;
            descriptor[16] = length;
            descriptor[17] = decimals;
            buf.extend_from_slice(&descriptor);
        }
        buf.push(0x0D);

        buf.push(b' ');
        for (&(_, _, length, _), value) in fields.iter().zip(values) {
            assert_eq!(value.len(), length as usize, "{:?}", value);
            buf.extend_from_slice(value.as_bytes());
        }
        buf.push(0x1A);

        buf
    }

    #[test]
    fn test_read_polygon_without_sidecars() {
        // Sens horaire = anneau extérieur
        let shp = polygon_shp(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        assert_eq!(SourceFormat::sniff(&shp), Some(SourceFormat::Shapefile));

        let dataset = read(ShapefileBundle {
            shp,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(dataset.format, SourceFormat::Shapefile);
        assert_eq!(dataset.source_epsg, 4326);
        assert_eq!(dataset.len(), 1);
        let Value::Polygon(rings) = &dataset.records[0].geometry else {
            panic!("Expected Polygon, got {:?}", dataset.records[0].geometry);
        };
        assert_eq!(rings.len(), 1);
        assert!(rings[0].len() >= 5);
    }

    #[test]
    fn test_read_with_prj() {
        let shp = polygon_shp(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        let dataset = read(ShapefileBundle {
            shp,
            dbf: None,
            prj: Some(r#"PROJCS["WGS 84 / Gujarat NSF LCC",AUTHORITY["EPSG","7761"]]"#.into()),
        })
        .unwrap();

        assert_eq!(dataset.source_epsg, 7761);
    }

    #[test]
    fn test_read_with_dbf_attributes() {
        let shp = polygon_shp(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        let dbf = single_record_dbf(
            &[
                ("NAME", b'C', 10, 0),
                ("AREA", b'N', 8, 2),
                ("IRRIGATED", b'L', 1, 0),
                ("SOWN", b'D', 8, 0),
                ("DEPTH", b'N', 5, 0),
                ("CHECKED", b'L', 1, 0),
            ],
            &["Plot 12   ", "   12.50", "T", "20240615", "     ", "?"],
        );

        let dataset = read(ShapefileBundle {
            shp,
            dbf: Some(dbf),
            prj: None,
        })
        .unwrap();

        assert_eq!(dataset.len(), 1);
        let attributes = &dataset.records[0].attributes;
        assert_eq!(attributes.len(), 6);
        assert_eq!(
            attributes.get("NAME"),
            Some(&AttributeValue::Text("Plot 12".into()))
        );
        assert_eq!(attributes.get("AREA"), Some(&AttributeValue::Number(12.5)));
        assert_eq!(
            attributes.get("IRRIGATED"),
            Some(&AttributeValue::Boolean(true))
        );
        assert_eq!(
            attributes.get("SOWN"),
            Some(&AttributeValue::Date(CalendarDate {
                year: 2024,
                month: 6,
                day: 15,
            }))
        );
        assert_eq!(attributes.get("DEPTH"), Some(&AttributeValue::Null));
        assert_eq!(attributes.get("CHECKED"), Some(&AttributeValue::Null));
        assert!(matches!(dataset.records[0].geometry, Value::Polygon(_)));
    }

    #[test]
    fn test_field_value_conversions() {
        assert_eq!(
            field_value(FieldValue::Character(Some("cotton  ".into()))),
            AttributeValue::Text("cotton".into())
        );
        assert_eq!(field_value(FieldValue::Integer(7)), AttributeValue::Number(7.0));
        assert_eq!(field_value(FieldValue::Logical(Some(false))), AttributeValue::Boolean(false));
        assert_eq!(field_value(FieldValue::Character(None)), AttributeValue::Null);
        assert_eq!(field_value(FieldValue::Date(None)), AttributeValue::Null);
    }

    #[test]
    fn test_read_with_unknown_prj() {
        let shp = polygon_shp(&[
            (251150.0, 2548040.0),
            (251150.0, 2548140.0),
            (251250.0, 2548140.0),
            (251250.0, 2548040.0),
            (251150.0, 2548040.0),
        ]);
        let err = read(ShapefileBundle {
            shp,
            dbf: None,
            prj: Some(r#"PROJCS["Kalianpur_1975_UTM_Zone_43N",GEOGCS["GCS_Kalianpur_1975",DATUM["D_Kalianpur_1975",SPHEROID["Everest_Adjustment_1937",6377276.345,300.8017]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"]]"#.into()),
        })
        .unwrap_err();

        assert!(
            matches!(err, LoadError::UnsupportedCrs(ref name) if name.contains("Kalianpur_1975_UTM_Zone_43N")),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_read_metres_without_prj() {
        let shp = polygon_shp(&[
            (251150.0, 2548040.0),
            (251150.0, 2548140.0),
            (251250.0, 2548140.0),
            (251250.0, 2548040.0),
            (251150.0, 2548040.0),
        ]);
        let err = read(ShapefileBundle {
            shp,
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, LoadError::OutOfRange { index: 0, .. }), "{:?}", err);
    }

    #[test]
    fn test_read_truncated_shp() {
        let result = read(ShapefileBundle {
            shp: vec![0, 0, 39, 10, 0, 0],
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_polygons_value_groups_holes() {
        let rings = vec![
            PolygonRing::Outer(vec![(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (0.0, 0.0)]),
            PolygonRing::Inner(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)]),
            PolygonRing::Outer(vec![(5.0, 5.0), (5.0, 6.0), (6.0, 6.0), (5.0, 5.0)]),
        ];
        let value = polygons_value(&rings, |&(x, y)| vec![x, y]);

        let Value::MultiPolygon(polygons) = value else {
            panic!("Expected MultiPolygon");
        };
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].len(), 2);
        assert_eq!(polygons[1].len(), 1);
    }
}
