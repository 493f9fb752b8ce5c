//! Lecture des fichiers KML
//!
//! Chaque `Placemark` (à toute profondeur de Document/Folder) donne un
//! enregistrement. `name` et `description` deviennent les attributs `Name`
//! et `Description`, les `ExtendedData` (Data/SimpleData) sont ajoutés tels
//! quels.

use ::kml::types::{Coord, Element, Geometry as KmlGeometry, LinearRing, Placemark};
use ::kml::Kml;
use geojson::{PolygonType, Position, Value};

use crate::reader::crs;
use crate::types::{AttributeValue, Attributes, Record, SourceFormat, VectorDataset, WGS84_EPSG};
use crate::LoadError;

/// Parse un document KML en jeu de données
pub fn read(bytes: &[u8]) -> Result<VectorDataset, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|e| LoadError::parse_error("KML", e))?;
    let kml: Kml<f64> = text
        .parse()
        .map_err(|e: ::kml::Error| LoadError::parse_error("KML", e))?;

    let mut placemarks = Vec::new();
    collect_placemarks(&kml, &mut placemarks);

    let records = placemarks.into_iter().map(placemark_to_record).collect();

    crs::check_geographic_range(VectorDataset {
        records,
        source_epsg: WGS84_EPSG,
        format: SourceFormat::Kml,
    })
}

/// Parcourt l'arbre KML dans l'ordre du document
fn collect_placemarks<'a>(kml: &'a Kml<f64>, out: &mut Vec<&'a Placemark<f64>>) {
    match kml {
        Kml::KmlDocument(doc) => doc
            .elements
            .iter()
            .for_each(|child| collect_placemarks(child, out)),
        Kml::Document { elements, .. } => elements
            .iter()
            .for_each(|child| collect_placemarks(child, out)),
        Kml::Folder { elements, .. } => elements
            .iter()
            .for_each(|child| collect_placemarks(child, out)),
        Kml::Placemark(placemark) => out.push(placemark),
        _ => {}
    }
}

fn placemark_to_record(placemark: &Placemark<f64>) -> Record {
    let mut attributes = Attributes::new();

    if let Some(name) = &placemark.name {
        attributes.insert("Name".to_string(), AttributeValue::Text(name.clone()));
    }
    if let Some(description) = &placemark.description {
        attributes.insert(
            "Description".to_string(),
            AttributeValue::Text(description.clone()),
        );
    }

    for child in &placemark.children {
        if local_name(&child.name) == "ExtendedData" {
            collect_extended_data(child, &mut attributes);
        }
    }

    let geometry = placemark
        .geometry
        .as_ref()
        .map(geometry_to_value)
        .unwrap_or_else(|| Value::GeometryCollection(Vec::new()));

    Record::new(geometry, attributes)
}

/// `<Data name="x"><value>..</value></Data>` et `<SimpleData name="x">..</SimpleData>`
fn collect_extended_data(element: &Element, attributes: &mut Attributes) {
    for child in &element.children {
        match local_name(&child.name) {
            "Data" => {
                let Some(key) = child.attrs.get("name") else {
                    continue;
                };
                let value = child
                    .children
                    .iter()
                    .find(|c| local_name(&c.name) == "value")
                    .and_then(|c| c.content.clone());
                attributes.insert(key.clone(), text_or_null(value));
            }
            "SimpleData" => {
                let Some(key) = child.attrs.get("name") else {
                    continue;
                };
                attributes.insert(key.clone(), text_or_null(child.content.clone()));
            }
            "SchemaData" => collect_extended_data(child, attributes),
            _ => {}
        }
    }
}

fn text_or_null(value: Option<String>) -> AttributeValue {
    value.map_or(AttributeValue::Null, AttributeValue::Text)
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn position(coord: &Coord<f64>) -> Position {
    match coord.z {
        Some(z) => vec![coord.x, coord.y, z],
        None => vec![coord.x, coord.y],
    }
}

fn ring(ring: &LinearRing<f64>) -> Vec<Position> {
    ring.coords.iter().map(position).collect()
}

fn polygon_rings(outer: &LinearRing<f64>, inner: &[LinearRing<f64>]) -> PolygonType {
    std::iter::once(outer)
        .chain(inner.iter())
        .map(ring)
        .collect()
}

/// Convertit une géométrie KML en valeur GeoJSON (Z conservé)
fn geometry_to_value(geometry: &KmlGeometry<f64>) -> Value {
    match geometry {
        KmlGeometry::Point(p) => Value::Point(position(&p.coord)),
        KmlGeometry::LineString(ls) => Value::LineString(ls.coords.iter().map(position).collect()),
        KmlGeometry::LinearRing(lr) => Value::LineString(ring(lr)),
        KmlGeometry::Polygon(p) => Value::Polygon(polygon_rings(&p.outer, &p.inner)),
        KmlGeometry::MultiGeometry(mg) => {
            let parts: Vec<Value> = mg.geometries.iter().map(geometry_to_value).collect();
            collapse_multi(parts)
        }
        _ => Value::GeometryCollection(Vec::new()),
    }
}

/// MultiGeometry homogène -> Multi*, hétérogène -> GeometryCollection
fn collapse_multi(parts: Vec<Value>) -> Value {
    if !parts.is_empty() && parts.iter().all(|p| matches!(p, Value::Polygon(_))) {
        return Value::MultiPolygon(
            parts
                .into_iter()
                .filter_map(|p| match p {
                    Value::Polygon(rings) => Some(rings),
                    _ => None,
                })
                .collect(),
        );
    }
    if !parts.is_empty() && parts.iter().all(|p| matches!(p, Value::LineString(_))) {
        return Value::MultiLineString(
            parts
                .into_iter()
                .filter_map(|p| match p {
                    Value::LineString(coords) => Some(coords),
                    _ => None,
                })
                .collect(),
        );
    }
    if !parts.is_empty() && parts.iter().all(|p| matches!(p, Value::Point(_))) {
        return Value::MultiPoint(
            parts
                .into_iter()
                .filter_map(|p| match p {
                    Value::Point(position) => Some(position),
                    _ => None,
                })
                .collect(),
        );
    }

    Value::GeometryCollection(parts.into_iter().map(geojson::Geometry::new).collect())
}
