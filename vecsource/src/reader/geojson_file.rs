//! Lecture des fichiers GeoJSON
//!
//! FeatureCollection, Feature isolée ou Geometry nue. Le membre `crs`
//! historique (GeoJSON 2008) est respecté, sinon WGS84. Un membre `crs`
//! non reconnu est une erreur.

use geojson::{Feature, GeoJson, JsonObject, Value};

use crate::reader::crs;
use crate::types::{AttributeValue, Attributes, Record, SourceFormat, VectorDataset, WGS84_EPSG};
use crate::LoadError;

/// Parse un document GeoJSON en jeu de données
pub fn read(bytes: &[u8]) -> Result<VectorDataset, LoadError> {
    let text = std::str::from_utf8(bytes).map_err(|e| LoadError::parse_error("GeoJSON", e))?;
    let text = text.trim_start_matches('\u{feff}');
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| LoadError::parse_error("GeoJSON", e))?;

    let (records, foreign_members) = match geojson {
        GeoJson::FeatureCollection(fc) => (
            fc.features.into_iter().map(feature_to_record).collect(),
            fc.foreign_members,
        ),
        GeoJson::Feature(feature) => {
            let members = feature.foreign_members.clone();
            (vec![feature_to_record(feature)], members)
        }
        GeoJson::Geometry(geometry) => (
            vec![Record::new(geometry.value, Attributes::new())],
            geometry.foreign_members,
        ),
    };

    crs::check_geographic_range(VectorDataset {
        records,
        source_epsg: source_epsg(foreign_members.as_ref())?,
        format: SourceFormat::GeoJson,
    })
}

fn source_epsg(foreign_members: Option<&JsonObject>) -> Result<u32, LoadError> {
    let Some(crs_member) = foreign_members.and_then(|m| m.get("crs")) else {
        return Ok(WGS84_EPSG);
    };

    crs::epsg_from_crs_member(crs_member)
        .ok_or_else(|| LoadError::UnsupportedCrs(format!("GeoJSON crs {}", crs_member)))
}

fn feature_to_record(feature: Feature) -> Record {
    let geometry = feature
        .geometry
        .map(|g| g.value)
        .unwrap_or_else(|| Value::GeometryCollection(Vec::new()));

    let attributes = feature
        .properties
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| (key.clone(), AttributeValue::from(value)))
        .collect();

    Record::new(geometry, attributes)
}
