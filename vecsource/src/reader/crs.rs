//! Détection du système de coordonnées source
//!
//! - GeoJSON: membre `crs` historique (`urn:ogc:def:crs:EPSG::xxxx`)
//! - Shapefile: WKT du fichier `.prj` (AUTHORITY/ID EPSG ou nom ESRI)
//!
//! Un jeu supposé en WGS84 doit avoir toutes ses coordonnées dans
//! [-180, 180] x [-90, 90].

use std::sync::OnceLock;

use geojson::Value;
use regex::Regex;

use crate::types::{VectorDataset, WGS84_EPSG};
use crate::LoadError;

fn epsg_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)EPSG:(?:[\d.]*:)?(\d+)$").expect("valid regex")
    })
}

fn wkt_authority_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:AUTHORITY|ID)\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("valid regex")
    })
}

fn esri_utm_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)WGS[ _]?(?:19)?84[ _/]+UTM[ _]zone[ _](\d{1,2})([NS])").expect("valid regex")
    })
}

/// Extrait un code EPSG d'un nom de CRS GeoJSON
///
/// `urn:ogc:def:crs:OGC:1.3:CRS84` désigne le WGS84 en ordre lon/lat.
pub fn epsg_from_crs_name(name: &str) -> Option<u32> {
    let name = name.trim();
    if name.to_ascii_uppercase().ends_with("CRS84") {
        return Some(4326);
    }

    epsg_name_pattern()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extrait un code EPSG d'un membre `crs` GeoJSON
pub fn epsg_from_crs_member(crs: &serde_json::Value) -> Option<u32> {
    let properties = crs.get("properties")?;
    match crs.get("type").and_then(|t| t.as_str()) {
        Some("EPSG") => properties
            .get("code")
            .and_then(|c| c.as_u64())
            .and_then(|c| u32::try_from(c).ok()),
        _ => properties
            .get("name")
            .and_then(|n| n.as_str())
            .and_then(epsg_from_crs_name),
    }
}

/// Extrait un code EPSG du WKT d'un fichier `.prj`
///
/// L'autorité la plus externe (la dernière du texte) est retenue.
/// Les WKT ESRI sans autorité sont reconnus par leur nom.
pub fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    if let Some(code) = wkt_authority_pattern()
        .captures_iter(wkt)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
    {
        return Some(code);
    }

    if let Some(caps) = esri_utm_pattern().captures(wkt) {
        let zone: u32 = caps.get(1)?.as_str().parse().ok()?;
        let base = match caps.get(2)?.as_str() {
            "N" | "n" => 32600,
            _ => 32700,
        };
        return (1..=60).contains(&zone).then_some(base + zone);
    }

    let upper = wkt.trim_start().to_ascii_uppercase();
    if upper.contains("WEB_MERCATOR") || upper.contains("PSEUDO-MERCATOR") {
        return Some(3857);
    }
    if upper.starts_with("GEOGCS")
        && (upper.contains("WGS_1984") || upper.contains("WGS 84") || upper.contains("WGS84"))
    {
        return Some(4326);
    }

    None
}

/// Rejette un jeu WGS84 dont une coordonnée n'est pas en degrés
pub fn check_geographic_range(dataset: VectorDataset) -> Result<VectorDataset, LoadError> {
    if dataset.source_epsg != WGS84_EPSG {
        return Ok(dataset);
    }

    for (index, record) in dataset.records.iter().enumerate() {
        if let Some((x, y)) = out_of_range(&record.geometry) {
            return Err(LoadError::OutOfRange { index, x, y });
        }
    }

    Ok(dataset)
}

fn out_of_range(value: &Value) -> Option<(f64, f64)> {
    match value {
        Value::Point(position) => outside(position),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            positions.iter().find_map(|p| outside(p))
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().find_map(|p| outside(p))
        }
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().find_map(|p| outside(p)),
        Value::GeometryCollection(geometries) => {
            geometries.iter().find_map(|g| out_of_range(&g.value))
        }
    }
}

fn outside(position: &[f64]) -> Option<(f64, f64)> {
    match *position {
        [x, y, ..] if x.abs() > 180.0 || y.abs() > 90.0 => Some((x, y)),
        _ => None,
    }
}
