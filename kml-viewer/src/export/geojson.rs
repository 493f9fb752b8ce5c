//! Export de la couche affichée en GeoJSON (geozero)
//!
//! Une FeatureCollection avec un seul polygone en EPSG:4326, le style de la
//! carte (contour rouge, sans remplissage) et les attributs de
//! l'enregistrement source dans les propriétés.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Geometry, Polygon};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use serde_json::{json, Map, Value};
use vecsource::Attributes;

/// Nom de la couche affichée
pub const LAYER_NAME: &str = "Geometry";

/// Style fixe de la couche
pub const STROKE_COLOR: &str = "red";
pub const FILL_OPACITY: f64 = 0.0;

/// Propriétés de style (format Leaflet `path options`)
pub fn style_properties() -> Map<String, Value> {
    let mut style = Map::new();
    style.insert("color".into(), json!(STROKE_COLOR));
    style.insert("fillOpacity".into(), json!(FILL_OPACITY));
    style
}

/// Écrit la couche en GeoJSON dans un writer
pub fn write_layer<W: Write>(
    writer: &mut W,
    polygon: &Polygon<f64>,
    attributes: &Attributes,
) -> Result<()> {
    let mut properties = Map::new();
    for (key, value) in attributes {
        properties.insert(key.clone(), serde_json::to_value(value)?);
    }
    properties.insert("layer".into(), json!(LAYER_NAME));
    properties.insert("style".into(), Value::Object(style_properties()));

    write!(
        writer,
        r#"{{"type":"FeatureCollection","features":[{{"type":"Feature","geometry":"#
    )?;

    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    Geometry::Polygon(polygon.clone())
        .process_geom(&mut geom_writer)
        .context("Failed to encode polygon as GeoJSON")?;
    writer.write_all(&geom_buf)?;

    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, &properties)?;
    write!(writer, "}}]}}")?;

    Ok(())
}

/// Couche GeoJSON en mémoire
pub fn layer_geojson(polygon: &Polygon<f64>, attributes: &Attributes) -> Result<String> {
    let mut buf = Vec::new();
    write_layer(&mut buf, polygon, attributes)?;
    String::from_utf8(buf).context("GeoJSON output is not UTF-8")
}

/// Exporte la couche dans un fichier
pub fn export_layer(path: &Path, polygon: &Polygon<f64>, attributes: &Attributes) -> Result<()> {
    let content = layer_geojson(polygon, attributes)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use vecsource::AttributeValue;

    #[test]
    fn test_layer_is_valid_geojson() {
        let square = polygon![
            (x: 72.5, y: 23.0),
            (x: 72.51, y: 23.0),
            (x: 72.51, y: 23.01),
            (x: 72.5, y: 23.01),
        ];
        let mut attributes = Attributes::new();
        attributes.insert("Name".into(), AttributeValue::Text("Plot \"12\"".into()));

        let text = layer_geojson(&square, &attributes).unwrap();
        let parsed: geojson::GeoJson = text.parse().unwrap();

        let geojson::GeoJson::FeatureCollection(fc) = parsed else {
            panic!("Expected FeatureCollection");
        };
        assert_eq!(fc.features.len(), 1);

        let feature = &fc.features[0];
        assert!(matches!(
            feature.geometry.as_ref().map(|g| &g.value),
            Some(geojson::Value::Polygon(_))
        ));
        assert_eq!(feature.property("Name"), Some(&json!("Plot \"12\"")));
        assert_eq!(feature.property("style"), Some(&json!({"color": "red", "fillOpacity": 0.0})));
    }

    #[test]
    fn test_export_layer() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        let path = std::env::temp_dir().join(format!("kml-viewer-layer-{}.geojson", std::process::id()));

        export_layer(&path, &square, &Attributes::new()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Polygon\""));
        std::fs::remove_file(path).ok();
    }
}
