//! Types de données pour le crate vecsource

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// EPSG du WGS84 géographique, CRS par défaut de KML et GeoJSON
pub const WGS84_EPSG: u32 = 4326;

/// Attributs d'un enregistrement (nom de colonne -> valeur)
///
/// Le schéma n'est connu qu'après lecture du fichier.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Jeu de données vecteur chargé depuis une source
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDataset {
    /// Enregistrements dans l'ordre du fichier source
    pub records: Vec<Record>,

    /// Code EPSG des coordonnées brutes
    pub source_epsg: u32,

    /// Format détecté
    pub format: SourceFormat,
}

impl VectorDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Un enregistrement : géométrie brute + attributs
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Géométrie telle que lue (positions 2D ou 3D)
    ///
    /// Une géométrie nulle dans la source est représentée par une
    /// `GeometryCollection` vide.
    pub geometry: geojson::Value,

    /// Attributs de l'enregistrement
    pub attributes: Attributes,
}

impl Record {
    pub fn new(geometry: geojson::Value, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
        }
    }
}

/// Valeur d'attribut (union des types primitifs rencontrés dans les sources)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Null,
    Date(CalendarDate),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Null => write!(f, "null"),
            Self::Date(d) => write!(f, "{}", d),
        }
    }
}

impl From<&serde_json::Value> for AttributeValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            // Tableaux et objets imbriqués : conservés sous forme JSON
            other => Self::Text(other.to_string()),
        }
    }
}

/// Date calendaire (champ `D` des DBF)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CalendarDate {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Formats vecteur supportés
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceFormat {
    Kml,
    GeoJson,
    Shapefile,
}

impl SourceFormat {
    /// Détermine le format depuis une extension de fichier
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "kml" => Some(Self::Kml),
            "geojson" | "json" => Some(Self::GeoJson),
            "shp" => Some(Self::Shapefile),
            _ => None,
        }
    }

    /// Détermine le format depuis le contenu
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        // Code fichier shapefile: 9994 en big-endian
        if bytes.len() >= 4 && bytes[..4] == [0x00, 0x00, 0x27, 0x0a] {
            return Some(Self::Shapefile);
        }

        let text = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
        match text.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'<') => Some(Self::Kml),
            Some(b'{') => Some(Self::GeoJson),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Kml => "KML",
            Self::GeoJson => "GeoJSON",
            Self::Shapefile => "Shapefile",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_extension("KML"), Some(SourceFormat::Kml));
        assert_eq!(
            SourceFormat::from_extension("geojson"),
            Some(SourceFormat::GeoJson)
        );
        assert_eq!(
            SourceFormat::from_extension("shp"),
            Some(SourceFormat::Shapefile)
        );
        assert_eq!(SourceFormat::from_extension("gpkg"), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(
            SourceFormat::sniff(b"  <?xml version=\"1.0\"?><kml/>"),
            Some(SourceFormat::Kml)
        );
        assert_eq!(
            SourceFormat::sniff(b"\xef\xbb\xbf{\"type\":\"FeatureCollection\"}"),
            Some(SourceFormat::GeoJson)
        );
        assert_eq!(
            SourceFormat::sniff(&[0x00, 0x00, 0x27, 0x0a, 0x00]),
            Some(SourceFormat::Shapefile)
        );
        assert_eq!(SourceFormat::sniff(b"PK\x03\x04"), None);
    }

    #[test]
    fn test_attribute_from_json() {
        assert_eq!(
            AttributeValue::from(&serde_json::json!("abc")),
            AttributeValue::Text("abc".into())
        );
        assert_eq!(
            AttributeValue::from(&serde_json::json!(12)),
            AttributeValue::Number(12.0)
        );
        assert_eq!(
            AttributeValue::from(&serde_json::json!(null)),
            AttributeValue::Null
        );
        assert_eq!(
            AttributeValue::from(&serde_json::json!([1, 2])),
            AttributeValue::Text("[1,2]".into())
        );
    }

    #[test]
    fn test_calendar_date_display() {
        let date = CalendarDate {
            year: 2024,
            month: 3,
            day: 7,
        };
        assert_eq!(AttributeValue::Date(date).to_string(), "2024-03-07");
    }
}
