//! Types d'erreurs pour le crate vecsource

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement d'une source vecteur
#[derive(Debug, Error)]
pub enum LoadError {
    /// Erreur d'I/O lors de la lecture d'un fichier local
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source distante injoignable
    #[error("Failed to fetch {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// Format non reconnu (ni KML, ni GeoJSON, ni Shapefile)
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// CRS déclaré (`.prj`, membre `crs`) mais non reconnu
    #[error("Unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),

    /// Coordonnées hors des bornes WGS84 pour une source supposée en EPSG:4326
    #[error("Record {index} has coordinates ({x}, {y}) outside the EPSG:4326 range, declare the source CRS")]
    OutOfRange { index: usize, x: f64, y: f64 },

    /// Erreur de parsing d'un fichier
    #[error("Parse error in {format} source: {reason}")]
    ParseError { format: String, reason: String },

    /// Géométrie illisible dans un enregistrement
    #[error("Invalid geometry in record {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },
}

impl LoadError {
    /// Crée une erreur de parsing avec contexte
    pub fn parse_error(format: impl Into<String>, reason: impl ToString) -> Self {
        Self::ParseError {
            format: format.into(),
            reason: reason.to_string(),
        }
    }

    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            index,
            reason: reason.into(),
        }
    }

    /// Crée une erreur de source injoignable
    pub fn unreachable(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unreachable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LoadError::parse_error("KML", "unexpected end of file");
        assert_eq!(
            err.to_string(),
            "Parse error in KML source: unexpected end of file"
        );

        let err = LoadError::unreachable("https://example.com/a.kml", "404 Not Found");
        assert!(err.to_string().contains("https://example.com/a.kml"));

        let err = LoadError::OutOfRange {
            index: 2,
            x: 251150.0,
            y: 2548040.0,
        };
        assert!(err.to_string().starts_with("Record 2 has coordinates (251150, 2548040)"));
    }
}
