//! Erreurs du pipeline d'ingestion

use geo::Geometry;
use thiserror::Error;
use vecsource::LoadError;

/// Erreurs terminales d'une exécution du pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source injoignable, non supportée ou illisible
    #[error("Failed to load source: {0}")]
    Load(#[from] LoadError),

    /// Aucun enregistrement de type Polygon non vide
    #[error("No polygon found in the source")]
    NoPolygonFound,

    /// Géométrie sélectionnée autre qu'un Polygon
    #[error("Invalid geometry type: expected Polygon, got {actual}")]
    InvalidGeometryType { actual: String },

    /// Transformation de CRS impossible
    #[error("Reprojection failed: {0}")]
    Reprojection(String),
}

impl PipelineError {
    /// Erreur de reprojection depuis une erreur anyhow (chaîne de contexte conservée)
    pub fn reprojection(err: anyhow::Error) -> Self {
        Self::Reprojection(format!("{:#}", err))
    }

    pub fn invalid_geometry_type(geometry: &Geometry) -> Self {
        Self::InvalidGeometryType {
            actual: geometry_type_name(geometry).to_string(),
        }
    }
}

/// Nom du type de géométrie (vocabulaire OGC)
pub fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
