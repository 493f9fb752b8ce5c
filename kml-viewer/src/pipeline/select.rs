//! Sélection du polygone à mesurer

use geo::{Geometry, Polygon};
use tracing::warn;

use super::{ProjectedDataset, ProjectedGeometry};
use crate::PipelineError;

/// Avertissement émis quand le jeu de données a plusieurs enregistrements
pub const MULTIPLE_RECORDS_WARNING: &str =
    "The source contains several records: only the first polygon will be used, the others are ignored";

/// Polygone retenu et son contexte
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index de l'enregistrement dans la source
    pub index: usize,
    pub geometry: ProjectedGeometry,
    /// Avertissement non bloquant destiné à l'utilisateur
    pub warning: Option<String>,
}

/// Premier enregistrement de type Polygon non vide
pub fn find_first(dataset: &ProjectedDataset) -> Option<(usize, &Polygon<f64>)> {
    dataset
        .records
        .iter()
        .enumerate()
        .find_map(|(index, record)| match &record.geometry {
            Geometry::Polygon(polygon) if !polygon.exterior().0.is_empty() => {
                Some((index, polygon))
            }
            _ => None,
        })
}

/// Retourne le premier polygone valide, `NoPolygonFound` sinon
pub fn select_first_valid_polygon(dataset: &ProjectedDataset) -> Result<Selection, PipelineError> {
    let warning = (dataset.len() > 1).then(|| {
        warn!(records = dataset.len(), "{}", MULTIPLE_RECORDS_WARNING);
        MULTIPLE_RECORDS_WARNING.to_string()
    });

    let (index, polygon) = find_first(dataset).ok_or(PipelineError::NoPolygonFound)?;
    let geometry = ProjectedGeometry::new(polygon.clone(), dataset.epsg)
        .ok_or(PipelineError::NoPolygonFound)?;

    Ok(Selection {
        index,
        geometry,
        warning,
    })
}

/// Vérifie que la géométrie est exactement un Polygon
pub fn validate_polygon_type(geometry: &Geometry<f64>) -> Result<&Polygon<f64>, PipelineError> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(polygon),
        other => Err(PipelineError::invalid_geometry_type(other)),
    }
}

/// Sélectionne explicitement l'enregistrement `index`
///
/// Index hors limites ou polygone vide: `NoPolygonFound`.
pub fn select_polygon_at(
    dataset: &ProjectedDataset,
    index: usize,
) -> Result<Selection, PipelineError> {
    let record = dataset
        .records
        .get(index)
        .ok_or(PipelineError::NoPolygonFound)?;
    let polygon = validate_polygon_type(&record.geometry)?;
    let geometry = ProjectedGeometry::new(polygon.clone(), dataset.epsg)
        .ok_or(PipelineError::NoPolygonFound)?;

    Ok(Selection {
        index,
        geometry,
        warning: None,
    })
}
