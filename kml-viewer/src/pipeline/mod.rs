//! Pipeline d'ingestion: jeu de données brut -> polygone projeté + métriques
//!
//! 1. `preprocess`: Z supprimé, reprojection vers le plan EPSG:7761, buffer nul
//! 2. `select_first_valid_polygon` (ou `select_polygon_at`)
//! 3. `compute_metrics`

pub mod metrics;
pub mod preprocess;
pub mod select;

pub use metrics::{compute_metrics, GeometryMetrics};
pub use preprocess::preprocess;
pub use select::{
    find_first, select_first_valid_polygon, select_polygon_at, validate_polygon_type, Selection,
    MULTIPLE_RECORDS_WARNING,
};

use geo::{Geometry, Polygon};
use serde::Serialize;
use tracing::info;
use vecsource::{Attributes, VectorDataset};

use crate::PipelineError;

/// EPSG:7761 - WGS 84 / Gujarat NSF LCC (mètres), plan de calcul des métriques
pub const PLANAR_EPSG: u32 = 7761;

/// EPSG:4326 - coordonnées géographiques d'affichage
pub const GEOGRAPHIC_EPSG: u32 = 4326;

/// Jeu de données après `preprocess` (ordre et attributs conservés)
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedDataset {
    pub records: Vec<ProjectedRecord>,
    pub epsg: u32,
}

impl ProjectedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Enregistrement projeté: géométrie 2D dans le plan + attributs d'origine
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRecord {
    pub geometry: Geometry<f64>,
    pub attributes: Attributes,
}

/// Polygone unique, non vide, 2D, dans un CRS donné
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedGeometry {
    polygon: Polygon<f64>,
    epsg: u32,
}

impl ProjectedGeometry {
    /// `None` si le polygone est vide
    pub fn new(polygon: Polygon<f64>, epsg: u32) -> Option<Self> {
        (!polygon.exterior().0.is_empty()).then_some(Self { polygon, epsg })
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }
}

/// Résultat d'une exécution complète
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub index: usize,
    pub warning: Option<String>,
    pub metrics: GeometryMetrics,
    #[serde(skip)]
    pub geometry: ProjectedGeometry,
}

/// Exécute preprocess -> sélection -> métriques
///
/// `index` force un enregistrement précis au lieu du premier polygone valide.
pub fn run(dataset: &VectorDataset, index: Option<usize>) -> Result<PipelineOutput, PipelineError> {
    if dataset.is_empty() {
        return Err(PipelineError::NoPolygonFound);
    }

    let projected = preprocess(dataset)?;
    let selection = match index {
        Some(index) => select_polygon_at(&projected, index)?,
        None => select_first_valid_polygon(&projected)?,
    };
    let metrics = compute_metrics(&selection.geometry)?;

    info!(
        index = selection.index,
        area_ha = format!("{:.2}", metrics.area_ha),
        perimeter_m = format!("{:.2}", metrics.perimeter_m),
        "Polygon measured"
    );

    Ok(PipelineOutput {
        index: selection.index,
        warning: selection.warning,
        metrics,
        geometry: selection.geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use vecsource::SourceFormat;

    #[test]
    fn test_projected_geometry_rejects_empty() {
        let empty = Polygon::new(geo::LineString::new(Vec::new()), Vec::new());
        assert!(ProjectedGeometry::new(empty, PLANAR_EPSG).is_none());

        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        let geometry = ProjectedGeometry::new(square, PLANAR_EPSG).unwrap();
        assert_eq!(geometry.epsg(), 7761);
    }

    #[test]
    fn test_run_empty_dataset() {
        let dataset = VectorDataset {
            records: Vec::new(),
            source_epsg: 4326,
            format: SourceFormat::Kml,
        };
        assert!(matches!(
            run(&dataset, None),
            Err(PipelineError::NoPolygonFound)
        ));
    }
}
