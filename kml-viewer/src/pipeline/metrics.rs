//! Métriques d'un polygone projeté
//!
//! Surface, périmètre et centroïde sont calculés dans le plan, les points
//! affichés viennent d'une unique reprojection du même polygone en 4326.

use anyhow::Context;
use geo::{Area, Centroid, EuclideanLength, Geometry, LineString, Point, Polygon};
use serde::Serialize;

use super::{ProjectedGeometry, GEOGRAPHIC_EPSG};
use crate::error::geometry_type_name;
use crate::reproject_lite::SmartReprojector;
use crate::PipelineError;

/// Métriques d'affichage et d'export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryMetrics {
    /// Anneaux (lon, lat) fermés: extérieur puis intérieurs
    pub points: Vec<Vec<(f64, f64)>>,
    /// Centroïde (lon, lat)
    pub centroid: (f64, f64),
    pub area_ha: f64,
    pub perimeter_m: f64,
}

impl GeometryMetrics {
    /// Lignes du tableau affiché (métrique, valeur)
    pub fn display_rows(&self) -> [(&'static str, String); 3] {
        [
            (
                "Centroid",
                format!("({:.5}, {:.5})", self.centroid.0, self.centroid.1),
            ),
            ("Area (ha)", format!("{:.2} ha", self.area_ha)),
            ("Perimeter (m)", format!("{:.2} m", self.perimeter_m)),
        ]
    }

    /// Polygone (lon, lat) reconstruit à partir des anneaux affichés
    pub fn geographic_polygon(&self) -> Polygon<f64> {
        let mut rings = self
            .points
            .iter()
            .map(|ring| LineString::from(ring.clone()));
        let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
        Polygon::new(exterior, rings.collect())
    }

    /// Anneaux au format des coordonnées GeoJSON `[[[lon, lat], ...], ...]`
    pub fn points_json(&self) -> String {
        serde_json::to_string(&self.points).unwrap_or_default()
    }
}

/// Calcule les métriques d'un polygone projeté
pub fn compute_metrics(geometry: &ProjectedGeometry) -> Result<GeometryMetrics, PipelineError> {
    let polygon = geometry.polygon();

    let to_geographic = SmartReprojector::new(geometry.epsg(), GEOGRAPHIC_EPSG)
        .context("Geographic reprojector")
        .map_err(PipelineError::reprojection)?;

    let geographic = match to_geographic
        .transform_geometry(&Geometry::Polygon(polygon.clone()))
        .map_err(PipelineError::reprojection)?
    {
        Geometry::Polygon(p) => p,
        other => {
            return Err(PipelineError::Reprojection(format!(
                "Reprojection returned a {}",
                geometry_type_name(&other)
            )))
        }
    };

    let planar_centroid = polygon.centroid().ok_or(PipelineError::NoPolygonFound)?;
    let centroid = match to_geographic
        .transform_geometry(&Geometry::Point(planar_centroid))
        .map_err(PipelineError::reprojection)?
    {
        Geometry::Point(p) => (p.x(), p.y()),
        other => {
            return Err(PipelineError::Reprojection(format!(
                "Reprojection returned a {}",
                geometry_type_name(&other)
            )))
        }
    };

    Ok(GeometryMetrics {
        points: rings(&geographic),
        centroid,
        area_ha: polygon.unsigned_area() / 10_000.0,
        perimeter_m: perimeter(polygon),
    })
}

/// Longueur cumulée des anneaux extérieur et intérieurs
pub fn perimeter(polygon: &Polygon<f64>) -> f64 {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.euclidean_length())
        .sum()
}

fn rings(polygon: &Polygon<f64>) -> Vec<Vec<(f64, f64)>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.points().map(Point::x_y).collect())
        .collect()
}
