//! Reprojection de géométries avec PROJ
//!
//! Disponible uniquement avec la feature `reproject` (libproj système).

use anyhow::{Context, Result};
use geo::{Coord, Geometry, LineString, MapCoords, MultiPolygon, Polygon};
use proj::Proj;

/// Reprojection entre deux codes EPSG quelconques
pub struct Reprojector {
    proj: Proj,
    source_epsg: u32,
    target_epsg: u32,
}

impl Reprojector {
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        let source = format!("EPSG:{}", source_epsg);
        let target = format!("EPSG:{}", target_epsg);

        let proj = Proj::new_known_crs(&source, &target, None)
            .with_context(|| format!("Failed to create projection from {} to {}", source, target))?;

        Ok(Self {
            proj,
            source_epsg,
            target_epsg,
        })
    }

    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    /// Transforme une géométrie (anneaux convertis par lot)
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        match geom {
            Geometry::Polygon(p) => Ok(Geometry::Polygon(self.transform_polygon(p)?)),
            Geometry::MultiPolygon(mp) => {
                let polys = mp
                    .0
                    .iter()
                    .map(|p| self.transform_polygon(p))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polys)))
            }
            other => other.try_map_coords(|c| {
                let (x, y) = self
                    .proj
                    .convert((c.x, c.y))
                    .context("Coordinate transformation failed")?;
                Ok::<_, anyhow::Error>(Coord { x, y })
            }),
        }
    }

    fn transform_linestring(&self, ls: &LineString) -> Result<LineString> {
        let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

        self.proj
            .convert_array(&mut coords)
            .context("Batch coordinate transformation failed")?;

        Ok(LineString::new(
            coords.into_iter().map(|(x, y)| Coord { x, y }).collect(),
        ))
    }

    fn transform_polygon(&self, p: &Polygon) -> Result<Polygon> {
        let exterior = self.transform_linestring(p.exterior())?;
        let interiors = p
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(exterior, interiors))
    }
}
