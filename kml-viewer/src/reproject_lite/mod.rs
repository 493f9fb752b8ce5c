//! Reprojection légère en Rust pur
//!
//! Sources supportées:
//! - WGS84 géographique (EPSG:4326)
//! - Web Mercator (EPSG:3857)
//! - WGS 84 / Gujarat NSF LCC (EPSG:7761)
//! - UTM WGS84 nord et sud (EPSG:326xx, 327xx)
//!
//! Cibles supportées: 4326, 7761.

mod ellipsoid;
mod lambert;
mod mercator;
mod smart;
mod utm;

pub use ellipsoid::WGS84;
pub use lambert::LambertConic;
pub use smart::SmartReprojector;

use anyhow::{bail, Result};
use geo::{Coord, Geometry, MapCoords};

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Reprojection point à point via les coordonnées géographiques WGS84
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source_epsg: u32,
    target_epsg: u32,
    lcc: LambertConic,
}

impl ReprojectorLite {
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        if !Self::is_supported_source(source_epsg) {
            bail!(
                "EPSG:{} not supported. Supported sources: 4326, 3857, 7761, 326xx, 327xx",
                source_epsg
            );
        }
        if !Self::is_supported_target(target_epsg) {
            bail!(
                "EPSG:{} not supported. Supported targets: 4326, 7761",
                target_epsg
            );
        }

        Ok(Self {
            source_epsg,
            target_epsg,
            lcc: LambertConic::gujarat_nsf(),
        })
    }

    pub fn is_supported_source(epsg: u32) -> bool {
        matches!(epsg, 4326 | 3857 | 7761) || utm::zone_from_epsg(epsg).is_some()
    }

    pub fn is_supported_target(epsg: u32) -> bool {
        matches!(epsg, 4326 | 7761)
    }

    pub fn is_supported(source: u32, target: u32) -> bool {
        Self::is_supported_source(source) && Self::is_supported_target(target)
    }

    /// Transforme un point (x, y) de la source vers la cible
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let geo = self.source_to_geographic(x, y)?;
        self.geographic_to_target(geo)
    }

    fn source_to_geographic(&self, x: f64, y: f64) -> Result<Geographic> {
        let geo = match self.source_epsg {
            4326 => Geographic::from_degrees(x, y),
            3857 => mercator::web_mercator_to_geographic(x, y),
            7761 => self.lcc.inverse(x, y),
            epsg => match utm::zone_from_epsg(epsg) {
                Some((zone, south)) => utm::utm_to_geographic(x, y, zone, south),
                None => bail!("EPSG:{} not supported", epsg),
            },
        };
        Ok(geo)
    }

    fn geographic_to_target(&self, geo: Geographic) -> Result<(f64, f64)> {
        match self.target_epsg {
            4326 => Ok(geo.to_degrees()),
            7761 => Ok(self.lcc.forward(geo)),
            epsg => bail!("EPSG:{} not supported", epsg),
        }
    }

    /// Transforme toutes les coordonnées d'une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        geom.try_map_coords(|c| {
            let (x, y) = self.transform_point(c.x, c.y)?;
            Ok::<_, anyhow::Error>(Coord { x, y })
        })
    }
}
