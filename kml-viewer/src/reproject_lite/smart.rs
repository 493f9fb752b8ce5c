//! Reprojection intelligente: reproject_lite en priorité, fallback sur proj

use anyhow::{bail, Result};
use geo::Geometry;

use super::ReprojectorLite;

/// Reprojection choisie selon le couple source/cible
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(crate::export::reproject::Reprojector),
    /// Pas de reprojection (source == cible)
    Identity,
}

impl SmartReprojector {
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        if source_epsg == target_epsg {
            return Ok(Self::Identity);
        }

        if ReprojectorLite::is_supported(source_epsg, target_epsg) {
            return Ok(Self::Lite(ReprojectorLite::new(source_epsg, target_epsg)?));
        }

        #[cfg(feature = "reproject")]
        {
            let proj = crate::export::reproject::Reprojector::new(source_epsg, target_epsg)?;
            return Ok(Self::Proj(proj));
        }

        #[cfg(not(feature = "reproject"))]
        bail!(
            "Reprojection EPSG:{} -> EPSG:{} is not supported.\n\
             Built-in projections (reproject_lite):\n\
             - Sources: 4326, 3857, 7761 (Gujarat NSF LCC), 326xx/327xx (UTM WGS84)\n\
             - Targets: 4326, 7761\n\
             For other projections, build with: cargo build --features reproject",
            source_epsg,
            target_epsg
        );
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        match self {
            Self::Identity => Ok(geom.clone()),
            Self::Lite(lite) => lite.transform_geometry(geom),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_geometry(geom),
        }
    }

    /// Description du moteur utilisé (logs)
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}
