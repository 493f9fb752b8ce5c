//! Projection Web Mercator (EPSG:3857), en source uniquement
//!
//! Modèle sphérique de rayon équatorial, utilisé par les fonds de carte tuilés.

use std::f64::consts::FRAC_PI_2;

use super::ellipsoid::WGS84;
use super::Geographic;

/// Web Mercator -> géographique
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Geographic {
    let r = WGS84::A;
    Geographic::new(x / r, 2.0 * (y / r).exp().atan() - FRAC_PI_2)
}
