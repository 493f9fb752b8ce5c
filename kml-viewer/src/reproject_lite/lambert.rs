//! Projection conique conforme de Lambert à deux parallèles (LCC 2SP)
//!
//! Utilisée pour le plan de référence métrique:
//! EPSG:7761 - WGS 84 / Gujarat NSF LCC.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::ellipsoid::WGS84;
use super::Geographic;

/// Paramètres et constantes dérivées d'une projection LCC 2SP sur WGS84
#[derive(Debug, Clone, Copy)]
pub struct LambertConic {
    /// Longitude origine (radians)
    lon0: f64,
    /// False easting
    x0: f64,
    /// False northing
    y0: f64,
    /// Exposant de la projection
    n: f64,
    /// Constante C
    c: f64,
    /// Rayon à la latitude origine
    r0: f64,
}

impl LambertConic {
    /// Construit la projection depuis ses paramètres en degrés
    pub fn new(lon0: f64, lat0: f64, lat1: f64, lat2: f64, x0: f64, y0: f64) -> Self {
        let e = WGS84::E;
        let (lat0, lat1, lat2) = (lat0.to_radians(), lat1.to_radians(), lat2.to_radians());

        let n1 = grande_normale(lat1);
        let n2 = grande_normale(lat2);
        let iso_lat1 = isometric_latitude(lat1, e);
        let iso_lat2 = isometric_latitude(lat2, e);

        let n = ((n1 * lat1.cos()).ln() - (n2 * lat2.cos()).ln()) / (iso_lat2 - iso_lat1);
        let c = (n1 * lat1.cos() / n) * (n * iso_lat1).exp();
        let r0 = c * (-n * isometric_latitude(lat0, e)).exp();

        Self {
            lon0: lon0.to_radians(),
            x0,
            y0,
            n,
            c,
            r0,
        }
    }

    /// EPSG:7761 - WGS 84 / Gujarat NSF LCC
    pub fn gujarat_nsf() -> Self {
        Self::new(71.0, 22.0, 20.1, 23.9, 1_000_000.0, 1_000_000.0)
    }

    /// Géographique -> plan
    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let r = self.c * (-self.n * isometric_latitude(geo.lat, WGS84::E)).exp();
        let theta = self.n * (geo.lon - self.lon0);

        (
            self.x0 + r * theta.sin(),
            self.y0 + self.r0 - r * theta.cos(),
        )
    }

    /// Plan -> géographique
    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        let dx = x - self.x0;
        let dy = y - self.y0;

        let r = (dx.powi(2) + (self.r0 - dy).powi(2)).sqrt();
        let r = if self.n < 0.0 { -r } else { r };
        let gamma = (dx / (self.r0 - dy)).atan();

        let iso_lat = -(r / self.c).ln() / self.n;

        Geographic::new(
            self.lon0 + gamma / self.n,
            latitude_from_isometric(iso_lat, WGS84::E),
        )
    }
}

/// Latitude isométrique
fn isometric_latitude(lat: f64, e: f64) -> f64 {
    let sin_lat = lat.sin();
    let term = ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).powf(e / 2.0);
    ((FRAC_PI_4 + lat / 2.0).tan() * term).ln()
}

/// Latitude depuis la latitude isométrique (itératif)
fn latitude_from_isometric(iso_lat: f64, e: f64) -> f64 {
    let mut lat = 2.0 * iso_lat.exp().atan() - FRAC_PI_2;

    for _ in 0..10 {
        let sin_lat = lat.sin();
        let term = ((1.0 + e * sin_lat) / (1.0 - e * sin_lat)).powf(e / 2.0);
        let new_lat = 2.0 * (iso_lat.exp() * term).atan() - FRAC_PI_2;

        if (new_lat - lat).abs() < 1e-12 {
            return new_lat;
        }
        lat = new_lat;
    }
    lat
}

/// Grande normale à la latitude donnée
fn grande_normale(lat: f64) -> f64 {
    WGS84::A / (1.0 - WGS84::E2 * lat.sin().powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_false_origin() {
        let lcc = LambertConic::gujarat_nsf();
        let (x, y) = lcc.forward(Geographic::from_degrees(71.0, 22.0));

        assert!((x - 1_000_000.0).abs() < 1e-6, "x={}", x);
        assert!((y - 1_000_000.0).abs() < 1e-6, "y={}", y);
    }

    #[test]
    fn test_one_degree_east() {
        // 1° de longitude à 22°N ≈ 103 km
        let lcc = LambertConic::gujarat_nsf();
        let (x, y) = lcc.forward(Geographic::from_degrees(72.0, 22.0));

        assert!((x - 1_000_000.0 - 103_300.0).abs() < 1_500.0, "x={}", x);
        assert!(y > 1_000_000.0, "y={}", y);
    }

    #[test]
    fn test_roundtrip_ahmedabad() {
        let lcc = LambertConic::gujarat_nsf();
        let (x, y) = lcc.forward(Geographic::from_degrees(72.5714, 23.0225));
        let (lon, lat) = lcc.inverse(x, y).to_degrees();

        assert!((lon - 72.5714).abs() < 1e-9, "lon={}", lon);
        assert!((lat - 23.0225).abs() < 1e-9, "lat={}", lat);
    }
}
