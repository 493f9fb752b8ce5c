//! Constantes de l'ellipsoïde WGS84

/// Ellipsoïde WGS84 (EPSG:7030)
pub struct WGS84;

impl WGS84 {
    /// Demi-grand axe en mètres
    pub const A: f64 = 6378137.0;

    /// Aplatissement
    pub const F: f64 = 1.0 / 298.257223563;

    /// Première excentricité au carré
    pub const E2: f64 = 2.0 * Self::F - Self::F * Self::F;

    /// Première excentricité
    pub const E: f64 = 0.0818191908426215; // sqrt(E2)

    /// Deuxième excentricité au carré
    pub const EP2: f64 = Self::E2 / (1.0 - Self::E2);
}
