//! Nettoyage des géométries brutes avant projection
//!
//! - `flatten`: suppression de l'ordonnée Z
//! - `convert`: valeurs GeoJSON -> types `geo`
//! - `buffer`: buffer de distance nulle (auto-union des surfaces)

pub mod buffer;
pub mod convert;
pub mod flatten;

pub use buffer::buffer_zero;
pub use convert::to_geo;
pub use flatten::{drop_z, has_z};
