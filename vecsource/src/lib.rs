//! # vecsource
//!
//! Lecture de sources vecteur hétérogènes (KML, GeoJSON, Shapefile) en un
//! jeu de données unique, avant projection et sélection d'un polygone.
//!
//! ## Features
//!
//! - Sources: URL (liens Google Drive normalisés), fichier téléversé, chemin local
//! - Détection du format par extension puis par contenu
//! - Shapefile avec annexes `.dbf` (attributs) et `.prj` (CRS)
//! - Réparation: suppression du Z, buffer de distance nulle
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vecsource::{read, Source};
//!
//! let source = Source::from_arg("https://drive.google.com/file/d/ABC123/view");
//! let dataset = read(&source)?;
//! println!("{} records in EPSG:{}", dataset.len(), dataset.source_epsg);
//! ```

pub mod error;
pub mod fetch;
pub mod reader;
pub mod repair;
pub mod source;
pub mod types;

pub use error::LoadError;
pub use reader::SourceReader;
pub use source::{normalize_drive_url, Source, SourceKey, UploadedFile};
pub use types::{
    AttributeValue, Attributes, CalendarDate, Record, SourceFormat, VectorDataset, WGS84_EPSG,
};

/// Lit une source avec un lecteur par défaut (sans timeout HTTP)
pub fn read(source: &Source) -> Result<VectorDataset, LoadError> {
    SourceReader::default().read(source)
}
