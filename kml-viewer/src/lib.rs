//! # kml-viewer
//!
//! Visualisation et mesure du premier polygone d'une source vecteur
//! (KML, GeoJSON, Shapefile), locale ou distante.
//!
//! ## Features
//!
//! - Lecture par `vecsource`, liens Google Drive normalisés
//! - Reprojection dans le plan EPSG:7761 (Gujarat NSF LCC) en Rust pur,
//!   PROJ en option (feature `reproject`)
//! - Surface, périmètre et centroïde du premier polygone
//! - Page Leaflet autonome, CSV des métriques, couche GeoJSON
//!
//! ## Usage CLI
//!
//! ```bash
//! # Page HTML + CSV dans ./output
//! kml-viewer view ./farm.kml --basemap google-hybrid
//! kml-viewer view "https://drive.google.com/file/d/<ID>/view" --height 800
//!
//! # Métriques seules
//! kml-viewer metrics ./farm.geojson --csv --show-report
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod links;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod reproject_lite;
pub mod session;

pub use config::ViewerConfig;
pub use error::PipelineError;
pub use pipeline::{
    compute_metrics, preprocess, run, select_first_valid_polygon, GeometryMetrics,
    PipelineOutput, ProjectedGeometry, GEOGRAPHIC_EPSG, PLANAR_EPSG,
};
pub use render::{Basemap, LeafletPage, MapHeight, MapRenderer, MapView};
pub use report::{RunReport, RunStatus};
pub use session::{DatasetReader, Session};
