//! Modules d'export (CSV des métriques, couche GeoJSON, PROJ)

pub mod csv;
pub mod geojson;
#[cfg(feature = "reproject")]
pub mod reproject;

pub use self::csv::{csv_file_name, metrics_csv, output_stem, write_metrics_csv};
pub use self::geojson::{export_layer, layer_geojson};
