//! Export CSV des métriques (tableau transposé, une ligne par métrique)
//!
//! ```text
//! ,0
//! Points,"[[[72.5,23.0],...]]"
//! Centroid,POINT(72.50 23.00)
//! Area (ha),1.13
//! Perimeter (m),426.2
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geo::{Geometry, Point};
use geozero::ToWkt;
use tracing::info;

use crate::pipeline::GeometryMetrics;

/// Suffixe du fichier exporté
pub const CSV_SUFFIX: &str = "_metrics.csv";

/// Sérialise les métriques en CSV
pub fn metrics_csv(metrics: &GeometryMetrics) -> Result<String> {
    let (lon, lat) = metrics.centroid;
    let centroid = Geometry::Point(Point::new(lon, lat))
        .to_wkt()
        .context("Failed to write centroid WKT")?;

    let rows = [
        ("Points", metrics.points_json()),
        ("Centroid", centroid),
        ("Area (ha)", metrics.area_ha.to_string()),
        ("Perimeter (m)", metrics.perimeter_m.to_string()),
    ];

    let mut csv = String::from(",0\n");
    for (name, value) in &rows {
        push_csv_field(&mut csv, name);
        csv.push(',');
        push_csv_field(&mut csv, value);
        csv.push('\n');
    }
    Ok(csv)
}

/// Ajoute un champ, entre guillemets seulement si nécessaire
fn push_csv_field(buf: &mut String, value: &str) {
    if !value.contains([',', '"', '\n', '\r']) {
        buf.push_str(value);
        return;
    }

    buf.push('"');
    for c in value.chars() {
        match c {
            '"' => buf.push_str("\"\""),
            c => buf.push(c),
        }
    }
    buf.push('"');
}

/// Dernier segment de l'identifiant, rendu sûr pour le disque
pub fn output_stem(identifier: &str) -> String {
    let name = identifier
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("source");

    name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Nom du fichier CSV pour une source
pub fn csv_file_name(identifier: &str) -> String {
    format!("{}{}", output_stem(identifier), CSV_SUFFIX)
}

/// Écrit le CSV dans `dir` et retourne son chemin
pub fn write_metrics_csv(
    metrics: &GeometryMetrics,
    identifier: &str,
    dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(csv_file_name(identifier));
    std::fs::write(&path, metrics_csv(metrics)?)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    info!(path = %path.display(), "Metrics CSV written");
    Ok(path)
}
