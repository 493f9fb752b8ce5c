//! Rapport d'exécution
//!
//! Collecte ce qui a été lu, le polygone retenu, les avertissements et
//! l'éventuelle erreur, pour l'affichage console et l'export JSON.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use vecsource::VectorDataset;

use crate::pipeline::{GeometryMetrics, PipelineOutput};

/// Statut global de l'exécution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Polygone mesuré sans avertissement
    Success,
    /// Polygone mesuré, avec des avertissements
    SuccessWithWarnings,
    /// Aucun polygone mesuré
    Failed,
}

/// Rapport complet d'une exécution
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Identifiant de la source (URL, nom de fichier ou chemin)
    pub source: String,
    pub duration_secs: f64,
    pub status: RunStatus,

    /// Format détecté
    pub format: Option<String>,
    /// CRS déclaré par la source
    pub source_epsg: Option<u32>,
    /// Nombre d'enregistrements lus
    pub records: usize,
    /// Index de l'enregistrement mesuré
    pub selected_index: Option<usize>,

    pub metrics: Option<GeometryMetrics>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            duration_secs: 0.0,
            status: RunStatus::Failed,
            format: None,
            source_epsg: None,
            records: 0,
            selected_index: None,
            metrics: None,
            warnings: Vec::new(),
            error: None,
        }
    }

    /// Enregistre le jeu de données lu
    pub fn record_dataset(&mut self, dataset: &VectorDataset) {
        self.format = Some(dataset.format.to_string());
        self.source_epsg = Some(dataset.source_epsg);
        self.records = dataset.len();
    }

    /// Enregistre le résultat du pipeline
    pub fn record_output(&mut self, output: &PipelineOutput) {
        self.selected_index = Some(output.index);
        self.metrics = Some(output.metrics.clone());
        if let Some(warning) = &output.warning {
            self.record_warning(warning);
        }
    }

    pub fn record_warning(&mut self, warning: &str) {
        self.warnings.push(warning.to_string());
    }

    pub fn record_error(&mut self, error: &anyhow::Error) {
        self.error = Some(format!("{:#}", error));
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = match (&self.error, &self.metrics) {
            (None, Some(_)) if self.warnings.is_empty() => RunStatus::Success,
            (None, Some(_)) => RunStatus::SuccessWithWarnings,
            _ => RunStatus::Failed,
        };
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        match (&self.metrics, &self.error) {
            (Some(metrics), _) => format!(
                "{}: record #{} of {}, {:.2} ha, {:.2} m",
                self.source,
                self.selected_index.unwrap_or_default(),
                self.records,
                metrics.area_ha,
                metrics.perimeter_m
            ),
            (None, Some(error)) => format!("{}: {}", self.source, error),
            (None, None) => format!("{}: no polygon measured", self.source),
        }
    }
}

/// Rapport détaillé pour la console (`--show-report`)
impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "RUN REPORT - {}", self.source)?;
        writeln!(f, "{}", rule)?;

        writeln!(f, "\nStatus: {:?}", self.status)?;
        writeln!(f, "Duration: {:.2}s", self.duration_secs)?;

        writeln!(f, "\n--- SOURCE ---")?;
        writeln!(f, "Format: {}", self.format.as_deref().unwrap_or("unknown"))?;
        if let Some(epsg) = self.source_epsg {
            writeln!(f, "CRS: EPSG:{}", epsg)?;
        }
        writeln!(f, "Records: {}", self.records)?;
        if let Some(index) = self.selected_index {
            writeln!(f, "Selected record: #{}", index)?;
        }

        if let Some(metrics) = &self.metrics {
            writeln!(f, "\n--- GEOMETRY METRICS ---")?;
            for (name, value) in metrics.display_rows() {
                writeln!(f, "  {:<14} {}", name, value)?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f, "\n--- WARNINGS ({}) ---", self.warnings.len())?;
            for w in &self.warnings {
                writeln!(f, "  {}", w)?;
            }
        }

        if let Some(error) = &self.error {
            writeln!(f, "\n--- ERROR ---")?;
            writeln!(f, "  {}", error)?;
        }

        write!(f, "{}", rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> GeometryMetrics {
        GeometryMetrics {
            points: vec![],
            centroid: (72.5, 23.0),
            area_ha: 1.5,
            perimeter_m: 500.0,
        }
    }

    #[test]
    fn test_new_report_is_failed() {
        let mut report = RunReport::new("plot.kml");
        report.finalize();
        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(report.summary(), "plot.kml: no polygon measured");
    }

    #[test]
    fn test_finalize_with_warnings() {
        let mut report = RunReport::new("plot.kml");
        report.metrics = Some(metrics());
        report.finalize();
        assert_eq!(report.status, RunStatus::Success);

        report.record_warning("several records");
        report.finalize();
        assert_eq!(report.status, RunStatus::SuccessWithWarnings);
    }

    #[test]
    fn test_record_error() {
        let mut report = RunReport::new("plot.kml");
        let err = anyhow::anyhow!("No polygon found inside KML").context("Processing failed");
        report.record_error(&err);
        report.finalize();

        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(
            report.error.as_deref(),
            Some("Processing failed: No polygon found inside KML")
        );
    }

    #[test]
    fn test_summary() {
        let mut report = RunReport::new("plot.kml");
        report.records = 3;
        report.selected_index = Some(2);
        report.metrics = Some(metrics());

        assert_eq!(report.summary(), "plot.kml: record #2 of 3, 1.50 ha, 500.00 m");
    }

    #[test]
    fn test_display_sections() {
        let mut report = RunReport::new("plot.kml");
        report.format = Some("KML".into());
        report.source_epsg = Some(4326);
        report.records = 3;
        report.selected_index = Some(2);
        report.metrics = Some(metrics());
        report.record_warning("several records");
        report.finalize();

        let text = report.to_string();
        assert!(text.contains("RUN REPORT - plot.kml"));
        assert!(text.contains("Status: SuccessWithWarnings"));
        assert!(text.contains("CRS: EPSG:4326"));
        assert!(text.contains("Selected record: #2"));
        assert!(text.contains("--- GEOMETRY METRICS ---"));
        assert!(text.contains("--- WARNINGS (1) ---"));
        assert!(!text.contains("--- ERROR ---"));
    }

    #[test]
    fn test_save_to_file() {
        let path = std::env::temp_dir().join(format!("kml_viewer_report_{}.json", std::process::id()));
        let mut report = RunReport::new("plot.kml");
        report.metrics = Some(metrics());
        report.finalize();
        report.save_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["status"], "Success");
        assert_eq!(json["metrics"]["area_ha"], 1.5);
        let _ = std::fs::remove_file(&path);
    }
}
