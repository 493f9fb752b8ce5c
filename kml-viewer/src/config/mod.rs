//! Configuration du visualiseur
//!
//! Fichier JSON optionnel, puis surcharge par variables d'environnement
//! (`.env` chargé au démarrage):
//!
//! - `KML_VIEWER_BASEMAP`: esri-satellite, google-hybrid, google-satellite
//! - `KML_VIEWER_MAP_HEIGHT`: hauteur de la carte en pixels
//! - `KML_VIEWER_HTTP_TIMEOUT_SECS`: timeout des téléchargements
//! - `KML_VIEWER_OUTPUT_DIR`: répertoire des pages et CSV générés

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::render::{Basemap, MapHeight, DEFAULT_MAP_HEIGHT};

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Fond de carte par défaut
    pub basemap: Basemap,

    /// Hauteur de la carte (px, 1..=10000)
    pub map_height: u32,

    /// Timeout HTTP en secondes (aucun si absent)
    pub http_timeout_secs: Option<u64>,

    /// Répertoire de sortie
    pub output_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            basemap: Basemap::default(),
            map_height: DEFAULT_MAP_HEIGHT,
            http_timeout_secs: None,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ViewerConfig {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Fichier optionnel + variables d'environnement
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Applique les variables `KML_VIEWER_*` du processus
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applique des surcharges lues par `lookup` (valeurs invalides ignorées)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("KML_VIEWER_BASEMAP") {
            match value.parse() {
                Ok(basemap) => self.basemap = basemap,
                Err(e) => warn!(error = %e, "Ignoring KML_VIEWER_BASEMAP"),
            }
        }
        if let Some(height) = lookup("KML_VIEWER_MAP_HEIGHT").and_then(|h| h.trim().parse().ok()) {
            self.map_height = height;
        }
        if let Some(secs) =
            lookup("KML_VIEWER_HTTP_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok())
        {
            self.http_timeout_secs = Some(secs);
        }
        if let Some(dir) = lookup("KML_VIEWER_OUTPUT_DIR").filter(|d| !d.trim().is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// Hauteur validée
    pub fn map_height(&self) -> Result<MapHeight> {
        MapHeight::new(self.map_height)
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}
