//! Rendu cartographique du polygone sélectionné
//!
//! `LeafletPage` produit une page HTML autonome: fond de carte tuilé, couche
//! GeoJSON (contour rouge, sans remplissage) centrée sur le polygone, tableau
//! des métriques et liens sortants.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use geo::Polygon;
use serde::{Deserialize, Serialize};
use vecsource::Attributes;

use crate::export::geojson::{layer_geojson, style_properties};
use crate::links::google_maps_url;
use crate::pipeline::GeometryMetrics;

/// Hauteur de carte par défaut (px)
pub const DEFAULT_MAP_HEIGHT: u32 = 600;
/// Hauteur maximale acceptée (px)
pub const MAX_MAP_HEIGHT: u32 = 10_000;

const LEAFLET_VERSION: &str = "1.9.4";

/// Fonds de carte disponibles
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Basemap {
    /// Esri World Imagery (Wayback 2024/10/10)
    #[default]
    EsriSatellite,
    /// Google hybride (avec les noms de lieux)
    GoogleHybrid,
    /// Google satellite
    GoogleSatellite,
}

impl Basemap {
    /// Gabarit d'URL des tuiles (`{x}`, `{y}`, `{z}`)
    pub fn tile_url(self) -> &'static str {
        match self {
            Self::EsriSatellite => "https://wayback.maptiles.arcgis.com/arcgis/rest/services/World_Imagery/WMTS/1.0.0/GoogleMapsCompatible/MapServer/tile/56450/{z}/{y}/{x}",
            Self::GoogleHybrid => "https://mt1.google.com/vt/lyrs=y&x={x}&y={y}&z={z}",
            Self::GoogleSatellite => "https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}",
        }
    }

    /// Titre affiché au-dessus de la carte
    pub fn heading(self) -> &'static str {
        match self {
            Self::EsriSatellite => "Esri - 2024/10/10",
            Self::GoogleHybrid => "Google Hybrid (displays place names)",
            Self::GoogleSatellite => "Google Satellite",
        }
    }

    pub fn attribution(self) -> &'static str {
        match self {
            Self::EsriSatellite => "Esri World Imagery Wayback",
            Self::GoogleHybrid | Self::GoogleSatellite => "Google",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::EsriSatellite => "esri-satellite",
            Self::GoogleHybrid => "google-hybrid",
            Self::GoogleSatellite => "google-satellite",
        }
    }
}

impl fmt::Display for Basemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Basemap {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "esri-satellite" | "esri" => Ok(Self::EsriSatellite),
            "google-hybrid" | "hybrid" => Ok(Self::GoogleHybrid),
            "google-satellite" | "satellite" => Ok(Self::GoogleSatellite),
            other => bail!(
                "Unknown basemap: {}. Use: esri-satellite, google-hybrid, google-satellite",
                other
            ),
        }
    }
}

/// Hauteur de carte en pixels, dans `1..=10000`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapHeight(u32);

impl MapHeight {
    pub fn new(px: u32) -> Result<Self> {
        if !(1..=MAX_MAP_HEIGHT).contains(&px) {
            bail!("Map height must be between 1 and {} px, got {}", MAX_MAP_HEIGHT, px);
        }
        Ok(Self(px))
    }

    pub fn px(self) -> u32 {
        self.0
    }
}

impl Default for MapHeight {
    fn default() -> Self {
        Self(DEFAULT_MAP_HEIGHT)
    }
}

/// Entrée du rendu: un polygone en coordonnées géographiques
#[derive(Debug, Clone, Copy)]
pub struct MapView<'a> {
    pub polygon: &'a Polygon<f64>,
    pub attributes: &'a Attributes,
    pub basemap: Basemap,
    pub height: MapHeight,
}

/// Moteur de rendu cartographique
pub trait MapRenderer {
    fn render(&self, view: &MapView<'_>) -> Result<String>;
}

/// Page HTML Leaflet autonome
#[derive(Debug, Clone, Default)]
pub struct LeafletPage<'a> {
    pub title: &'a str,
    pub warning: Option<&'a str>,
    pub metrics: Option<&'a GeometryMetrics>,
    /// Nom du fichier CSV proposé au téléchargement (relatif à la page)
    pub csv_file: Option<&'a str>,
    pub ndvi_link: Option<&'a str>,
}

impl MapRenderer for LeafletPage<'_> {
    fn render(&self, view: &MapView<'_>) -> Result<String> {
        let layer = layer_geojson(view.polygon, view.attributes)?;
        let style = serde_json::to_string(&style_properties())?;
        let title = escape_html(if self.title.is_empty() {
            "KML Viewer"
        } else {
            self.title
        });

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", title));
        html.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@{v}/dist/leaflet.css\">\n\
             <script src=\"https://unpkg.com/leaflet@{v}/dist/leaflet.js\"></script>\n",
            v = LEAFLET_VERSION
        ));
        html.push_str(
            "<style>\n\
             body { font-family: sans-serif; margin: 0 2em; }\n\
             .center { display: flex; justify-content: center; text-align: center; }\n\
             .warning { background: #fff3cd; padding: 0.5em 1em; margin: 1em 0; }\n\
             table { border-collapse: collapse; }\n\
             th, td { border: 1px solid #ccc; padding: 0.3em 0.8em; }\n\
             </style>\n</head>\n<body>\n",
        );

        html.push_str(&format!("<h1 style=\"text-align: center;\">{}</h1>\n", title));
        if let Some(warning) = self.warning {
            html.push_str(&format!("<div class=\"warning\">{}</div>\n", escape_html(warning)));
        }

        html.push_str(&format!(
            "<h4><div style=\"text-align: center;\">{}</div></h4>\n",
            view.basemap.heading()
        ));
        html.push_str(&format!(
            "<div id=\"map\" style=\"height: {}px;\"></div>\n",
            view.height.px()
        ));

        if let Some(metrics) = self.metrics {
            html.push_str(&metrics_table(metrics));
        }
        if let Some(csv_file) = self.csv_file {
            html.push_str(&format!(
                "<div class=\"center\"><a href=\"{}\" download><button>Download Geometry Metrics</button></a></div>\n",
                escape_html(csv_file)
            ));
        }
        if let Some(link) = self.ndvi_link {
            html.push_str(&format!(
                "<div class=\"center\"><a href=\"{}\" target=\"_blank\"><button style=\"background-color: #006400; color: white; padding: 10px 20px; font-size: 16px; border: none; border-radius: 5px;\">Click for NDVI Timeseries</button></a></div>\n",
                escape_html(link)
            ));
        }

        html.push_str("<script>\n");
        html.push_str("var map = L.map('map');\n");
        html.push_str(&format!(
            "L.tileLayer({}, {{ maxZoom: 21, attribution: {} }}).addTo(map);\n",
            script_json(view.basemap.tile_url())?,
            script_json(view.basemap.attribution())?
        ));
        html.push_str(&format!(
            "var layer = L.geoJSON({}, {{ style: function () {{ return {}; }} }}).addTo(map);\n",
            layer.replace("</", "<\\/"),
            style
        ));
        html.push_str("map.fitBounds(layer.getBounds());\n");
        html.push_str("</script>\n</body>\n</html>\n");

        Ok(html)
    }
}

fn metrics_table(metrics: &GeometryMetrics) -> String {
    let mut table = String::from(
        "<h3><div style=\"text-align: center;\">Geometry Metrics</div></h3>\n\
         <div class=\"center\">\n<table>\n<tr><th>Metric</th><th>Value</th></tr>\n",
    );

    for (name, value) in metrics.display_rows() {
        let link = if name == "Centroid" {
            format!(
                " <a href=\"{}\" target=\"_blank\"><button>View on Google Maps</button></a>",
                escape_html(&google_maps_url(metrics.centroid))
            )
        } else {
            String::new()
        };
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}{}</td></tr>\n",
            name,
            escape_html(&value),
            link
        ));
    }

    table.push_str("</table>\n</div>\n");
    table
}

/// Chaîne JSON utilisable dans un `<script>`
fn script_json(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Échappe le texte pour HTML
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}
