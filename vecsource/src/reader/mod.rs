//! Chargement d'une source en jeu de données vecteur
//!
//! Le format est déterminé par l'extension (URL, nom téléversé ou chemin),
//! puis par le contenu si l'extension est absente ou inconnue (liens Drive).

pub mod crs;
pub mod geojson_file;
pub mod kml_file;
pub mod shapefile_bundle;

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::fetch::{self, Fetcher};
use crate::source::{Source, UploadedFile};
use crate::types::{SourceFormat, VectorDataset};
use crate::LoadError;

pub use shapefile_bundle::ShapefileBundle;

/// Lecteur de sources (locales, téléversées ou distantes)
#[derive(Debug, Clone, Default)]
pub struct SourceReader {
    fetcher: Fetcher,
}

impl SourceReader {
    /// Crée un lecteur, avec timeout HTTP optionnel
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            fetcher: Fetcher::new(timeout),
        }
    }

    /// Lit une source et retourne son jeu de données
    ///
    /// Les liens Drive sont normalisés avant téléchargement.
    pub fn read(&self, source: &Source) -> Result<VectorDataset, LoadError> {
        let dataset = match source.normalized() {
            Source::Url(url) => self.read_url(&url)?,
            Source::Upload(file) => read_upload(&file)?,
            Source::Path(path) => read_path(&path)?,
        };

        info!(
            source = %source.identifier(),
            format = %dataset.format,
            records = dataset.len(),
            epsg = dataset.source_epsg,
            "Source loaded"
        );

        Ok(dataset)
    }

    fn read_url(&self, url: &str) -> Result<VectorDataset, LoadError> {
        let bytes = self.fetcher.fetch(url)?;
        let format = detect_format(fetch::url_extension(url), &bytes)?;

        if format != SourceFormat::Shapefile {
            return read_bytes(format, &bytes);
        }

        // Annexes .dbf/.prj téléchargées à côté du .shp
        let (dbf, prj) = match fetch::sibling_url(url, "dbf").zip(fetch::sibling_url(url, "prj")) {
            Some((dbf_url, prj_url)) => (
                self.fetcher.fetch_optional(&dbf_url),
                self.fetcher.fetch_optional(&prj_url).map(lossy_text),
            ),
            None => (None, None),
        };

        shapefile_bundle::read(ShapefileBundle {
            shp: bytes,
            dbf,
            prj,
        })
    }
}

fn read_upload(file: &UploadedFile) -> Result<VectorDataset, LoadError> {
    let format = detect_format(file.extension(), &file.bytes)?;
    read_bytes(format, &file.bytes)
}

fn read_path(path: &Path) -> Result<VectorDataset, LoadError> {
    let bytes = std::fs::read(path)?;
    let extension = path.extension().and_then(|e| e.to_str());
    let format = detect_format(extension, &bytes)?;

    if format != SourceFormat::Shapefile {
        return read_bytes(format, &bytes);
    }

    let dbf = read_sidecar(path, "dbf");
    let prj = read_sidecar(path, "prj").map(lossy_text);

    shapefile_bundle::read(ShapefileBundle {
        shp: bytes,
        dbf,
        prj,
    })
}

/// Lit un fichier annexe (même nom, autre extension), minuscule puis majuscule
fn read_sidecar(path: &Path, extension: &str) -> Option<Vec<u8>> {
    [extension.to_string(), extension.to_ascii_uppercase()]
        .iter()
        .map(|ext| path.with_extension(ext))
        .find_map(|candidate| match std::fs::read(&candidate) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(path = %candidate.display(), error = %e, "Sidecar not readable");
                None
            }
        })
}

fn lossy_text(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse un contenu dont le format est connu
///
/// Un shapefile lu ainsi n'a ni attributs ni CRS déclaré.
pub fn read_bytes(format: SourceFormat, bytes: &[u8]) -> Result<VectorDataset, LoadError> {
    match format {
        SourceFormat::Kml => kml_file::read(bytes),
        SourceFormat::GeoJson => geojson_file::read(bytes),
        SourceFormat::Shapefile => shapefile_bundle::read(ShapefileBundle {
            shp: bytes.to_vec(),
            ..Default::default()
        }),
    }
}

/// Détermine le format: extension d'abord, contenu ensuite
pub fn detect_format(extension: Option<&str>, bytes: &[u8]) -> Result<SourceFormat, LoadError> {
    if let Some(format) = extension.and_then(SourceFormat::from_extension) {
        return Ok(format);
    }

    SourceFormat::sniff(bytes).ok_or_else(|| {
        LoadError::UnsupportedFormat(match extension {
            Some(ext) => format!(".{}", ext),
            None => "unknown content".to_string(),
        })
    })
}
