//! Identification des sources (URL, fichier téléversé, chemin local)
//!
//! Les liens de partage Google Drive sont réécrits en lien de
//! téléchargement direct avant toute lecture.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// Gabarit de téléchargement direct Google Drive
pub const DRIVE_DOWNLOAD_PREFIX: &str = "https://drive.google.com/uc?id=";

/// Source d'un jeu de données vecteur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// URL distante (http/https)
    Url(String),
    /// Fichier téléversé (nom + contenu)
    Upload(UploadedFile),
    /// Fichier local
    Path(PathBuf),
}

/// Fichier téléversé par l'utilisateur
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Empreinte blake3 du contenu (hex)
    pub fn digest(&self) -> String {
        hex::encode(blake3::hash(&self.bytes).as_bytes())
    }

    /// Extension du nom de fichier
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }
}

/// Clé de cache d'une source (identifiant normalisé)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Url(String),
    Upload { name: String, digest: String },
    Path(PathBuf),
}

impl Source {
    /// Interprète un argument utilisateur: URL si schéma http(s), sinon chemin
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// Retourne la source avec les liens Drive réécrits
    pub fn normalized(&self) -> Self {
        match self {
            Self::Url(url) => Self::Url(normalize_drive_url(url)),
            other => other.clone(),
        }
    }

    /// Clé de cache de la source normalisée
    pub fn key(&self) -> SourceKey {
        match self.normalized() {
            Self::Url(url) => SourceKey::Url(url),
            Self::Upload(file) => SourceKey::Upload {
                digest: file.digest(),
                name: file.name,
            },
            Self::Path(path) => SourceKey::Path(path),
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// URL normalisée, si la source est distante
    pub fn url(&self) -> Option<String> {
        match self.normalized() {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    /// Identifiant lisible (URL normalisée, nom de fichier ou chemin)
    pub fn identifier(&self) -> String {
        match self.normalized() {
            Self::Url(url) => url,
            Self::Upload(file) => file.name,
            Self::Path(path) => path.display().to_string(),
        }
    }
}

fn drive_file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://drive\.google\.com/file/d/([^/?#]+)").expect("valid regex")
    })
}

fn drive_open_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://drive\.google\.com/open\?id=([^&#]+)").expect("valid regex")
    })
}

/// Réécrit un lien de partage Drive en lien de téléchargement direct
///
/// Formes reconnues:
/// - `https://drive.google.com/file/d/<ID>/view...`
/// - `https://drive.google.com/open?id=<ID>`
///
/// Toute autre URL est retournée inchangée.
pub fn normalize_drive_url(url: &str) -> String {
    let id = drive_file_pattern()
        .captures(url)
        .or_else(|| drive_open_pattern().captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    match id {
        Some(id) => format!("{}{}", DRIVE_DOWNLOAD_PREFIX, id),
        None => url.to_string(),
    }
}
