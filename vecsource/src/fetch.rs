//! Téléchargement bloquant des sources distantes
//!
//! Pas de timeout par défaut: l'appel bloque jusqu'à la réponse de l'agent
//! HTTP, sauf si un timeout est fourni par l'appelant.

use std::io::Read;
use std::time::Duration;

use tracing::debug;

use crate::LoadError;

/// Client HTTP minimal (un agent `ureq` par lecteur)
#[derive(Debug, Clone)]
pub struct Fetcher {
    agent: ureq::Agent,
}

impl Fetcher {
    /// Crée un client, avec timeout global optionnel
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
        }
    }

    /// Télécharge le contenu complet d'une URL
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        debug!(url = url, "Fetching remote source");

        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| LoadError::unreachable(url, e))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| LoadError::unreachable(url, e))?;

        debug!(url = url, bytes = bytes.len(), "Remote source fetched");
        Ok(bytes)
    }

    /// Télécharge un fichier annexe (.dbf, .prj); `None` s'il est absent
    pub fn fetch_optional(&self, url: &str) -> Option<Vec<u8>> {
        match self.fetch(url) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(url = url, error = %e, "Optional sidecar not available");
                None
            }
        }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Remplace l'extension du chemin d'une URL (query et fragment conservés)
pub fn sibling_url(url: &str, extension: &str) -> Option<String> {
    let split_at = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(split_at);

    let dot = path.rfind('.')?;
    if path[dot..].contains('/') {
        return None;
    }

    Some(format!("{}.{}{}", &path[..dot], extension, suffix))
}

/// Extension du chemin d'une URL
pub fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let name = path.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}
