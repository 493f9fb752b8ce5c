//! Session utilisateur: cache du dernier jeu de données chargé
//!
//! Une seule entrée, indexée par la clé normalisée de la source. Une clé
//! différente remplace l'entrée. Le cache appartient à la session, il n'y a
//! aucun état global.

use std::sync::Arc;

use tracing::debug;
use vecsource::{LoadError, Source, SourceKey, SourceReader, VectorDataset};

use crate::pipeline::{self, PipelineOutput};
use crate::PipelineError;

/// Lecteur de fichiers vecteur utilisé par la session
pub trait DatasetReader {
    fn read(&self, source: &Source) -> Result<VectorDataset, LoadError>;
}

impl DatasetReader for SourceReader {
    fn read(&self, source: &Source) -> Result<VectorDataset, LoadError> {
        SourceReader::read(self, source)
    }
}

/// Session de visualisation
pub struct Session<R: DatasetReader = SourceReader> {
    reader: R,
    cached: Option<(SourceKey, Arc<VectorDataset>)>,
}

impl<R: DatasetReader> Session<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            cached: None,
        }
    }

    /// Charge une source (ou la retourne depuis le cache)
    ///
    /// Un jeu de données vide est rejeté avec `NoPolygonFound` et n'est pas
    /// mis en cache.
    pub fn load(&mut self, source: &Source) -> Result<Arc<VectorDataset>, PipelineError> {
        let key = source.key();

        if let Some((cached_key, dataset)) = &self.cached {
            if *cached_key == key {
                debug!(source = %source.identifier(), "Using cached dataset");
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = self.reader.read(source)?;
        if dataset.is_empty() {
            return Err(PipelineError::NoPolygonFound);
        }

        let dataset = Arc::new(dataset);
        self.cached = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Charge puis exécute le pipeline complet
    pub fn process(
        &mut self,
        source: &Source,
        index: Option<usize>,
    ) -> Result<(Arc<VectorDataset>, PipelineOutput), PipelineError> {
        let dataset = self.load(source)?;
        let output = pipeline::run(&dataset, index)?;
        Ok((dataset, output))
    }

    /// Vide le cache
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Clé de la source actuellement en cache
    pub fn cached_key(&self) -> Option<&SourceKey> {
        self.cached.as_ref().map(|(key, _)| key)
    }
}

impl Default for Session<SourceReader> {
    fn default() -> Self {
        Self::new(SourceReader::default())
    }
}
