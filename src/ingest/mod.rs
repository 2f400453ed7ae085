
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::document::Document;
use crate::embeddings::{ChunkingConfig, Embedder, split_document};
use crate::store::InMemoryEmbeddingStore;

const DEFAULT_BATCH_SIZE: usize = 16;

/// Loads documents, splits them into segments and embeds every segment
pub struct Ingestor {
    chunking: ChunkingConfig,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    show_progress: bool,
}

impl Ingestor {
    #[inline]
    pub fn new(chunking: ChunkingConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            chunking,
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
            show_progress: console::user_attended_stderr(),
        }
    }

    /// Segments embedded per progress step
    #[inline]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[inline]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[inline]
    pub fn ingest_path(&self, path: &Path) -> Result<InMemoryEmbeddingStore> {
        let document = Document::load(path)
            .with_context(|| format!("Failed to load document {}", path.display()))?;
        self.ingest(&document)
    }

    /// Build a fresh store holding one entry per segment of `document`
    #[inline]
    pub fn ingest(&self, document: &Document) -> Result<InMemoryEmbeddingStore> {
        let started = Instant::now();
        let name = document.name();
        let segments = split_document(document, &self.chunking);
        let mut store = InMemoryEmbeddingStore::new();

        if segments.is_empty() {
            warn!("Document {} produced no segments", name);
            return Ok(store);
        }

        let bar = self.progress_bar(segments.len(), &name)?;
        for batch in segments.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|s| s.text.clone()).collect();
            let embeddings = self
                .embedder
                .embed_all(&texts)
                .with_context(|| format!("Failed to embed segments of {}", name))?;
            store.add_all(embeddings, batch.to_vec())?;
            bar.inc(batch.len() as u64);
        }
        bar.finish_and_clear();

        info!(
            "Ingested {} segments from {} in {:.2?}",
            store.len(),
            name,
            started.elapsed()
        );
        Ok(store)
    }

    fn progress_bar(&self, length: usize, name: &str) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }

        let style = ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding {msg}")
            .context("Invalid progress bar template")?;
        let bar = ProgressBar::new(length as u64).with_style(style);
        bar.set_message(name.to_string());
        Ok(bar)
    }
}
