use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use butler_core::config::Settings;
pub use butler_core::config::DEFAULT_TOP_K;
use butler_core::corpus::load_corpus;
use butler_core::error::{Error, Result};
use butler_core::traits::{Embedder, VectorIndex};
use butler_core::types::{Corpus, Embedding, RetrievedDocument};
use butler_embed::get_default_embedder;
use butler_vector::FlatL2Index;

/// Texts handed to the embedder per progress tick while building the index.
const BUILD_CHUNK: usize = 64;

/// Corpus, its embeddings and the embedder used for queries.
///
/// Position `i` in `corpus` is position `i` in `index`; both are fixed at
/// construction.
pub struct RetrievalEngine {
    embedder: Box<dyn Embedder>,
    index: FlatL2Index,
    corpus: Corpus,
}

impl RetrievalEngine {
    /// Load every document under `corpus_dir` and index it with `embedder`.
    pub fn construct(corpus_dir: &Path, embedder: Box<dyn Embedder>) -> Result<Self> {
        let corpus = load_corpus(corpus_dir)?;
        Self::from_corpus(corpus, embedder)
    }

    /// Build from configuration: knowledge directory plus the configured embedder.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let embedder = get_default_embedder(&settings.embedding)?;
        Ok(Self::construct(&settings.knowledge_dir, embedder)?)
    }

    pub fn from_corpus(corpus: Corpus, embedder: Box<dyn Embedder>) -> Result<Self> {
        let start = Instant::now();
        let embeddings = embed_corpus(embedder.as_ref(), &corpus)?;
        if embeddings.len() != corpus.len() {
            return Err(Error::Embedding(format!(
                "embedder returned {} vectors for {} documents",
                embeddings.len(),
                corpus.len()
            )));
        }
        let index = FlatL2Index::from_vectors(embedder.dim(), &embeddings)?;
        info!("Indexed {} documents (dim={}) in {:?}", index.len(), index.dim(), start.elapsed());
        Ok(Self { embedder, index, corpus })
    }

    /// Texts of the `top_k` documents closest to `query`, most similar first.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        Ok(self.retrieve_documents(query, top_k)?.into_iter().map(|d| d.text).collect())
    }

    /// Same ranking as [`Self::retrieve`], with ids and distances attached.
    pub fn retrieve_documents(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let k = top_k.min(self.corpus.len());
        if k == 0 { return Ok(Vec::new()); }
        let query_vec = self.embedder.embed(query).map_err(|e| Error::Embedding(e.to_string()))?;
        let hits = self.index.search(&query_vec, k)?;
        debug!("Query matched {} of {} documents", hits.len(), self.corpus.len());
        hits.into_iter()
            .map(|hit| {
                let doc = self.corpus.get(hit.position).ok_or_else(|| {
                    Error::Operation(format!("index position {} has no document", hit.position))
                })?;
                Ok(RetrievedDocument { id: doc.id.clone(), text: doc.text.clone(), distance: hit.distance })
            })
            .collect()
    }

    pub fn corpus(&self) -> &Corpus { &self.corpus }

    pub fn len(&self) -> usize { self.corpus.len() }

    pub fn is_empty(&self) -> bool { self.corpus.is_empty() }
}

fn embed_corpus(embedder: &dyn Embedder, corpus: &Corpus) -> Result<Vec<Embedding>> {
    let texts = corpus.texts();
    if texts.is_empty() { return Ok(Vec::new()); }

    let pb = ProgressBar::new(texts.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%)") {
        pb.set_style(style.progress_chars("#>-"));
    }
    let mut embeddings = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(BUILD_CHUNK) {
        let batch = embedder.embed_batch(chunk).map_err(|e| Error::Embedding(e.to_string()))?;
        embeddings.extend(batch);
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();
    Ok(embeddings)
}
