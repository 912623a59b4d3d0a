use crate::error::Result;
use crate::types::{Embedding, Neighbor};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    /// Output order matches input order, one vector per text.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>>;

    fn embed(&self, text: &str) -> anyhow::Result<Embedding> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

pub trait VectorIndex: Send + Sync {
    fn dim(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
    fn add(&mut self, vectors: &[Embedding]) -> Result<()>;
    /// At most `k` neighbors, closest first; equal distances keep position order.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}
