use tracing::debug;

use butler_core::error::{Error, Result};
use butler_core::traits::VectorIndex;
use butler_core::types::{Embedding, Neighbor};

/// Brute-force index scanning every stored vector with squared L2 distance.
///
/// Vectors are kept in one contiguous buffer; row `i` is the vector added at
/// position `i`.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self { Self { dim, data: Vec::new() } }

    /// Build an index of dimension `dim` holding `vectors` in order.
    pub fn from_vectors(dim: usize, vectors: &[Embedding]) -> Result<Self> {
        let mut index = Self::new(dim);
        index.add(vectors)?;
        Ok(index)
    }

    fn row(&self, position: usize) -> &[f32] { &self.data[position * self.dim..(position + 1) * self.dim] }

    fn check_dim(&self, actual: usize) -> Result<()> {
        if actual != self.dim { return Err(Error::DimensionMismatch { expected: self.dim, actual }); }
        Ok(())
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| { let d = x - y; d * d }).sum()
}

impl VectorIndex for FlatL2Index {
    fn dim(&self) -> usize { self.dim }

    fn len(&self) -> usize { if self.dim == 0 { 0 } else { self.data.len() / self.dim } }

    fn add(&mut self, vectors: &[Embedding]) -> Result<()> {
        // validate the whole batch first so a bad row leaves the index untouched
        for v in vectors { self.check_dim(v.len())?; }
        self.data.reserve(vectors.len() * self.dim);
        for v in vectors { self.data.extend_from_slice(v); }
        debug!("Added {} vectors (total {})", vectors.len(), self.len());
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dim(query.len())?;
        let k = k.min(self.len());
        if k == 0 { return Ok(Vec::new()); }
        let mut hits: Vec<Neighbor> = (0..self.len())
            .map(|position| Neighbor { distance: squared_l2(query, self.row(position)), position })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.position.cmp(&b.position)));
        hits.truncate(k);
        Ok(hits)
    }
}
