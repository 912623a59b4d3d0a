//! Domain types shared by the loader, the vector index and the retrieval engine.

use serde::{Deserialize, Serialize};

pub type DocumentId = String;
pub type Embedding = Vec<f32>;

/// A single knowledge document.
///
/// - `id`: the file name the text was read from
/// - `text`: the full file contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub text: String,
}

/// Ordered documents. Position `i` here is position `i` in the vector index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self { Self { documents } }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn get(&self, position: usize) -> Option<&Document> { self.documents.get(position) }

    pub fn documents(&self) -> &[Document] { &self.documents }

    pub fn texts(&self) -> Vec<String> { self.documents.iter().map(|d| d.text.clone()).collect() }
}

/// One k-NN result. `distance` is squared L2; lower is closer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub distance: f32,
    pub position: usize,
}

/// A ranked document as handed back by the retrieval engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: DocumentId,
    pub text: String,
    pub distance: f32,
}
