use std::sync::OnceLock;

use butler_core::error::{Error, Result};

use crate::engine::RetrievalEngine;

/// Shared slot for an engine that is built after the handle is handed out.
///
/// Until [`EngineHandle::initialize`] succeeds every query fails with
/// [`Error::EmptyCorpus`]. An initialized engine over an empty corpus answers
/// with empty results instead.
#[derive(Default)]
pub struct EngineHandle {
    engine: OnceLock<RetrievalEngine>,
}

impl EngineHandle {
    pub fn new() -> Self { Self::default() }

    pub fn initialize(&self, engine: RetrievalEngine) -> Result<()> {
        self.engine
            .set(engine)
            .map_err(|_| Error::Operation("retrieval engine is already initialized".into()))
    }

    pub fn is_ready(&self) -> bool { self.engine.get().is_some() }

    pub fn engine(&self) -> Result<&RetrievalEngine> { self.engine.get().ok_or(Error::EmptyCorpus) }

    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        self.engine()?.retrieve(query, top_k)
    }
}
