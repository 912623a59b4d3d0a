//! Knowledge corpus loader.
//!
//! A corpus is a flat directory of plain-text files, one document per file.
//! Subdirectories are not descended into.

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::{Corpus, Document};

/// Read every regular file directly under `dir` into a [`Corpus`].
///
/// Files are enumerated sorted by file name. Any unreadable or non-UTF-8 file
/// fails the whole load; no partial corpus is returned.
pub fn load_corpus(dir: &Path) -> Result<Corpus> {
    if !dir.is_dir() {
        return Err(corpus_error(dir, "directory does not exist"));
    }

    let mut documents = Vec::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| corpus_error(dir, e))?;
        if !entry.file_type().is_file() {
            debug!("Skipping non-file entry {}", entry.path().display());
            continue;
        }
        let path = entry.path();
        let bytes = fs::read(path).map_err(|e| corpus_error(path, e))?;
        let text = String::from_utf8(bytes).map_err(|_| corpus_error(path, "file is not valid UTF-8 text"))?;
        let id = entry.file_name().to_string_lossy().to_string();
        debug!("Loaded document {} ({} bytes)", id, text.len());
        documents.push(Document { id, text });
    }

    info!("Loaded {} documents from {}", documents.len(), dir.display());
    Ok(Corpus::new(documents))
}

fn corpus_error(path: &Path, reason: impl ToString) -> Error {
    Error::CorpusRead { path: path.to_path_buf(), reason: reason.to_string() }
}
