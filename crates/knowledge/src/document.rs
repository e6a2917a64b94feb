//! Document loading.
//!
//! A `DocumentStore` is the ordered list of documents read from the source
//! directory at startup. Positions in the store are the positions used by the
//! vector index, so the store is never mutated after it is loaded.

use concierge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// A loaded source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name the document was loaded from
    pub id: String,

    /// Raw file contents
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Ordered, immutable collection of documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    /// Load every eligible file directly under `dir`.
    ///
    /// Files are eligible when their extension (case-insensitive) is in
    /// `extensions`; an empty list accepts every regular file. Directories,
    /// ineligible files and non UTF-8 files are skipped. Documents are ordered
    /// by file name.
    ///
    /// # Errors
    /// * `AppError::Io` - If `dir` is missing, not a directory, or unreadable
    pub fn load(dir: &Path, extensions: &[String]) -> AppResult<Self> {
        let metadata = fs::metadata(dir)?;
        if !metadata.is_dir() {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{:?} is not a directory", dir),
            )));
        }
        // Surface permission errors on the directory itself
        fs::read_dir(dir)?;

        let mut documents = Vec::new();
        let mut skipped = 0usize;

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {:?}: {}", dir, e);
                    skipped += 1;
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !has_eligible_extension(path, extensions) {
                skipped += 1;
                continue;
            }

            // Lossy conversion could give two files the same id
            let Some(id) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!("Skipping file with non UTF-8 name: {:?}", path);
                skipped += 1;
                continue;
            };

            let bytes = fs::read(path)?;
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(_) => {
                    tracing::warn!("Skipping non UTF-8 file: {:?}", path);
                    skipped += 1;
                    continue;
                }
            };

            tracing::debug!("Loaded document '{}' ({} bytes)", id, content.len());
            documents.push(Document { id, content });
        }

        tracing::info!(
            "Loaded {} documents from {:?} ({} entries skipped)",
            documents.len(),
            dir,
            skipped
        );

        Ok(Self { documents })
    }

    /// Build a store from documents already in memory.
    ///
    /// # Errors
    /// * `AppError::InvalidArgument` - If two documents share an identifier
    pub fn from_documents(documents: Vec<Document>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for doc in &documents {
            if !seen.insert(doc.id.as_str()) {
                return Err(AppError::InvalidArgument(format!(
                    "Duplicate document identifier: '{}'",
                    doc.id
                )));
            }
        }
        Ok(Self { documents })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document at an index position.
    pub fn get(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Document contents in store order, ready for a single embedding batch.
    pub fn contents(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.content.clone()).collect()
    }
}

fn has_eligible_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext)),
        None => false,
    }
}
