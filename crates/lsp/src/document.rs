//! Document state management for open files in the editor.

use std::collections::HashMap;
use std::path::PathBuf;

/// Tracks which documents are currently open in the editor.
pub struct DocumentState {
    documents: HashMap<String, DocumentInfo>,
}

/// Information about a single open document.
pub struct DocumentInfo {
    /// File system path for this document.
    pub path: PathBuf,
    /// Editor-reported version number.
    pub version: i32,
    /// Latest content from the editor. Linting always runs on this, never
    /// on the file on disk.
    pub content: String,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentState {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
        }
    }

    /// Track a newly opened document.
    pub fn open(&mut self, uri: &str, path: PathBuf, version: i32, content: String) {
        self.documents.insert(
            uri.to_owned(),
            DocumentInfo {
                path,
                version,
                content,
            },
        );
    }

    /// Update content for an already-open document. Stale versions are
    /// ignored; returns whether the content was replaced.
    pub fn change(&mut self, uri: &str, version: i32, content: String) -> bool {
        match self.documents.get_mut(uri) {
            Some(doc) if version >= doc.version => {
                doc.version = version;
                doc.content = content;
                true
            }
            _ => false,
        }
    }

    /// Remove a closed document from tracking.
    pub fn close(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    /// Get information about an open document.
    pub fn get(&self, uri: &str) -> Option<&DocumentInfo> {
        self.documents.get(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
