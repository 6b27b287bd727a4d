//! Document metadata capability.
//!
//! The rename engine only needs "open path → metadata mapping, or failure".
//! `MetadataReader` is that seam; `LopdfReader` is the real implementation and
//! tests substitute an in-memory fake.

mod lopdf_reader;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use lopdf_reader::LopdfReader;

#[derive(Debug, Error)]
pub enum MetadataError {
    /// The document could not be opened or parsed.
    #[error("cannot read PDF {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    /// Any other reader failure (used by alternative readers).
    #[error("cannot read PDF {path}: {message}")]
    Other { path: PathBuf, message: String },
}

/// Document information dictionary, as decoded strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    entries: BTreeMap<String, String>,
}

impl DocumentInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        let mut info = Self::new();
        info.insert("Title", title);
        info
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The `/Title` entry, if present.
    pub fn title(&self) -> Option<&str> {
        self.get("Title")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads document metadata. Implementations must release every handle on the
/// file before returning, so the caller may rename it right after.
pub trait MetadataReader {
    /// `Ok(None)` when the document carries no information dictionary.
    fn read_info(&self, path: &Path) -> Result<Option<DocumentInfo>, MetadataError>;
}

impl<R: MetadataReader + ?Sized> MetadataReader for &R {
    fn read_info(&self, path: &Path) -> Result<Option<DocumentInfo>, MetadataError> {
        (**self).read_info(path)
    }
}
