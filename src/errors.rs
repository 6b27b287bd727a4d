//! Typed error definitions for pdf_tidy.
//! Covers the fatal preconditions that abort a run before any mutation.
//! Per-file conditions are reported as `SkipReason`s instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfTidyError {
    #[error("Directory does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Insufficient permissions for {path}: {context}")]
    PermissionDenied { path: PathBuf, context: String },

    #[error("Backup directory resolves to the source directory itself: {0}")]
    SameDirectory(PathBuf),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl PdfTidyError {
    /// Stable numeric code for structured logs.
    pub fn code(&self) -> u16 {
        match self {
            PdfTidyError::RootNotFound(_) => 10,
            PdfTidyError::NotADirectory(_) => 11,
            PdfTidyError::PermissionDenied { .. } => 12,
            PdfTidyError::SameDirectory(_) => 13,
            PdfTidyError::Cancelled => 20,
            PdfTidyError::Interrupted => 130,
        }
    }

    /// Short machine-friendly kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            PdfTidyError::RootNotFound(_) => "root_not_found",
            PdfTidyError::NotADirectory(_) => "not_a_directory",
            PdfTidyError::PermissionDenied { .. } => "permission_denied",
            PdfTidyError::SameDirectory(_) => "same_directory",
            PdfTidyError::Cancelled => "cancelled",
            PdfTidyError::Interrupted => "interrupted",
        }
    }
}
