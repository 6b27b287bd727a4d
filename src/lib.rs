//! Core library for `pdf_tidy`.
//!
//! Two independent pipelines share the building blocks in this crate:
//! - backup: copy every PDF under a source tree into a timestamped backup tree.
//! - rename: rename PDFs in place after the title found in their metadata.
//!
//! The library never prints; per-file outcomes are handed to a caller-supplied
//! observer and diagnostics go through `tracing`. The binaries own prompting
//! and the human-readable progress stream.

pub mod app;
pub mod backup;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod logging;
pub mod output;
pub mod pdf;
pub mod platform;
pub mod rename;
pub mod report;
pub mod shutdown;

pub use backup::{BackupReport, run_backup};
pub use config::{BackupConfig, LogLevel, LogSettings, RenameConfig, path_has_symlink_ancestor};
pub use errors::PdfTidyError;
pub use fs_ops::OnDuplicate;
pub use pdf::{DocumentInfo, LopdfReader, MetadataError, MetadataReader};
pub use rename::{RenamePlan, RenameReport, Renamer};
pub use report::{Outcome, RenameOperation, RunSummary, SkipReason};
