//! Per-file outcomes, run counters and the rename audit trail.

pub mod audit;

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use audit::{audit_log_name, render_audit_log, write_audit_log};

/// Why a file was left alone. None of these abort the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("Skipping symbolic link")]
    Symlink,
    #[error("File outside base directory")]
    OutsideRoot,
    #[error("No metadata available")]
    NoMetadata,
    #[error("No title in metadata")]
    NoTitle,
    #[error("Title too long (>1000 chars), possible metadata corruption")]
    TitleTooLong,
    #[error("Title contains only invalid characters")]
    EmptyAfterSanitize,
    #[error("Too many files with same name")]
    TooManyCollisions,
    #[error("File already exists with name '{0}'")]
    TargetExists(String),
    #[error("Already named correctly")]
    AlreadyNamed,
    #[error("Generated path outside base directory")]
    DestinationOutsideRoot,
    #[error("Destination is a symbolic link or lies below one")]
    DestinationSymlink,
    #[error("Source is no longer a regular file")]
    SourceChanged,
}

impl SkipReason {
    /// Skips that indicate a possible attack rather than a content problem.
    pub fn is_security(&self) -> bool {
        matches!(
            self,
            SkipReason::Symlink
                | SkipReason::OutsideRoot
                | SkipReason::DestinationOutsideRoot
                | SkipReason::DestinationSymlink
        )
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Backup copy written
    BackedUp { dest: PathBuf, bytes: u64 },
    /// Rename decided (dry run, or awaiting `apply`)
    Planned { dest: PathBuf },
    /// Rename performed
    Renamed { dest: PathBuf },
    Skipped(SkipReason),
    Failed(String),
}

/// Monotonic counters for one run.
///
/// Every file seen lands in exactly one of succeeded, skipped or errored.
/// Renames cut off by an interrupt count as skipped. Directory entries that
/// could not be read count as errored without being seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_seen: u64,
    pub succeeded: u64,
    pub skipped: u64,
    pub errored: u64,
    pub bytes_copied: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::BackedUp { bytes, .. } => {
                self.succeeded += 1;
                self.bytes_copied += bytes;
            }
            Outcome::Planned { .. } | Outcome::Renamed { .. } => self.succeeded += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed(_) => self.errored += 1,
        }
    }

    /// Megabytes with two decimals, for the backup summary.
    pub fn megabytes(&self) -> String {
        format!("{:.2}", self.bytes_copied as f64 / (1024.0 * 1024.0))
    }
}

/// One accepted rename, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOperation {
    pub original: PathBuf,
    pub new: PathBuf,
    /// Title as read from metadata (trimmed, unsanitized)
    pub title: String,
}

impl RenameOperation {
    pub fn new_name(&self) -> String {
        file_name_lossy(&self.new)
    }
}

pub(crate) fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
