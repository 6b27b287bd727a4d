//! Backup engine.
//!
//! Copies every PDF under the source into the backup root, keeping the
//! relative layout. Symlinks are never read and never written through; an
//! older copy of the same file in the backup tree is replaced.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{BackupConfig, has_symlink_below};
use crate::fs_ops::{FileEntry, PdfWalker, copy_with_metadata, describe_io_error, io_error_with_help, is_symlink};
use crate::report::{Outcome, RunSummary, SkipReason};
use crate::shutdown;

/// Result of one backup run.
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub summary: RunSummary,
    pub interrupted: bool,
}

impl BackupReport {
    /// A run counts as successful when at least one file was backed up.
    pub fn succeeded(&self) -> bool {
        self.summary.succeeded > 0
    }
}

/// Back up all PDFs described by a normalized `cfg`, reporting each file to `on_file`.
pub fn run_backup(cfg: &BackupConfig, mut on_file: impl FnMut(&Path, &Outcome)) -> Result<BackupReport> {
    let source = cfg.source.as_path();
    let dest_root = cfg.destination();

    fs::create_dir_all(dest_root).map_err(io_error_with_help("create backup directory", dest_root))?;
    // Compare canonical forms: the walker yields paths under the canonical source.
    let dest_root = dunce::canonicalize(dest_root).map_err(io_error_with_help("resolve backup directory", dest_root))?;

    let nested = dest_root.starts_with(source);
    if nested {
        debug!(destination = %dest_root.display(), "backup directory lies inside the source; excluding it from the walk");
    }

    let mut report = BackupReport {
        source: source.to_path_buf(),
        destination: dest_root.clone(),
        summary: RunSummary::default(),
        interrupted: false,
    };

    let mut walker = PdfWalker::excluding(source, nested.then_some(dest_root.as_path()));
    loop {
        if shutdown::is_requested() {
            warn!("shutdown requested; stopping backup before the next file");
            report.interrupted = true;
            break;
        }
        let Some(item) = walker.next() else { break };
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf());
                let outcome = Outcome::Failed(format!("cannot read directory entry: {e}"));
                report.summary.record(&outcome);
                on_file(&path, &outcome);
                continue;
            }
        };

        report.summary.files_seen += 1;
        let outcome = backup_one(source, &dest_root, &entry);
        report.summary.record(&outcome);
        on_file(&entry.path, &outcome);
    }

    info!(
        source = %report.source.display(),
        destination = %report.destination.display(),
        backed_up = report.summary.succeeded,
        skipped = report.summary.skipped,
        errors = report.summary.errored,
        bytes = report.summary.bytes_copied,
        "backup finished"
    );
    Ok(report)
}

fn backup_one(source: &Path, dest_root: &Path, entry: &FileEntry) -> Outcome {
    if entry.is_symlink {
        debug!(path = %entry.path.display(), "skipping symbolic link");
        return Outcome::Skipped(SkipReason::Symlink);
    }
    let Ok(rel) = entry.path.strip_prefix(source) else {
        return Outcome::Skipped(SkipReason::OutsideRoot);
    };
    let dest = dest_root.join(rel);

    match has_symlink_below(dest_root, &dest) {
        Ok(false) if !is_symlink(&dest) => {}
        Ok(_) => {
            warn!(dest = %dest.display(), "refusing to write through a symbolic link in the backup tree");
            return Outcome::Skipped(SkipReason::DestinationSymlink);
        }
        Err(e) => return Outcome::Failed(describe_io_error("inspect backup path", &dest, &e)),
    }

    if let Some(parent) = dest.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        return Outcome::Failed(describe_io_error("create backup directory", parent, &e));
    }

    match copy_with_metadata(&entry.path, &dest) {
        Ok(bytes) => {
            debug!(src = %entry.path.display(), dest = %dest.display(), bytes, "backed up");
            Outcome::BackedUp { dest, bytes }
        }
        Err(e) => {
            warn!(src = %entry.path.display(), error = %format!("{e:#}"), "backup copy failed");
            Outcome::Failed(format!("{e:#}"))
        }
    }
}
