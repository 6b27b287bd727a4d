//! Config validation logic.
//! Verifies directory existence, access rights and disjoint roots, and turns
//! user-supplied paths into absolute canonical ones before any mutation.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::errors::PdfTidyError;
use crate::platform::{Access, check_dir_access};

use super::paths::default_backup_dir;
use super::types::{BackupConfig, RenameConfig};

impl BackupConfig {
    /// Validate the source and resolve the destination.
    ///
    /// - source must exist, be a directory, and be readable; it is canonicalized.
    /// - destination defaults to a timestamped sibling of the source.
    /// - destination may not resolve to the source itself.
    pub fn normalize(&mut self, now: &DateTime<Local>) -> Result<()> {
        ensure_dir_exists_and_is_dir(&self.source)?;
        ensure_access(&self.source, Access::Read)?;
        self.source = canonical(&self.source)?;

        let dest = match self.destination.take() {
            Some(d) => std::path::absolute(&d)?,
            None => default_backup_dir(&self.source, now),
        };
        if dest.exists() && !dest.is_dir() {
            error!(path = %dest.display(), "backup destination is not a directory");
            return Err(PdfTidyError::NotADirectory(dest).into());
        }
        // Existing destinations are compared after symlink resolution.
        let dest_real = dunce::canonicalize(&dest).unwrap_or_else(|_| dest.clone());
        if dest_real == self.source {
            return Err(PdfTidyError::SameDirectory(dest_real).into());
        }
        self.destination = Some(dest_real);

        info!(
            source = %self.source.display(),
            destination = %self.destination().display(),
            "backup config validated"
        );
        Ok(())
    }

    /// Resolved destination. Only meaningful after `normalize`.
    pub fn destination(&self) -> &Path {
        self.destination.as_deref().unwrap_or(&self.source)
    }
}

impl RenameConfig {
    /// Validate existence and read/write access, then canonicalize the root.
    /// No probe file is written, so dry runs leave the disk untouched.
    pub fn normalize(&mut self) -> Result<()> {
        ensure_dir_exists_and_is_dir(&self.root)?;
        ensure_access(&self.root, Access::ReadWrite)?;
        self.root = canonical(&self.root)?;
        info!(
            root = %self.root.display(),
            dry_run = self.dry_run,
            on_duplicate = ?self.on_duplicate,
            "rename config validated"
        );
        Ok(())
    }
}

/// Ensure path exists and is a directory; emit clear errors with path context.
fn ensure_dir_exists_and_is_dir(path: &Path) -> Result<()> {
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    if !abs.exists() {
        error!("directory does not exist: {}", abs.display());
        return Err(PdfTidyError::RootNotFound(abs).into());
    }
    if !abs.is_dir() {
        error!("path is not a directory: {}", abs.display());
        return Err(PdfTidyError::NotADirectory(abs).into());
    }
    Ok(())
}

fn ensure_access(path: &Path, access: Access) -> Result<()> {
    check_dir_access(path, access).map_err(|e| PdfTidyError::PermissionDenied {
        path: path.to_path_buf(),
        context: format!("{access} access required: {e}"),
    })?;
    // read_dir catches ACLs that access(2) does not model.
    fs::read_dir(path).map_err(|e| PdfTidyError::PermissionDenied {
        path: path.to_path_buf(),
        context: format!("cannot list directory: {e}"),
    })?;
    debug!(path = %path.display(), %access, "directory access ok");
    Ok(())
}

fn canonical(path: &Path) -> Result<PathBuf> {
    Ok(dunce::canonicalize(path)?)
}
