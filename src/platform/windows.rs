//! Windows implementations of platform helpers (best-effort, minimal ACL awareness).
//!
//! Notes:
//! - Windows lacks POSIX mode semantics; we do not attempt ACL management here.
//! - Access checks only look at the READONLY attribute.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use super::Access;

/// Open log file for appending (best-effort; no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Create a brand-new text file; fails if anything already exists at `path`.
pub fn create_new_text_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// Minimal access check: directory metadata readable, not READONLY for writes.
pub fn check_dir_access(path: &Path, access: Access) -> io::Result<()> {
    let meta = fs::metadata(path)?;
    if access == Access::ReadWrite && meta.permissions().readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "directory has READONLY attribute",
        ));
    }
    Ok(())
}
