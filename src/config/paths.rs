//! Derived path helpers and symlink checks.
//! Computes the default backup location and detects symlinked ancestors for safety.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{BACKUP_DIR_PREFIX, FILE_TIMESTAMP_FORMAT};

/// `pdf_backup_YYYYMMDD_HHMMSS` for the given instant.
pub fn backup_dir_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("{BACKUP_DIR_PREFIX}{}", now.format(FILE_TIMESTAMP_FORMAT))
}

/// Default backup root: a timestamped sibling of `source`.
/// A source without a parent (filesystem root) hosts the backup itself.
pub fn default_backup_dir<Tz: TimeZone>(source: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: Display,
{
    source
        .parent()
        .unwrap_or(source)
        .join(backup_dir_name(now))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

/// Return true if a directory strictly between `root` and `path` is a symlink.
/// Ancestors of `root` itself are not inspected; the root was vetted on entry.
pub fn has_symlink_below(root: &Path, path: &Path) -> io::Result<bool> {
    let Ok(rel) = path.strip_prefix(root) else {
        return Ok(false);
    };
    let mut cur = root.to_path_buf();
    let mut comps = rel.components().peekable();
    while let Some(c) = comps.next() {
        if comps.peek().is_none() {
            break; // the leaf is checked by the caller
        }
        cur.push(c);
        match fs::symlink_metadata(&cur) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}
