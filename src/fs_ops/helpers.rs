//! I/O error helpers.
//!
//! Enrich io::Error with the operation, the path and an actionable hint so the
//! per-file "Error:" lines and the diagnostics log say what to fix.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create backup directory", dir))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Hint for a raw OS error code, if we know one.
#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    match code {
        libc::EACCES | libc::EPERM => Some("permission denied; check ownership and write permissions"),
        libc::EXDEV => Some("cross-filesystem; atomic rename not possible"),
        libc::EBUSY => Some("resource busy; ensure no other process is using the file"),
        libc::ENOENT => Some("path not found; it may have been moved or deleted meanwhile"),
        libc::EEXIST => Some("already exists"),
        libc::ENOSPC => Some("insufficient space on device"),
        libc::EROFS => Some("read-only filesystem"),
        libc::ELOOP => Some("too many symbolic link levels; possible symlink cycle"),
        libc::ENAMETOOLONG => Some("filename or path too long"),
        libc::EMFILE | libc::ENFILE => Some("too many open files"),
        _ => None,
    }
}

#[cfg(windows)]
fn os_hint(code: i32) -> Option<&'static str> {
    match code {
        5 => Some("access denied; check permissions"),
        17 => Some("not same device; cross-filesystem move"),
        32 => Some("sharing violation; file is open in another program"),
        2 | 3 => Some("path not found; it may have been moved or deleted meanwhile"),
        80 | 183 => Some("already exists"),
        112 => Some("insufficient disk space"),
        206 => Some("filename or path too long"),
        _ => None,
    }
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
        io::ErrorKind::NotFound => Some("path not found; it may have been moved or deleted meanwhile"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        _ => None,
    }
}

/// Format a human-friendly message with op/path plus platform-aware hints.
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{op} '{}': {e}", path.display());
    let hint = e.raw_os_error().and_then(os_hint).or_else(|| kind_hint(e.kind()));
    if let Some(h) = hint {
        msg.push_str(" (");
        msg.push_str(h);
        msg.push(')');
    }
    msg
}

/// Adapter for anyhow::Result code: `.map_err(io_error_with_help(op, path))`.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(describe_io_error(op, path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_op_and_path() {
        let e = io::Error::new(io::ErrorKind::NotFound, "gone");
        let msg = describe_io_error("rename", Path::new("/x/a.pdf"), &e);
        assert!(msg.starts_with("rename '/x/a.pdf': gone"));
        assert!(msg.contains("path not found"));
    }

    #[cfg(unix)]
    #[test]
    fn raw_os_codes_get_hints() {
        let e = io::Error::from_raw_os_error(libc::ENOSPC);
        let msg = describe_io_error("copy", Path::new("/x"), &e);
        assert!(msg.contains("insufficient space"));
    }

    #[test]
    fn unknown_errors_have_no_hint() {
        let e = io::Error::other("weird");
        let msg = describe_io_error("copy", Path::new("/x"), &e);
        assert_eq!(msg, "copy '/x': weird");
    }
}
