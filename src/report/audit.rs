//! Write-once audit log of a live rename run.
//!
//! Layout:
//! ```text
//! PDF Rename Log - 2024-05-01 14:03:22
//! ================================================================================
//!
//! Directory: /data/pdfs
//! Total files renamed: 2
//!
//! --------------------------------------------------------------------------------
//!
//! Original: /data/pdfs/a.pdf
//! New:      /data/pdfs/Report 2024.pdf
//! Title:    Report 2024
//! --------------------------------------------------------------------------------
//! ```

use anyhow::Result;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::RenameOperation;
use crate::config::FILE_TIMESTAMP_FORMAT;
use crate::fs_ops::io_error_with_help;
use crate::platform::create_new_text_file;

const HEADER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `pdf_rename_log_YYYYMMDD_HHMMSS.txt` for the run's start time.
pub fn audit_log_name(started_at: &DateTime<Local>) -> String {
    format!("pdf_rename_log_{}.txt", started_at.format(FILE_TIMESTAMP_FORMAT))
}

/// Render the whole log in memory.
pub fn render_audit_log(root: &Path, written_at: &DateTime<Local>, ops: &[RenameOperation]) -> String {
    let heavy = "=".repeat(80);
    let light = "-".repeat(80);
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "PDF Rename Log - {}", written_at.format(HEADER_TIME_FORMAT));
    let _ = writeln!(out, "{heavy}\n");
    let _ = writeln!(out, "Directory: {}", root.display());
    let _ = writeln!(out, "Total files renamed: {}\n", ops.len());
    let _ = writeln!(out, "{light}\n");
    for op in ops {
        let _ = writeln!(out, "Original: {}", op.original.display());
        let _ = writeln!(out, "New:      {}", op.new.display());
        let _ = writeln!(out, "Title:    {}", op.title);
        let _ = writeln!(out, "{light}");
    }
    out
}

/// Create the log next to the renamed files: open (create_new), write, close.
/// Never replaces an existing file.
pub fn write_audit_log(
    root: &Path,
    started_at: &DateTime<Local>,
    ops: &[RenameOperation],
) -> Result<PathBuf> {
    let path = root.join(audit_log_name(started_at));
    let body = render_audit_log(root, &Local::now(), ops);

    let mut file = create_new_text_file(&path).map_err(io_error_with_help("create audit log", &path))?;
    file.write_all(body.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(io_error_with_help("write audit log", &path))?;
    info!(path = %path.display(), entries = ops.len(), "audit log written");
    Ok(path)
}
