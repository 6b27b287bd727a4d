//! Safe copy for backups:
//! - Streams into a hidden temp file in the destination directory (fsynced)
//! - Atomically renames temp -> dest, replacing an older backup of the file
//! - Restores the source's timestamps and permissions on the result

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

use super::atomic::try_atomic_move;
use super::helpers::io_error_with_help;
use super::{io_copy, metadata, util};

/// Copy `src` to `dest` with metadata. Returns bytes copied.
///
/// The destination directory must already exist. A crash mid-copy leaves at
/// most a hidden temp file behind, never a truncated `dest`.
pub fn copy_with_metadata(src: &Path, dest: &Path) -> Result<u64> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;
    let src_meta = fs::metadata(src).map_err(io_error_with_help("stat source", src))?;

    let tmp_path = util::unique_temp_path(dest_dir);
    let bytes = match io_copy::copy_streaming(src, &tmp_path) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_error_with_help("copy to temporary file", &tmp_path)(e));
        }
    };

    // Times are set on the temp file so the rename does not disturb them.
    metadata::preserve_metadata(src, &tmp_path, &src_meta);

    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("install backup copy {}", dest.display()));
    }
    Ok(bytes)
}
