//! Duplicate-name resolution.
//!
//! Policy:
//! - Skip: return the plain `base.pdf`; the caller skips the file if that name is taken.
//! - RenameWithSuffix: use `base.pdf` when free, else `base (1).pdf`, `base (2).pdf`, ...
//!
//! Every candidate is re-truncated so that base + suffix + extension stays within
//! `MAX_FILENAME_LEN`. Whether a candidate is free is decided by the caller, which
//! lets a planning pass account for renames it has decided on but not yet applied.

use std::path::{Path, PathBuf};
use tracing::trace;

use super::guard::entry_exists;
use super::sanitize::{MAX_FILENAME_LEN, PDF_EXTENSION, truncate_to_bytes};
use crate::report::SkipReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnDuplicate {
    /// Use the requested name; caller should skip the file if the path is taken.
    Skip,
    /// Pick a unique name by appending " (n)" before the extension.
    #[default]
    RenameWithSuffix,
}

/// Numbered candidates tried before giving up (suffixes 1..MAX).
pub const MAX_DUPLICATE_ATTEMPTS: u32 = 1000;

/// Disk-only freeness: nothing at all occupies the path, symlinks included.
pub fn is_free_on_disk(path: &Path) -> bool {
    !entry_exists(path)
}

/// `base + suffix + ".pdf"`, truncating `base` so the whole name fits.
pub fn build_name_with_suffix(base: &str, suffix: &str) -> String {
    let budget = MAX_FILENAME_LEN.saturating_sub(suffix.len() + PDF_EXTENSION.len());
    let mut stem = truncate_to_bytes(base, budget);
    if stem.len() < base.len() {
        stem = stem.trim_end();
    }
    format!("{stem}{suffix}{PDF_EXTENSION}")
}

/// True when `name` is exactly what `resolve_destination` would produce for
/// `base` with some numbered suffix, i.e. `base (n).pdf` for `1 <= n < MAX`.
pub fn is_numbered_variant(name: &str, base: &str) -> bool {
    let Some(stem) = name.strip_suffix(PDF_EXTENSION) else {
        return false;
    };
    let Some(open) = stem.rfind(" (") else {
        return false;
    };
    let Some(digits) = stem[open + 2..].strip_suffix(')') else {
        return false;
    };
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match digits.parse::<u32>() {
        Ok(n) if n < MAX_DUPLICATE_ATTEMPTS => build_name_with_suffix(base, &format!(" ({n})")) == name,
        _ => false,
    }
}

/// Compute the destination for `base` inside `dst_dir` according to the policy.
pub fn resolve_destination(
    dst_dir: &Path,
    base: &str,
    policy: OnDuplicate,
    is_free: impl Fn(&Path) -> bool,
) -> Result<PathBuf, SkipReason> {
    let candidate = dst_dir.join(build_name_with_suffix(base, ""));
    match policy {
        OnDuplicate::Skip => Ok(candidate),
        OnDuplicate::RenameWithSuffix => {
            if is_free(&candidate) {
                return Ok(candidate);
            }
            for n in 1..MAX_DUPLICATE_ATTEMPTS {
                let candidate = dst_dir.join(build_name_with_suffix(base, &format!(" ({n})")));
                if is_free(&candidate) {
                    return Ok(candidate);
                }
                if n == 3 {
                    trace!(base, dir = %dst_dir.display(), "duplicate: multiple collisions, still searching");
                }
            }
            Err(SkipReason::TooManyCollisions)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn no_collision_returns_requested_name() {
        let td = tempdir().unwrap();
        let dst = resolve_destination(td.path(), "file", OnDuplicate::RenameWithSuffix, is_free_on_disk)
            .unwrap();
        assert_eq!(dst, td.path().join("file.pdf"));
    }

    #[test]
    fn collisions_count_up_from_one() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("file.pdf"), b"0").unwrap();
        fs::write(td.path().join("file (1).pdf"), b"1").unwrap();
        let dst = resolve_destination(td.path(), "file", OnDuplicate::RenameWithSuffix, is_free_on_disk)
            .unwrap();
        assert_eq!(dst, td.path().join("file (2).pdf"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_never_chosen() {
        let td = tempdir().unwrap();
        std::os::unix::fs::symlink(td.path().join("nowhere"), td.path().join("file.pdf")).unwrap();
        let dst = resolve_destination(td.path(), "file", OnDuplicate::RenameWithSuffix, is_free_on_disk)
            .unwrap();
        assert_eq!(dst, td.path().join("file (1).pdf"));
    }

    #[test]
    fn skip_policy_returns_plain_name() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("file.pdf"), b"0").unwrap();
        let dst = resolve_destination(td.path(), "file", OnDuplicate::Skip, is_free_on_disk).unwrap();
        assert_eq!(dst, td.path().join("file.pdf"));
    }

    #[test]
    fn exhaustion_is_reported() {
        let dir = Path::new("/virtual");
        let res = resolve_destination(dir, "busy", OnDuplicate::RenameWithSuffix, |_| false);
        assert_eq!(res, Err(SkipReason::TooManyCollisions));
    }

    #[test]
    fn last_attempt_is_999() {
        let dir = Path::new("/virtual");
        let last = dir.join("busy (999).pdf");
        let res = resolve_destination(dir, "busy", OnDuplicate::RenameWithSuffix, |p| p == last);
        assert_eq!(res, Ok(last.clone()));
    }

    #[test]
    fn caller_view_of_taken_names_is_honored() {
        let dir = Path::new("/virtual");
        let taken: HashSet<PathBuf> = [dir.join("doc.pdf"), dir.join("doc (1).pdf")].into();
        let res = resolve_destination(dir, "doc", OnDuplicate::RenameWithSuffix, |p| !taken.contains(p));
        assert_eq!(res, Ok(dir.join("doc (2).pdf")));
    }

    #[test]
    fn boundary_length_names_are_retruncated() {
        let base = "a".repeat(MAX_FILENAME_LEN - PDF_EXTENSION.len());
        assert_eq!(build_name_with_suffix(&base, "").len(), MAX_FILENAME_LEN);

        let one = build_name_with_suffix(&base, " (1)");
        assert_eq!(one.len(), MAX_FILENAME_LEN);
        assert!(one.ends_with("a (1).pdf"));
        assert_eq!(one.matches('a').count(), MAX_FILENAME_LEN - 4 - 4);

        let two_digits = build_name_with_suffix(&base, " (10)");
        assert_eq!(two_digits.len(), MAX_FILENAME_LEN);
        assert_eq!(two_digits.matches('a').count(), MAX_FILENAME_LEN - 5 - 4);

        let three_digits = build_name_with_suffix(&base, " (999)");
        assert_eq!(three_digits.len(), MAX_FILENAME_LEN);
    }

    #[test]
    fn retruncation_respects_char_boundaries() {
        let base = "é".repeat(125) + "x"; // 251 bytes
        let name = build_name_with_suffix(&base, " (1)");
        assert!(name.len() <= MAX_FILENAME_LEN);
        assert!(name.ends_with("é (1).pdf"));
    }

    #[test]
    fn numbered_variants_are_recognized() {
        assert!(is_numbered_variant("Invoice (1).pdf", "Invoice"));
        assert!(is_numbered_variant("Invoice (42).pdf", "Invoice"));
        assert!(!is_numbered_variant("Invoice.pdf", "Invoice"));
        assert!(!is_numbered_variant("Invoice (0).pdf", "Invoice"));
        assert!(!is_numbered_variant("Invoice (01).pdf", "Invoice"));
        assert!(!is_numbered_variant("Invoice (1000).pdf", "Invoice"));
        assert!(!is_numbered_variant("Invoice (x).pdf", "Invoice"));
        assert!(!is_numbered_variant("Invoice (1).PDF", "Invoice"));
        assert!(!is_numbered_variant("Receipt (1).pdf", "Invoice"));
        assert!(!is_numbered_variant("Invoice (1) (2).pdf", "Invoice"));
        assert!(is_numbered_variant("Invoice (1) (2).pdf", "Invoice (1)"));
    }

    #[test]
    fn truncated_numbered_variants_are_recognized() {
        let base = "a".repeat(MAX_FILENAME_LEN - PDF_EXTENSION.len());
        let one = build_name_with_suffix(&base, " (1)");
        assert!(is_numbered_variant(&one, &base));
    }
}
