//! Path safety guards applied before any mutating operation.
//!
//! - Containment: the canonical candidate must lie strictly inside the
//!   canonical root. Resolution errors fail closed.
//! - Symlinks: entries are inspected with `symlink_metadata`, never followed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Canonicalize `candidate`; if it does not exist yet, canonicalize its parent
/// and re-attach the final component (a pending rename destination).
fn resolve_candidate(candidate: &Path) -> io::Result<PathBuf> {
    match dunce::canonicalize(candidate) {
        Ok(p) => Ok(p),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let parent = candidate
                .parent()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no parent"))?;
            let name = candidate
                .file_name()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no file name"))?;
            Ok(dunce::canonicalize(parent)?.join(name))
        }
        Err(e) => Err(e),
    }
}

/// True when `candidate` resolves to a location strictly within `root`.
pub fn is_within_root(root: &Path, candidate: &Path) -> bool {
    let Ok(root_real) = dunce::canonicalize(root) else {
        return false;
    };
    match resolve_candidate(candidate) {
        Ok(cand_real) => {
            let inside = cand_real != root_real && cand_real.starts_with(&root_real);
            trace!(root = %root_real.display(), candidate = %cand_real.display(), inside, "containment check");
            inside
        }
        Err(e) => {
            trace!(candidate = %candidate.display(), error = %e, "containment check failed closed");
            false
        }
    }
}

/// True if the entry at `path` is itself a symbolic link (dangling or not).
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// True if anything occupies `path`: a file, a directory, or a symlink,
/// including a dangling one that `Path::exists` would miss.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
