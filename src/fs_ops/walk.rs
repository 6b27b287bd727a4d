//! Directory walker shared by both pipelines.
//!
//! Yields every regular file whose name ends in `.pdf` (any case). FIFOs,
//! sockets and device nodes are passed over, since opening one can block.
//! Symlinks are yielded too, flagged, so the caller can count and skip them;
//! the walk itself never follows links. Entries are sorted by file name within
//! each directory, and each directory is read in full before its entries are
//! handed out, so renaming siblings mid-walk cannot make the walker see a file
//! twice.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::sanitize::PDF_EXTENSION;

/// One candidate file produced by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Directory containing the file
    pub dir: PathBuf,
    /// Bare file name
    pub name: OsString,
    /// `dir/name`
    pub path: PathBuf,
    /// The entry itself is a symbolic link
    pub is_symlink: bool,
}

/// True for names ending in `.pdf`, case-insensitively.
pub fn is_pdf_name(name: &std::ffi::OsStr) -> bool {
    let lossy = name.to_string_lossy();
    lossy.len() >= PDF_EXTENSION.len()
        && lossy.is_char_boundary(lossy.len() - PDF_EXTENSION.len())
        && lossy[lossy.len() - PDF_EXTENSION.len()..].eq_ignore_ascii_case(PDF_EXTENSION)
}

/// Iterator over PDF entries under a root.
pub struct PdfWalker {
    inner: Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>>>,
}

impl PdfWalker {
    pub fn new(root: &Path) -> Self {
        Self::excluding(root, None)
    }

    /// Walk `root` but never descend into `exclude` (e.g. a backup tree nested
    /// inside its own source).
    pub fn excluding(root: &Path, exclude: Option<&Path>) -> Self {
        let exclude = exclude.map(Path::to_path_buf);
        let iter = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| match &exclude {
                Some(ex) => !(e.depth() > 0 && e.file_type().is_dir() && e.path() == ex),
                None => true,
            });
        Self {
            inner: Box::new(iter),
        }
    }
}

impl Iterator for PdfWalker {
    type Item = walkdir::Result<FileEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };
            let ft = entry.file_type();
            if ft.is_dir() || !is_pdf_name(entry.file_name()) {
                continue;
            }
            if !ft.is_file() && !ft.is_symlink() {
                debug!(path = %entry.path().display(), "skipping special file");
                continue;
            }
            let path = entry.path().to_path_buf();
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            return Some(Ok(FileEntry {
                dir,
                name: entry.file_name().to_os_string(),
                path,
                is_symlink: ft.is_symlink(),
            }));
        }
    }
}
