//! Filesystem building blocks shared by the backup and rename pipelines.

mod atomic;
pub mod copy;
pub mod duplicate;
pub mod guard;
pub mod helpers;
mod io_copy;
mod metadata;
pub mod sanitize;
mod util;
pub mod walk;

pub use atomic::try_atomic_move;
pub use copy::copy_with_metadata;
pub use duplicate::{
    OnDuplicate, build_name_with_suffix, is_free_on_disk, is_numbered_variant, resolve_destination,
};
pub use guard::{entry_exists, is_symlink, is_within_root};
pub use helpers::{describe_io_error, io_error_with_help};
pub use sanitize::{MAX_BASE_LEN, MAX_FILENAME_LEN, MAX_TITLE_CHARS, PDF_EXTENSION, sanitize_title};
pub use walk::{FileEntry, PdfWalker, is_pdf_name};
