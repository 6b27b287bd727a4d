//! Config module.
//! Typed runtime configuration for both pipelines, built from CLI arguments,
//! plus the validation that turns user paths into trusted, canonical roots.

pub mod paths;
pub mod types;
mod validate;

pub use paths::{backup_dir_name, default_backup_dir, has_symlink_below, path_has_symlink_ancestor};
pub use types::{BackupConfig, LogLevel, LogSettings, RenameConfig};

/// Prefix of generated backup directory names.
pub const BACKUP_DIR_PREFIX: &str = "pdf_backup_";
/// Timestamp layout used in backup directory and audit log names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
