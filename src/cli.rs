//! CLI definitions for both binaries.
//!
//! Notes:
//! - The command line is the only configuration source.
//! - --debug is a shorthand for --log-level debug and wins over it.
//! - Neither tool changes anything before the user confirms, unless --yes is given.

use clap::{Args, Parser, ValueHint};
use std::path::PathBuf;

use crate::config::{BackupConfig, LogLevel, LogSettings, RenameConfig};
use crate::fs_ops::OnDuplicate;

/// Diagnostic options shared by both tools.
#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, value_name = "LEVEL", help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<LogLevel>,

    #[arg(long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Emit diagnostics as JSON and print a JSON summary instead of the progress stream.
    #[arg(long, help = "Emit JSON diagnostics and a JSON summary on stdout")]
    pub json: bool,

    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath, help = "Also append diagnostics to this file")]
    pub log_file: Option<PathBuf>,
}

impl LogArgs {
    pub fn effective_level(&self) -> LogLevel {
        if self.debug {
            return LogLevel::Debug;
        }
        self.log_level.unwrap_or_default()
    }

    pub fn settings(&self) -> LogSettings {
        LogSettings {
            level: self.effective_level(),
            file: self.log_file.clone(),
            json: self.json,
        }
    }
}

/// Create a backup of PDF files before batch renaming.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pdf-backup",
    author,
    version,
    about = "Create a backup of PDF files before batch renaming",
    after_help = "Examples:\n  pdf-backup                                   # Backup current directory\n  pdf-backup --source /path/to/pdfs            # Backup specific directory\n  pdf-backup -s /path/to/pdfs -b /mnt/backup   # Custom backup location"
)]
pub struct BackupArgs {
    #[arg(
        long,
        short = 's',
        default_value = ".",
        value_hint = ValueHint::DirPath,
        help = "Source directory containing PDF files"
    )]
    pub source: PathBuf,

    #[arg(
        long,
        short = 'b',
        value_hint = ValueHint::DirPath,
        help = "Backup directory (default: <parent of source>/pdf_backup_TIMESTAMP)"
    )]
    pub backup: Option<PathBuf>,

    #[arg(long, short = 'y', help = "Do not ask for confirmation")]
    pub yes: bool,

    #[command(flatten)]
    pub log: LogArgs,
}

impl BackupArgs {
    pub fn into_config(self) -> (BackupConfig, LogSettings) {
        let settings = self.log.settings();
        (BackupConfig::new(self.source, self.backup), settings)
    }
}

/// Rename PDF files after the title stored in their metadata.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pdf-rename",
    author,
    version,
    about = "Batch-rename PDF files based on their metadata titles",
    after_help = "Examples:\n  pdf-rename                          # Dry run in current directory\n  pdf-rename --directory /path/to/pdfs  # Dry run in specific directory\n  pdf-rename --no-dry-run             # Actually rename files\n  pdf-rename --no-duplicates          # Don't number duplicate filenames\n\nAlways run a dry run first (the default) and back up important files."
)]
pub struct RenameArgs {
    #[arg(
        long,
        short = 'd',
        default_value = ".",
        value_hint = ValueHint::DirPath,
        help = "Directory containing PDF files"
    )]
    pub directory: PathBuf,

    #[arg(long, help = "Rename files for real instead of previewing (use with caution)")]
    pub no_dry_run: bool,

    #[arg(long, help = "Don't automatically number duplicate filenames")]
    pub no_duplicates: bool,

    #[arg(long, short = 'y', help = "Do not ask for confirmation")]
    pub yes: bool,

    #[command(flatten)]
    pub log: LogArgs,
}

impl RenameArgs {
    pub fn into_config(self) -> (RenameConfig, LogSettings) {
        let settings = self.log.settings();
        let mut cfg = RenameConfig::new(self.directory);
        if self.no_dry_run {
            cfg = cfg.live();
        }
        if self.no_duplicates {
            cfg = cfg.with_duplicates(OnDuplicate::Skip);
        }
        (cfg, settings)
    }
}
