//! Core configuration types.
//! - BackupConfig / RenameConfig hold the per-run settings of each pipeline.
//! - LogSettings and LogLevel drive the tracing subscriber.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::fs_ops::OnDuplicate;

/// Program-defined verbosity levels exposed to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Warnings and errors (default)
    #[default]
    Normal,
    /// Per-file decisions
    Info,
    /// Everything
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Diagnostics settings shared by both binaries.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub level: LogLevel,
    /// Optional additional log file sink
    pub file: Option<PathBuf>,
    /// Structured JSON diagnostics and summary
    pub json: bool,
}

/// Settings for one backup run.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Tree to copy PDFs from
    pub source: PathBuf,
    /// Backup root; `None` until normalized when the user gave none
    pub destination: Option<PathBuf>,
}

impl BackupConfig {
    pub fn new(source: impl Into<PathBuf>, destination: Option<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination,
        }
    }
}

/// Settings for one rename run.
#[derive(Debug, Clone)]
pub struct RenameConfig {
    /// Directory whose PDFs are renamed (recursively)
    pub root: PathBuf,
    /// Preview only; the default
    pub dry_run: bool,
    /// What to do when the sanitized name is already taken
    pub on_duplicate: OnDuplicate,
}

impl RenameConfig {
    /// Dry run with duplicate numbering enabled.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: true,
            on_duplicate: OnDuplicate::RenameWithSuffix,
        }
    }

    pub fn live(mut self) -> Self {
        self.dry_run = false;
        self
    }

    pub fn with_duplicates(mut self, on_duplicate: OnDuplicate) -> Self {
        self.on_duplicate = on_duplicate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aliases() {
        assert_eq!(LogLevel::parse("QUIET"), Some(LogLevel::Quiet));
        assert_eq!(LogLevel::parse("verbose"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse(" trace "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("loud"), None);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn rename_defaults_are_safe() {
        let cfg = RenameConfig::new("/tmp/x");
        assert!(cfg.dry_run);
        assert_eq!(cfg.on_duplicate, OnDuplicate::RenameWithSuffix);
        assert!(!cfg.live().dry_run);
    }
}
