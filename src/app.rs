//! Application orchestrators for the two binaries.
//! Initializes logging, installs the interrupt handler, validates paths,
//! asks for confirmation, runs the engine and prints the summary.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::backup::{BackupReport, run_backup as backup_files};
use crate::cli::{BackupArgs, RenameArgs};
use crate::errors::PdfTidyError;
use crate::fs_ops::OnDuplicate;
use crate::logging::init_tracing;
use crate::output as out;
use crate::pdf::LopdfReader;
use crate::rename::{RenameReport, Renamer};
use crate::report::{Outcome, SkipReason, file_name_lossy};
use crate::{LogSettings, shutdown};

type GuardSlot = Arc<Mutex<Option<WorkerGuard>>>;

/// Start logging and make Ctrl-C request a cooperative stop.
fn init_runtime(settings: &LogSettings) -> Result<GuardSlot> {
    let guard = init_tracing(settings).inspect_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
    })?;

    // Dropped on SIGINT to flush the file appender
    let guard_slot = Arc::new(Mutex::new(guard));
    let handler_slot = Arc::clone(&guard_slot);
    ctrlc::set_handler(move || {
        shutdown::request();
        out::print_warn("Received interrupt; finishing the current file and stopping...");
        if let Ok(mut g) = handler_slot.lock() {
            let _ = g.take();
        }
    })
    .context("failed to install interrupt handler")?;
    Ok(guard_slot)
}

fn flush_logs(guard_slot: &GuardSlot) {
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
}

/// Log a fatal error with its structured code and show it to the user.
fn report_fatal(e: &anyhow::Error) {
    if let Some(pe) = e.downcast_ref::<PdfTidyError>() {
        let code = pe.code();
        let kind = pe.kind();
        match pe {
            PdfTidyError::RootNotFound(path) | PdfTidyError::NotADirectory(path) => {
                error!(code, kind, path = %path.display(), "Invalid directory")
            }
            PdfTidyError::PermissionDenied { path, context } => {
                error!(code, kind, path = %path.display(), %context, "Insufficient permissions")
            }
            PdfTidyError::SameDirectory(path) => {
                error!(code, kind, path = %path.display(), "Backup directory overlaps source")
            }
            PdfTidyError::Cancelled | PdfTidyError::Interrupted => error!(code, kind, "Run stopped"),
        }
    } else {
        error!(error = %format!("{e:#}"), "Run failed");
    }
    out::print_error(&format!("{e:#}"));
}

fn interrupted_exit() -> ExitCode {
    let e = PdfTidyError::Interrupted;
    warn!(code = e.code(), kind = e.kind(), "{e}");
    // 128 + SIGINT
    ExitCode::from(e.code() as u8)
}

/// JSON document printed on stdout with `--json`.
#[derive(Serialize)]
struct JsonSummary<'a, T: Serialize> {
    tool: &'static str,
    cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a T>,
}

fn print_json<T: Serialize>(tool: &'static str, cancelled: bool, report: Option<&T>) -> Result<()> {
    let doc = JsonSummary { tool, cancelled, report };
    out::print_user(&serde_json::to_string_pretty(&doc).context("serialize summary")?);
    Ok(())
}

/// Entry point of `pdf-backup`.
pub fn run_backup(args: BackupArgs) -> Result<ExitCode> {
    let assume_yes = args.yes;
    let (mut cfg, log) = args.into_config();
    let human = !log.json;
    let guard_slot = init_runtime(&log)?;

    let result = (|| -> Result<ExitCode> {
        if let Err(e) = cfg.normalize(&Local::now()) {
            report_fatal(&e);
            return Ok(ExitCode::FAILURE);
        }
        let source = cfg.source.clone();
        let destination = cfg.destination().to_path_buf();
        debug!(source = %source.display(), destination = %destination.display(), "backup configured");

        if !assume_yes {
            out::print_user("\nYou are about to backup PDF files from:");
            out::print_user(&format!("  {}", source.display()));
            out::print_user("To:");
            out::print_user(&format!("  {}", destination.display()));
            if !out::confirm("\nContinue?")? {
                return backup_cancelled(human);
            }
            if destination.exists() {
                out::print_warn(&format!("Backup directory already exists: {}", destination.display()));
                if !out::confirm("Overwrite?")? {
                    return backup_cancelled(human);
                }
            }
        }

        if human {
            out::print_user("");
            out::print_rule('=');
            out::print_user("PDF BACKUP UTILITY");
            out::print_rule('=');
            out::print_user(&format!("\nSource:      {}", source.display()));
            out::print_user(&format!("Destination: {}\n", destination.display()));
            out::print_rule('-');
        }

        let report = match backup_files(&cfg, |path, outcome| {
            if human {
                print_backup_progress(&source, path, outcome);
            }
        }) {
            Ok(report) => report,
            Err(e) => {
                report_fatal(&e);
                return Ok(ExitCode::FAILURE);
            }
        };

        if human {
            print_backup_summary(&report);
        } else {
            print_json("pdf-backup", false, Some(&report))?;
        }

        Ok(if report.interrupted {
            interrupted_exit()
        } else if report.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    })();

    flush_logs(&guard_slot);
    result
}

fn backup_cancelled(human: bool) -> Result<ExitCode> {
    debug!(code = PdfTidyError::Cancelled.code(), "backup cancelled at prompt");
    if human {
        out::print_user("Backup cancelled.");
    } else {
        print_json::<BackupReport>("pdf-backup", true, None)?;
    }
    Ok(ExitCode::FAILURE)
}

fn print_backup_progress(source: &Path, path: &Path, outcome: &Outcome) {
    let rel = path.strip_prefix(source).unwrap_or(path);
    match outcome {
        Outcome::BackedUp { .. } => out::print_status(true, &format!("Backed up: {}", rel.display())),
        Outcome::Skipped(reason) => out::print_status(false, &format!("{reason}: {}", path.display())),
        Outcome::Failed(e) => out::print_failure(&format!("Error backing up {}: {e}", path.display())),
        Outcome::Planned { .. } | Outcome::Renamed { .. } => {}
    }
}

fn print_backup_summary(report: &BackupReport) {
    let s = &report.summary;
    out::print_user("");
    out::print_rule('=');
    out::print_user("BACKUP SUMMARY");
    out::print_rule('=');
    out::print_user(&format!("Files backed up:  {}", s.succeeded));
    out::print_user(&format!("Skipped:          {}", s.skipped));
    out::print_user(&format!("Errors:           {}", s.errored));
    out::print_user(&format!("Total size:       {} MB", s.megabytes()));
    out::print_user(&format!("Backup location:  {}", report.destination.display()));
    out::print_rule('=');

    if report.interrupted {
        out::print_warn("Backup interrupted; files copied so far are kept.");
    } else if report.succeeded() {
        out::print_success("Backup completed successfully!");
        out::print_user("\nTo restore, copy files from:");
        out::print_user(&format!("   {}", report.destination.display()));
        out::print_user("back to:");
        out::print_user(&format!("   {}", report.source.display()));
    } else {
        out::print_warn("No PDF files found to backup.");
    }
}

/// Entry point of `pdf-rename`.
pub fn run_rename(args: RenameArgs) -> Result<ExitCode> {
    let assume_yes = args.yes;
    let (mut cfg, log) = args.into_config();
    let human = !log.json;
    let guard_slot = init_runtime(&log)?;

    let result = (|| -> Result<ExitCode> {
        if let Err(e) = cfg.normalize() {
            report_fatal(&e);
            return Ok(ExitCode::FAILURE);
        }
        let dry_run = cfg.dry_run;

        if human {
            out::print_rule('=');
            out::print_user("PDF BATCH RENAMER - Based on PDF Metadata Titles");
            out::print_rule('=');
            out::print_user("");
            if dry_run {
                out::print_user("DRY RUN MODE - No files will be renamed\n");
            } else {
                out::print_warn("LIVE MODE - Files will be renamed\n");
            }
            out::print_user(&format!("Directory: {}", cfg.root.display()));
            let duplicates = match cfg.on_duplicate {
                OnDuplicate::RenameWithSuffix => "Enabled",
                OnDuplicate::Skip => "Disabled",
            };
            out::print_user(&format!("Duplicate handling: {duplicates}"));
            out::print_rule('-');
        }

        let renamer = Renamer::new(cfg, LopdfReader::new());
        let plan = renamer.plan(|path, outcome| {
            if human {
                print_plan_progress(dry_run, path, outcome);
            }
        });

        if !dry_run && !plan.is_empty() && !plan.interrupted && !assume_yes {
            out::print_warn(&format!("You are about to rename {} files!", plan.len()));
            out::print_user(&format!("Directory: {}", plan.root.display()));
            if !out::confirm("Are you sure you want to continue?")? {
                debug!(code = PdfTidyError::Cancelled.code(), planned = plan.len(), "rename cancelled at prompt");
                if human {
                    out::print_user("Operation cancelled.");
                } else {
                    print_json::<RenameReport>("pdf-rename", true, None)?;
                }
                return Ok(ExitCode::SUCCESS);
            }
        }

        let report = renamer.apply(plan, |path, outcome| {
            if human {
                print_apply_progress(path, outcome);
            }
        });

        if human {
            print_rename_summary(&report);
        } else {
            print_json("pdf-rename", false, Some(&report))?;
        }

        Ok(if report.interrupted {
            interrupted_exit()
        } else {
            ExitCode::SUCCESS
        })
    })();

    flush_logs(&guard_slot);
    result
}

fn print_plan_progress(dry_run: bool, path: &Path, outcome: &Outcome) {
    match outcome {
        Outcome::Skipped(reason) if reason.is_security() => {
            out::print_warn(&format!("SECURITY WARNING: {reason}: {}", path.display()));
            return;
        }
        _ => out::print_user(&format!("\nProcessing: {}", path.display())),
    }
    match outcome {
        Outcome::Planned { dest } if dry_run => {
            out::print_status(true, &format!("Would rename to: {}", file_name_lossy(dest)))
        }
        Outcome::Planned { dest } => out::print_status(true, &format!("Will rename to: {}", file_name_lossy(dest))),
        Outcome::Skipped(SkipReason::AlreadyNamed) => out::print_status(true, "Already named correctly"),
        Outcome::Skipped(reason) => out::print_status(false, &format!("Skipped: {reason}")),
        Outcome::Failed(e) => out::print_failure(&format!("Error: {e}")),
        Outcome::BackedUp { .. } | Outcome::Renamed { .. } => {}
    }
}

fn print_apply_progress(path: &Path, outcome: &Outcome) {
    let name = file_name_lossy(path);
    match outcome {
        Outcome::Renamed { dest } => {
            out::print_status(true, &format!("Renamed: {name} -> {}", file_name_lossy(dest)))
        }
        Outcome::Skipped(reason) if reason.is_security() => {
            out::print_warn(&format!("SECURITY WARNING: {reason}: {}", path.display()))
        }
        Outcome::Skipped(reason) => out::print_status(false, &format!("Skipped {name}: {reason}")),
        Outcome::Failed(e) => out::print_failure(&format!("Error renaming {name}: {e}")),
        Outcome::BackedUp { .. } | Outcome::Planned { .. } => {}
    }
}

fn print_rename_summary(report: &RenameReport) {
    if let Some(log) = &report.log_file {
        out::print_info(&format!("Log file created: {}", log.display()));
    }
    if let Some(e) = &report.log_error {
        out::print_warn(&format!("Could not create log file: {e}"));
    }

    let s = &report.summary;
    out::print_user("");
    out::print_rule('=');
    out::print_user("SUMMARY");
    out::print_rule('=');
    out::print_user(&format!("Total PDF files found: {}", s.files_seen));
    if report.dry_run {
        out::print_user(&format!("Would rename: {}", s.succeeded));
    } else {
        out::print_user(&format!("Successfully renamed: {}", s.succeeded));
    }
    out::print_user(&format!("Skipped: {}", s.skipped));
    out::print_user(&format!("Errors: {}", s.errored));
    out::print_rule('=');

    if report.interrupted {
        out::print_warn("Run interrupted; renames performed so far are kept.");
    } else if report.dry_run && s.succeeded > 0 {
        out::print_info("Tip: Run again with --no-dry-run to perform actual renaming");
    } else if !report.dry_run && s.succeeded > 0 {
        out::print_success("Renaming completed successfully!");
        if let Some(log) = &report.log_file {
            out::print_info(&format!("Check the log file for details: {}", log.display()));
        }
    }
}
