use anyhow::Result;
use clap::Parser;
use pdf_tidy::app;
use pdf_tidy::cli::BackupArgs;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    app::run_backup(BackupArgs::parse())
}
