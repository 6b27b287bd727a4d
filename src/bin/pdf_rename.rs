use anyhow::Result;
use clap::Parser;
use pdf_tidy::app;
use pdf_tidy::cli::RenameArgs;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    app::run_rename(RenameArgs::parse())
}
