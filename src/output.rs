use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

/// Small wrapper around stdout/stderr printing to provide consistent, colored
/// user-facing messages. Colors are enabled only when output is a TTY.
fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix). Used for the per-file progress
/// stream and the summary blocks.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// Print a heavy (`=`) or light (`-`) rule, 80 columns wide.
pub fn print_rule(ch: char) {
    println!("{}", rule(ch));
}

pub fn rule(ch: char) -> String {
    std::iter::repeat_n(ch, 80).collect()
}

/// Per-file status line, indented under the "Processing:" line.
pub fn print_status(ok: bool, msg: &str) {
    let mark = if ok { "✓" } else { "⚠" };
    if is_tty() {
        if ok {
            println!("  {} {}", mark.green(), msg);
        } else {
            println!("  {} {}", mark.yellow(), msg);
        }
    } else {
        println!("  {} {}", mark, msg);
    }
}

pub fn print_failure(msg: &str) {
    if is_tty() {
        println!("  {} {}", "✗".red(), msg);
    } else {
        println!("  ✗ {}", msg);
    }
}

/// Ask a yes/no question on stdin. Only `y` and `yes` (any case) confirm;
/// EOF counts as "no".
pub fn confirm(prompt: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    confirm_from(prompt, &mut stdin.lock())
}

fn confirm_from(prompt: &str, input: &mut impl BufRead) -> io::Result<bool> {
    print!("{prompt} (yes/no): ");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(is_affirmative(&line))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
