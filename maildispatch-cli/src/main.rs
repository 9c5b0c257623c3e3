//! maildispatch CLI - send mail and inspect the local mail log.
//!
//! Usage:
//!   maildispatch send --to a@x.com --to b@x.com --subject Hi --body "Hello"
//!   maildispatch send --to a@x.com --subject Hi --body "<b>Hello</b>" --html
//!   maildispatch log --json
//!   maildispatch check
//!
//! Configuration comes from the environment (`EMAIL_METHOD`, `SMTP_*`, ...).

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        // SAFETY: single-threaded at this point, before any logging starts
        unsafe {
            std::env::set_var("RUST_LOG", "maildispatch=debug");
        }
    }
    maildispatch::init_tracing();

    match cli.command {
        Commands::Send(args) => commands::send::run(args)?,
        Commands::Log(args) => commands::log::run(args)?,
        Commands::Check => commands::check::run()?,
    }

    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "→".blue(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}
