//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "maildispatch")]
#[command(version)]
#[command(about = "Send mail through SMTP or the local mail log", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a mail using the configured EMAIL_METHOD
    Send(SendArgs),

    /// Print the local mail log, oldest first
    Log(LogArgs),

    /// Validate configuration and report sink health
    Check,
}

#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Recipient address (repeat for several recipients)
    #[arg(short, long = "to", required = true)]
    pub to: Vec<String>,

    /// Subject line
    #[arg(short, long)]
    pub subject: String,

    /// Message body
    #[arg(short, long)]
    pub body: String,

    /// Treat the body as HTML and attach a plain-text alternative
    #[arg(long, default_value = "false")]
    pub html: bool,
}

#[derive(Parser, Debug)]
pub struct LogArgs {
    /// Print the raw JSON entries instead of a summary
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Show message bodies in the summary
    #[arg(long, default_value = "false")]
    pub full: bool,
}
