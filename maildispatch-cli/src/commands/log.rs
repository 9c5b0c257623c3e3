//! Log command - print the local mail log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use maildispatch::{LogEntry, MailLog, MailLogConfig};

use crate::cli::LogArgs;
use crate::print_info;

/// Run the log command
pub fn run(args: LogArgs) -> Result<()> {
    let config = MailLogConfig::from_env().context("Failed to load mail log configuration")?;
    show(&MailLog::from_config(&config), &args)
}

fn show(log: &MailLog, args: &LogArgs) -> Result<()> {
    let entries = log
        .read_all()
        .with_context(|| format!("Failed to read {}", log.path().display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        print_info(&format!("No mail logged in {}", log.path().display()));
        return Ok(());
    }

    println!(
        "\n{} {} of {} entries in {}\n",
        "Mail log".cyan().bold(),
        entries.len(),
        log.max_entries(),
        log.path().display()
    );
    for entry in &entries {
        print_entry(entry, args.full);
    }
    println!();

    Ok(())
}

fn print_entry(entry: &LogEntry, full: bool) {
    let recipients: Vec<&str> = entry.to.iter().collect();
    let kind = if entry.alt.is_some() { "html" } else { "text" };

    println!(
        "{} {} {}",
        format_time(entry.time).dimmed(),
        format!("[{}]", kind).yellow(),
        entry.subject.bold()
    );
    println!("  To: {}", recipients.join(", "));

    if full {
        for line in entry.body.lines() {
            println!("  | {}", line);
        }
    }
}

fn format_time(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maildispatch::{CorruptLogPolicy, Recipients};

    fn args(json: bool) -> LogArgs {
        LogArgs { json, full: true }
    }

    fn entry(subject: &str) -> LogEntry {
        LogEntry {
            to: Recipients::from(vec!["a@x.com", "b@x.com"]),
            subject: subject.to_string(),
            body: "line one\nline two".to_string(),
            alt: None,
            time: 1_700_000_000,
        }
    }

    #[test]
    fn test_show_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = MailLog::new(dir.path().join("mail.log"));

        assert!(show(&log, &args(false)).is_ok());
        assert!(!log.path().exists());
    }

    #[test]
    fn test_show_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = MailLog::new(dir.path().join("mail.log"));
        log.append(entry("first")).unwrap();
        log.append(entry("second")).unwrap();

        assert!(show(&log, &args(false)).is_ok());
        assert!(show(&log, &args(true)).is_ok());
        assert_eq!(log.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_show_corrupt_log_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mail.log");
        std::fs::write(&path, "{not json").unwrap();

        let err = show(&MailLog::new(&path), &args(false)).unwrap_err();
        assert!(format!("{:#}", err).contains("is corrupt"));

        let reset = MailLog::new(&path).with_corrupt_policy(CorruptLogPolicy::Reset);
        assert!(show(&reset, &args(true)).is_ok());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_time(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }
}
