//! Mail log sink for development
//!
//! Appends outgoing mail to a bounded JSON file instead of sending it, so the
//! messages a process would have sent can be inspected later.
//!
//! # Security Warning
//!
//! The log stores full message bodies, which may contain tokens or PII.
//! **Do not use in production.**

use crate::error::{MailError, Result};
use crate::traits::mailer::{Email, Mailer, Recipients};
use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default upper bound on the number of entries kept in the mail log
pub const MAX_LOG_SIZE: usize = 16;

/// Default location of the mail log, relative to the working directory
pub const DEFAULT_LOG_PATH: &str = "logs/mail.log";

/// What to do when the mail log does not contain a valid JSON array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptLogPolicy {
    /// Fail with [`MailError::LogCorrupt`] and leave the file untouched
    #[default]
    Fail,
    /// Warn and treat the log as empty; the next append overwrites it
    Reset,
}

impl FromStr for CorruptLogPolicy {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "reset" => Ok(Self::Reset),
            other => Err(MailError::config(format!(
                "MAIL_LOG_ON_CORRUPT must be 'fail' or 'reset', got '{}'",
                other
            ))),
        }
    }
}

/// Mail log configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MailLogConfig {
    /// Path of the JSON log file
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Maximum number of entries kept; oldest are evicted first
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default)]
    pub on_corrupt: CorruptLogPolicy,
}

impl Default for MailLogConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            max_entries: default_max_entries(),
            on_corrupt: CorruptLogPolicy::default(),
        }
    }
}

impl MailLogConfig {
    /// Load mail log configuration from environment variables
    ///
    /// Reads `MAIL_LOG_PATH`, `MAIL_LOG_MAX_ENTRIES` and `MAIL_LOG_ON_CORRUPT`
    /// (each also as `MAILDISPATCH_{NAME}`); unset values keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&get_env_with_prefix)
    }

    /// Load mail log configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("MAIL_LOG_PATH").filter(|p| !p.trim().is_empty()) {
            config.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("MAIL_LOG_MAX_ENTRIES") {
            config.max_entries = match max.trim().parse() {
                Ok(0) | Err(_) => {
                    return Err(MailError::config(format!(
                        "MAIL_LOG_MAX_ENTRIES must be a number greater than 0, got '{}'",
                        max
                    )));
                }
                Ok(n) => n,
            };
        }

        if let Some(policy) = lookup("MAIL_LOG_ON_CORRUPT") {
            config.on_corrupt = policy.parse()?;
        }

        Ok(config)
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_PATH)
}

fn default_max_entries() -> usize {
    MAX_LOG_SIZE
}

/// One logged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub to: Recipients,
    pub subject: String,
    pub body: String,
    /// Plain-text alternative for HTML mail, `null` for text mail
    pub alt: Option<String>,
    /// Unix timestamp (seconds) of the append
    pub time: i64,
}

impl LogEntry {
    pub fn from_email(email: &Email, time: i64) -> Self {
        Self {
            to: email.to.clone(),
            subject: email.subject.clone(),
            body: email.body.clone(),
            alt: email.alt_body(),
            time,
        }
    }
}

/// Holds an OS lock on the log file until dropped
struct LockedFile {
    file: File,
}

impl LockedFile {
    fn exclusive(file: File) -> io::Result<Self> {
        file.lock()?;
        Ok(Self { file })
    }

    fn shared(file: File) -> io::Result<Self> {
        file.lock_shared()?;
        Ok(Self { file })
    }

    fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        let mut contents = Vec::new();
        self.file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    fn overwrite(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(bytes)?;
        self.file.flush()
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(error = %e, "Failed to release mail log lock");
        }
    }
}

/// Bounded JSON file of [`LogEntry`] values, oldest first
///
/// Appends hold an exclusive lock for the whole read-modify-write; reads hold
/// a shared lock. Callers in other threads or processes are serialized by the
/// OS, so the file always holds a complete JSON array.
#[derive(Debug, Clone)]
pub struct MailLog {
    path: PathBuf,
    max_entries: usize,
    on_corrupt: CorruptLogPolicy,
}

impl MailLog {
    /// Create a mail log at `path` with the default bound
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_entries: MAX_LOG_SIZE,
            on_corrupt: CorruptLogPolicy::default(),
        }
    }

    pub fn from_config(config: &MailLogConfig) -> Self {
        Self {
            path: config.path.clone(),
            max_entries: config.max_entries.max(1),
            on_corrupt: config.on_corrupt,
        }
    }

    /// Set the maximum number of entries kept (at least 1)
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptLogPolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Append an entry, evicting the oldest ones beyond the bound
    ///
    /// The file and its parent directory are created if missing.
    pub fn append(&self, entry: LogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        let mut locked = LockedFile::exclusive(file)?;

        let mut entries = self.parse(&locked.read_bytes()?)?;
        entries.push(entry);

        let overflow = entries.len().saturating_sub(self.max_entries);
        if overflow > 0 {
            entries.drain(..overflow);
            tracing::debug!(path = %self.path.display(), evicted = overflow, "Evicted oldest mail log entries");
        }

        let json = serde_json::to_vec(&entries)?;
        locked.overwrite(&json)?;

        tracing::debug!(path = %self.path.display(), entries = entries.len(), "Appended mail log entry");
        Ok(())
    }

    /// Read every entry, oldest first
    ///
    /// A missing or empty file is an empty log.
    pub fn read_all(&self) -> Result<Vec<LogEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let contents = LockedFile::shared(file)?.read_bytes()?;
        self.parse(&contents)
    }

    /// Bytes that are not valid UTF-8 JSON go through the corrupt-log policy
    fn parse(&self, contents: &[u8]) -> Result<Vec<LogEntry>> {
        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        match serde_json::from_slice(contents) {
            Ok(entries) => Ok(entries),
            Err(e) => match self.on_corrupt {
                CorruptLogPolicy::Fail => Err(MailError::log_corrupt(&self.path, e.to_string())),
                CorruptLogPolicy::Reset => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Mail log is corrupt, starting a fresh log"
                    );
                    Ok(Vec::new())
                }
            },
        }
    }
}

/// A sink that writes mail to the [`MailLog`] instead of sending it
///
/// # Example
///
/// ```rust,ignore
/// use maildispatch::{LogSink, MailLog, Mailer};
///
/// let sink = LogSink::new(MailLog::new("logs/mail.log"));
/// sink.send_text(["a@x.com", "b@x.com"], "Subj", "Body")?;
///
/// assert_eq!(sink.log().read_all()?.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct LogSink {
    log: MailLog,
}

impl LogSink {
    pub fn new(log: MailLog) -> Self {
        Self { log }
    }

    pub fn from_config(config: &MailLogConfig) -> Self {
        Self::new(MailLog::from_config(config))
    }

    pub fn log(&self) -> &MailLog {
        &self.log
    }
}

impl Mailer for LogSink {
    fn send(&self, email: &Email) -> Result<()> {
        email.validate()?;

        let entry = LogEntry::from_email(email, chrono::Utc::now().timestamp());
        self.log.append(entry)?;

        tracing::info!(
            path = %self.log.path().display(),
            recipients = email.to.len(),
            html = email.is_html(),
            "Mail written to log instead of sending"
        );
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.log.read_all().is_ok()
    }
}
