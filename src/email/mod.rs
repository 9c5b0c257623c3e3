//! Email sending functionality
//!
//! This module provides the two sinks a [`crate::MailDispatcher`] can select:
//! - `LogSink` - Appends mail to a bounded local JSON log (for development)
//! - `SmtpSink` - Sends mail via an SMTP relay using lettre
//!
//! # Example
//!
//! ```rust,ignore
//! use maildispatch::email::{LogSink, MailLog};
//! use maildispatch::Mailer;
//!
//! let sink = LogSink::new(MailLog::new("logs/mail.log"));
//! sink.send_html("user@example.com", "Welcome!", "<h1>Thanks for signing up!</h1>")?;
//!
//! for entry in sink.log().read_all()? {
//!     println!("{} -> {:?}", entry.subject, entry.to);
//! }
//! ```

mod log;
mod plaintext;
mod smtp;

pub use log::{
    CorruptLogPolicy, DEFAULT_LOG_PATH, LogEntry, LogSink, MAX_LOG_SIZE, MailLog, MailLogConfig,
};
pub use plaintext::plaintext_of;
pub use smtp::{SmtpConfig, SmtpSink};

// Re-export message types from traits for convenience
pub use crate::traits::mailer::{BodyKind, Email, Recipients};
