//! Mode-selecting mail dispatcher
//!
//! The transport is chosen once, when the dispatcher is built from a
//! [`MailConfig`]; sends never consult the environment.

use std::fmt;
use std::sync::Arc;

use crate::config::{EmailMethod, MailConfig, MailConfigBuilder};
use crate::email::{LogEntry, LogSink, MailLog, SmtpSink};
use crate::error::{MailError, Result};
use crate::traits::mailer::{Email, Mailer};

/// The sink a dispatcher hands mail to
pub enum Transport {
    /// Append to the local mail log
    Log(LogSink),
    /// Deliver through the SMTP relay
    Smtp(SmtpSink),
    /// A user-provided mailer, typically a fake in tests
    Custom(Arc<dyn Mailer>),
}

impl Transport {
    /// Build the transport selected by `config.method`
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        match config.method {
            EmailMethod::Log => Ok(Self::Log(LogSink::from_config(&config.log))),
            EmailMethod::Smtp => {
                let smtp = config.smtp.clone().ok_or_else(|| {
                    MailError::config("SMTP_HOST is required when EMAIL_METHOD is SMTP")
                })?;
                Ok(Self::Smtp(SmtpSink::new(smtp)?))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Log(_) => "log",
            Self::Smtp(_) => "smtp",
            Self::Custom(_) => "custom",
        }
    }
}

impl Mailer for Transport {
    fn send(&self, email: &Email) -> Result<()> {
        match self {
            Self::Log(sink) => sink.send(email),
            Self::Smtp(sink) => sink.send(email),
            Self::Custom(mailer) => mailer.send(email),
        }
    }

    fn is_healthy(&self) -> bool {
        match self {
            Self::Log(sink) => sink.is_healthy(),
            Self::Smtp(sink) => sink.is_healthy(),
            Self::Custom(mailer) => mailer.is_healthy(),
        }
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Log(sink) => f.debug_tuple("Log").field(sink).finish(),
            Self::Smtp(sink) => f.debug_tuple("Smtp").field(sink).finish(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Sends mail through the configured transport
///
/// # Example
///
/// ```rust,ignore
/// use maildispatch::{MailConfigBuilder, MailDispatcher, Mailer};
///
/// let config = MailConfigBuilder::new().from_env().build()?;
/// let mailer = MailDispatcher::from_config(&config)?;
///
/// mailer.send_text(["a@x.com", "b@x.com"], "Subj", "Body")?;
/// mailer.send_html("a@x.com", "Welcome", "<h1>Hi</h1> <a href='https://x.com'>start</a>")?;
///
/// for entry in mailer.mail_log()? {
///     println!("{}: {}", entry.time, entry.subject);
/// }
/// ```
#[derive(Debug)]
pub struct MailDispatcher {
    transport: Transport,
    log: MailLog,
}

impl MailDispatcher {
    /// Create a dispatcher from an explicit transport and the log it reports
    pub fn new(transport: Transport, log: MailLog) -> Self {
        Self { transport, log }
    }

    /// Create a dispatcher from a validated configuration
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let transport = Transport::from_config(config)?;
        tracing::debug!(method = %config.method, transport = transport.name(), "Mail dispatcher ready");
        Ok(Self::new(transport, MailLog::from_config(&config.log)))
    }

    /// Create a dispatcher from environment variables
    pub fn from_env() -> Result<Self> {
        let config = MailConfigBuilder::new().from_env().build()?;
        Self::from_config(&config)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Every entry of the mail log, oldest first
    ///
    /// Available in any mode; returns an empty list if nothing was logged.
    pub fn mail_log(&self) -> Result<Vec<LogEntry>> {
        self.log.read_all()
    }
}

impl Mailer for MailDispatcher {
    fn send(&self, email: &Email) -> Result<()> {
        tracing::debug!(
            transport = self.transport.name(),
            recipients = email.to.len(),
            html = email.is_html(),
            "Dispatching mail"
        );
        self.transport.send(email)
    }

    fn is_healthy(&self) -> bool {
        self.transport.is_healthy()
    }
}
