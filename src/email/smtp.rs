//! SMTP sink using lettre
//!
//! Sends emails through an SMTP relay over STARTTLS.

use crate::error::{MailError, Result};
use crate::traits::mailer::{Email, Mailer};
use crate::utils::get_env_with_prefix;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Address, Message, SmtpTransport, Transport as _,
};
use serde::{Deserialize, Serialize};

/// SMTP configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port (default: 587 for STARTTLS)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username for authentication
    #[serde(default)]
    pub username: Option<String>,
    /// Password for authentication
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Envelope and display sender address
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    /// Reply-To address (optional)
    #[serde(default)]
    pub reply_address: Option<String>,
    #[serde(default)]
    pub reply_name: Option<String>,
}

fn default_port() -> u16 {
    587
}

impl SmtpConfig {
    /// Create a new SMTP configuration with the server hostname
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: None,
            password: None,
            from_address: None,
            from_name: None,
            reply_address: None,
            reply_name: None,
        }
    }

    /// Set the port (default: 587)
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set authentication credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the sender address and optional display name
    pub fn from(mut self, address: impl Into<String>, name: Option<&str>) -> Self {
        self.from_address = Some(address.into());
        self.from_name = name.map(str::to_string);
        self
    }

    /// Set the Reply-To address and optional display name
    pub fn reply_to(mut self, address: impl Into<String>, name: Option<&str>) -> Self {
        self.reply_address = Some(address.into());
        self.reply_name = name.map(str::to_string);
        self
    }

    /// Create config from environment variables
    ///
    /// Reads from (each also as `MAILDISPATCH_{NAME}`):
    /// - `SMTP_HOST` (required)
    /// - `SMTP_PORT` (optional, default: 587)
    /// - `SMTP_USER`, `SMTP_PASS` (optional)
    /// - `EMAIL_FROM_ADDRESS`, `EMAIL_FROM_NAME`
    /// - `EMAIL_REPLY_ADDRESS`, `EMAIL_REPLY_NAME` (optional)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&get_env_with_prefix)
    }

    /// Create config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SMTP_HOST")
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| MailError::config("SMTP_HOST environment variable not set"))?;

        let port = match lookup("SMTP_PORT") {
            Some(p) => p.trim().parse().map_err(|_| {
                MailError::config(format!("SMTP_PORT must be a port number, got '{}'", p))
            })?,
            None => default_port(),
        };

        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Ok(Self {
            host,
            port,
            username: non_empty("SMTP_USER"),
            password: non_empty("SMTP_PASS"),
            from_address: non_empty("EMAIL_FROM_ADDRESS"),
            from_name: non_empty("EMAIL_FROM_NAME"),
            reply_address: non_empty("EMAIL_REPLY_ADDRESS"),
            reply_name: non_empty("EMAIL_REPLY_NAME"),
        })
    }

    /// Check the settings an SMTP sink cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(MailError::config("SMTP host must not be empty"));
        }
        if self.port == 0 {
            return Err(MailError::config("SMTP port must be greater than 0"));
        }
        if self.from_address.as_deref().is_none_or(|a| a.trim().is_empty()) {
            return Err(MailError::config(
                "EMAIL_FROM_ADDRESS is required when EMAIL_METHOD is SMTP",
            ));
        }
        Ok(())
    }

    fn from_mailbox(&self) -> Result<Mailbox> {
        let address = self
            .from_address
            .as_deref()
            .ok_or_else(|| MailError::config("No 'from' address configured"))?;
        mailbox(address, self.from_name.as_deref(), "from")
    }

    fn reply_mailbox(&self) -> Result<Option<Mailbox>> {
        self.reply_address
            .as_deref()
            .map(|address| mailbox(address, self.reply_name.as_deref(), "reply_to"))
            .transpose()
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("reply_address", &self.reply_address)
            .field("reply_name", &self.reply_name)
            .finish()
    }
}

fn mailbox(address: &str, name: Option<&str>, field: &str) -> Result<Mailbox> {
    let address: Address = address.trim().parse().map_err(|e| {
        MailError::invalid_address(format!("Invalid '{}' address '{}': {}", field, address, e))
    })?;
    Ok(Mailbox::new(name.map(str::to_string), address))
}

/// SMTP sink using lettre
///
/// Every send opens a STARTTLS connection to the relay and makes exactly one
/// delivery attempt. Failures surface as [`MailError::Mailer`].
///
/// # Example
///
/// ```rust,ignore
/// use maildispatch::{Mailer, SmtpConfig, SmtpSink};
///
/// let config = SmtpConfig::new("smtp.example.com")
///     .credentials("user", "app-password")
///     .from("noreply@example.com", Some("Example"));
///
/// let sink = SmtpSink::new(config)?;
/// sink.send_html("user@example.com", "Welcome!", "<h1>Welcome</h1>")?;
/// ```
pub struct SmtpSink {
    transport: SmtpTransport,
    config: SmtpConfig,
    from: Mailbox,
    reply_to: Option<Mailbox>,
}

impl SmtpSink {
    /// Create a new SMTP sink with the given configuration
    pub fn new(config: SmtpConfig) -> Result<Self> {
        config.validate()?;
        let from = config.from_mailbox()?;
        let reply_to = config.reply_mailbox()?;

        let mut builder = SmtpTransport::starttls_relay(&config.host)
            .map_err(|e| MailError::config(format!("Failed to create SMTP transport: {}", e)))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            config,
            from,
            reply_to,
        })
    }

    /// Create a new SMTP sink from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(SmtpConfig::from_env()?)
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    fn build_message(&self, email: &Email) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject.clone());

        if let Some(ref reply_to) = self.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }

        for to in email.to.iter() {
            let mailbox: Mailbox = to.trim().parse().map_err(|e| {
                MailError::invalid_address(format!("Invalid 'to' address '{}': {}", to, e))
            })?;
            builder = builder.to(mailbox);
        }

        let message = match email.alt_body() {
            Some(alt) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(alt),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.body.clone()),
                    ),
            ),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.body.clone()),
        };

        message.map_err(|e| MailError::invalid_message(format!("Failed to build email: {}", e)))
    }
}

impl Mailer for SmtpSink {
    fn send(&self, email: &Email) -> Result<()> {
        email.validate()?;

        let message = self.build_message(email)?;

        self.transport.send(&message).map_err(|e| {
            let err = MailError::from(e);
            tracing::error!(
                host = %self.config.host,
                port = self.config.port,
                error = %err,
                "SMTP delivery failed"
            );
            err
        })?;

        tracing::info!(
            host = %self.config.host,
            recipients = email.to.len(),
            html = email.is_html(),
            "Mail handed to SMTP relay"
        );
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.transport.test_connection() {
            Ok(connected) => connected,
            Err(e) => {
                tracing::warn!(host = %self.config.host, error = %e, "SMTP relay unreachable");
                false
            }
        }
    }
}

// Manual Debug since SmtpTransport doesn't impl Debug
impl std::fmt::Debug for SmtpSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSink")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .finish()
    }
}
