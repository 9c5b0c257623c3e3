use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::email::{MailLogConfig, SmtpConfig};
use crate::error::{MailError, Result};
use crate::utils::get_env_with_prefix;

/// How outgoing mail is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmailMethod {
    /// Deliver through the configured SMTP relay
    Smtp,
    /// Append to the local mail log instead of sending
    Log,
}

impl EmailMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smtp => "SMTP",
            Self::Log => "LOG",
        }
    }
}

impl fmt::Display for EmailMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailMethod {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("smtp") {
            Ok(Self::Smtp)
        } else if value.eq_ignore_ascii_case("log") {
            Ok(Self::Log)
        } else {
            Err(MailError::config(format!(
                "Unknown EMAIL_METHOD '{}'. Must be one of: SMTP, LOG",
                value
            )))
        }
    }
}

/// Complete configuration for a [`crate::MailDispatcher`]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    pub method: EmailMethod,
    /// SMTP settings; required when `method` is SMTP
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    #[serde(default)]
    pub log: MailLogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

impl LoggingConfig {
    /// Read `LOG_LEVEL` and `LOG_JSON` from the environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(get_env_with_prefix)
    }

    /// Read `LOG_LEVEL` and `LOG_JSON` from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(level) = lookup("LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            config.level = level.trim().to_string();
        }

        if let Some(json) = lookup("LOG_JSON") {
            config.json = match json.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" | "" => false,
                _ => {
                    return Err(MailError::config(format!(
                        "LOG_JSON must be 'true' or 'false', got '{}'",
                        json
                    )));
                }
            };
        }

        Ok(config)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

/// Builder for [`MailConfig`] with environment variable support
///
/// Malformed values read by [`from_env`](Self::from_env) are collected and
/// reported together by [`build`](Self::build).
#[must_use = "builder does nothing until you call build()"]
#[derive(Debug, Default)]
pub struct MailConfigBuilder {
    method: Option<EmailMethod>,
    smtp: Option<SmtpConfig>,
    log: MailLogConfig,
    logging: LoggingConfig,
    invalid: Vec<String>,
}

impl MailConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: EmailMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_smtp(mut self, smtp: SmtpConfig) -> Self {
        self.smtp = Some(smtp);
        self
    }

    pub fn with_log(mut self, log: MailLogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn with_log_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.log.path = path.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.logging.json = enabled;
        self
    }

    /// Load configuration from environment variables with MAILDISPATCH_ prefix
    pub fn from_env(self) -> Self {
        self.from_lookup(get_env_with_prefix)
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Keys are the unprefixed variable names (`EMAIL_METHOD`, `SMTP_HOST`, ...).
    pub fn from_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(method) = lookup("EMAIL_METHOD") {
            match method.parse() {
                Ok(m) => self.method = Some(m),
                Err(e) => self.invalid.push(display_inner(e)),
            }
        }

        // SMTP settings are only read when a host is configured
        if lookup("SMTP_HOST").is_some() {
            match SmtpConfig::from_lookup(&lookup) {
                Ok(smtp) => self.smtp = Some(smtp),
                Err(e) => self.invalid.push(display_inner(e)),
            }
        }

        match MailLogConfig::from_lookup(&lookup) {
            Ok(log) => self.log = log,
            Err(e) => self.invalid.push(display_inner(e)),
        }

        match LoggingConfig::from_lookup(&lookup) {
            Ok(logging) => self.logging = logging,
            Err(e) => self.invalid.push(display_inner(e)),
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Config`] if:
    /// - `EMAIL_METHOD` is missing or not one of `SMTP`, `LOG`
    /// - SMTP is selected without a host or a from address
    /// - the mail log bound is zero
    /// - the log level is invalid
    /// - any value read from the environment failed to parse
    pub fn build(self) -> Result<MailConfig> {
        if !self.invalid.is_empty() {
            return Err(MailError::config(self.invalid.join("; ")));
        }

        let method = self.method.ok_or_else(|| {
            MailError::config("EMAIL_METHOD is not set. Must be one of: SMTP, LOG")
        })?;

        if method == EmailMethod::Smtp {
            let smtp = self.smtp.as_ref().ok_or_else(|| {
                MailError::config("SMTP_HOST is required when EMAIL_METHOD is SMTP")
            })?;
            smtp.validate()?;
        }

        if self.log.max_entries == 0 {
            return Err(MailError::config(
                "Mail log max_entries must be greater than 0",
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(MailError::config(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        Ok(MailConfig {
            method,
            smtp: self.smtp,
            log: self.log,
            logging: self.logging,
        })
    }
}

/// Message of a config error without the "Configuration error:" prefix
fn display_inner(err: MailError) -> String {
    match err {
        MailError::Config(msg) => msg,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::CorruptLogPolicy;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_email_method_parse() {
        assert_eq!("SMTP".parse::<EmailMethod>().unwrap(), EmailMethod::Smtp);
        assert_eq!("log".parse::<EmailMethod>().unwrap(), EmailMethod::Log);
        assert_eq!(" Log ".parse::<EmailMethod>().unwrap(), EmailMethod::Log);
        assert!("STMP".parse::<EmailMethod>().is_err());
        assert!("".parse::<EmailMethod>().is_err());
    }

    #[test]
    fn test_log_method_from_lookup() {
        let config = MailConfigBuilder::new()
            .from_lookup(lookup(&[("EMAIL_METHOD", "LOG")]))
            .build()
            .unwrap();

        assert_eq!(config.method, EmailMethod::Log);
        assert!(config.smtp.is_none());
        assert_eq!(config.log.path, std::path::PathBuf::from("logs/mail.log"));
        assert_eq!(config.log.max_entries, 16);
        assert_eq!(config.log.on_corrupt, CorruptLogPolicy::Fail);
    }

    #[test]
    fn test_smtp_method_from_lookup() {
        let config = MailConfigBuilder::new()
            .from_lookup(lookup(&[
                ("EMAIL_METHOD", "SMTP"),
                ("SMTP_HOST", "smtp.example.com"),
                ("SMTP_PORT", "2525"),
                ("SMTP_USER", "mailer"),
                ("SMTP_PASS", "secret"),
                ("EMAIL_FROM_ADDRESS", "noreply@example.com"),
                ("EMAIL_FROM_NAME", "Example"),
                ("EMAIL_REPLY_ADDRESS", "support@example.com"),
                ("EMAIL_REPLY_NAME", "Support"),
            ]))
            .build()
            .unwrap();

        assert_eq!(config.method, EmailMethod::Smtp);
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 2525);
        assert_eq!(smtp.username.as_deref(), Some("mailer"));
        assert_eq!(smtp.password.as_deref(), Some("secret"));
        assert_eq!(smtp.from_address.as_deref(), Some("noreply@example.com"));
        assert_eq!(smtp.from_name.as_deref(), Some("Example"));
        assert_eq!(smtp.reply_address.as_deref(), Some("support@example.com"));
        assert_eq!(smtp.reply_name.as_deref(), Some("Support"));
    }

    #[test]
    fn test_missing_method_fails() {
        let err = MailConfigBuilder::new()
            .from_lookup(lookup(&[]))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("EMAIL_METHOD is not set"));
    }

    #[test]
    fn test_unknown_method_fails() {
        let err = MailConfigBuilder::new()
            .from_lookup(lookup(&[("EMAIL_METHOD", "SENDMAIL")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, MailError::Config(_)));
        assert!(err.to_string().contains("Unknown EMAIL_METHOD 'SENDMAIL'"));
    }

    #[test]
    fn test_smtp_requires_host() {
        let err = MailConfigBuilder::new()
            .from_lookup(lookup(&[
                ("EMAIL_METHOD", "SMTP"),
                ("EMAIL_FROM_ADDRESS", "noreply@example.com"),
            ]))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("SMTP_HOST is required"));
    }

    #[test]
    fn test_smtp_requires_from_address() {
        let err = MailConfigBuilder::new()
            .from_lookup(lookup(&[
                ("EMAIL_METHOD", "SMTP"),
                ("SMTP_HOST", "smtp.example.com"),
            ]))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("EMAIL_FROM_ADDRESS"));
    }

    #[test]
    fn test_invalid_values_are_reported_together() {
        let err = MailConfigBuilder::new()
            .from_lookup(lookup(&[
                ("EMAIL_METHOD", "LOG"),
                ("SMTP_HOST", "smtp.example.com"),
                ("SMTP_PORT", "not-a-port"),
                ("MAIL_LOG_MAX_ENTRIES", "lots"),
            ]))
            .build()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SMTP_PORT"));
        assert!(msg.contains("MAIL_LOG_MAX_ENTRIES"));
    }

    #[test]
    fn test_log_settings_from_lookup() {
        let config = MailConfigBuilder::new()
            .from_lookup(lookup(&[
                ("EMAIL_METHOD", "LOG"),
                ("MAIL_LOG_PATH", "/tmp/outbox.json"),
                ("MAIL_LOG_MAX_ENTRIES", "4"),
                ("MAIL_LOG_ON_CORRUPT", "reset"),
                ("LOG_LEVEL", "debug"),
                ("LOG_JSON", "true"),
            ]))
            .build()
            .unwrap();

        assert_eq!(config.log.path, std::path::PathBuf::from("/tmp/outbox.json"));
        assert_eq!(config.log.max_entries, 4);
        assert_eq!(config.log.on_corrupt, CorruptLogPolicy::Reset);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_logging_config_from_lookup() {
        let logging = LoggingConfig::from_lookup(lookup(&[("LOG_LEVEL", "debug"), ("LOG_JSON", "TRUE")]))
            .unwrap();
        assert_eq!(logging.level, "debug");
        assert!(logging.json);

        let defaults = LoggingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(defaults.level, "info");
        assert!(!defaults.json);
    }

    #[test]
    fn test_unparsable_log_json_is_reported() {
        let err = MailConfigBuilder::new()
            .from_lookup(lookup(&[("EMAIL_METHOD", "LOG"), ("LOG_JSON", "yes")]))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("LOG_JSON must be 'true' or 'false', got 'yes'"));
    }

    #[test]
    fn test_zero_max_entries_from_lookup_fails() {
        let err = MailConfigBuilder::new()
            .from_lookup(lookup(&[("EMAIL_METHOD", "LOG"), ("MAIL_LOG_MAX_ENTRIES", "0")]))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("MAIL_LOG_MAX_ENTRIES"));
    }

    #[test]
    fn test_zero_max_entries_fails() {
        let err = MailConfigBuilder::new()
            .with_method(EmailMethod::Log)
            .with_log(MailLogConfig {
                max_entries: 0,
                ..MailLogConfig::default()
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("max_entries"));
    }

    #[test]
    fn test_invalid_log_level_fails() {
        let err = MailConfigBuilder::new()
            .with_method(EmailMethod::Log)
            .with_log_level("verbose")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: MailConfig = serde_json::from_str(
            r#"{"method": "LOG", "log": {"path": "var/mail.json"}}"#,
        )
        .unwrap();

        assert_eq!(config.method, EmailMethod::Log);
        assert_eq!(config.log.path, std::path::PathBuf::from("var/mail.json"));
        assert_eq!(config.log.max_entries, 16);
        assert_eq!(config.logging.level, "info");
    }
}
