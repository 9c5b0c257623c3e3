use std::error::Error as _;
use std::path::PathBuf;

/// The main error type for maildispatch
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The SMTP transport rejected or failed to deliver the message
    #[error("Mailer error ({message}): {info}")]
    Mailer { message: String, info: String },

    /// The mail log holds content that is not a JSON array of entries
    #[error("Mail log {} is corrupt: {reason}", path.display())]
    LogCorrupt { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MailError {
    pub fn mailer(message: impl Into<String>, info: impl Into<String>) -> Self {
        Self::Mailer {
            message: message.into(),
            info: info.into(),
        }
    }

    pub fn log_corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::LogCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }

    pub fn invalid_message(msg: impl Into<String>) -> Self {
        Self::InvalidMessage(msg.into())
    }

    /// Returns true if the error came from the SMTP transport
    pub fn is_mailer(&self) -> bool {
        matches!(self, Self::Mailer { .. })
    }

    /// Returns true if the error is a corrupt mail log
    pub fn is_log_corrupt(&self) -> bool {
        matches!(self, Self::LogCorrupt { .. })
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        // Status code when the server answered, otherwise the underlying cause chain
        let info = match err.status() {
            Some(code) => format!("SMTP status {}", code),
            None => {
                let mut causes = Vec::new();
                let mut source = err.source();
                while let Some(cause) = source {
                    causes.push(cause.to_string());
                    source = cause.source();
                }
                if causes.is_empty() {
                    "no further details".to_string()
                } else {
                    causes.join(": ")
                }
            }
        };
        MailError::Mailer {
            message: err.to_string(),
            info,
        }
    }
}

/// Result type alias for maildispatch operations
pub type Result<T> = std::result::Result<T, MailError>;
