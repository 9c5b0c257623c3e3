//! maildispatch - Send mail through an SMTP relay, or log it locally instead
//!
//! A [`MailDispatcher`] is built once from a [`MailConfig`] and hands every
//! message to one of two sinks:
//!
//! - **SMTP**: real delivery through a relay over STARTTLS, using lettre
//! - **LOG**: appends the message to a bounded JSON file (`logs/mail.log` by
//!   default) so development and test runs can inspect what would have been sent
//!
//! HTML mail carries a plain-text alternative derived by stripping every tag
//! except anchors.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use maildispatch::{MailConfigBuilder, MailDispatcher, Mailer};
//!
//! fn main() -> maildispatch::Result<()> {
//!     // Initialize logging
//!     maildispatch::init_tracing();
//!
//!     // EMAIL_METHOD=LOG or EMAIL_METHOD=SMTP plus SMTP_* settings
//!     let config = MailConfigBuilder::new().from_env().build()?;
//!     let mailer = MailDispatcher::from_config(&config)?;
//!
//!     mailer.send_text(["a@x.com", "b@x.com"], "Subj", "Body")?;
//!     Ok(())
//! }
//! ```

mod config;
mod dispatcher;
pub mod email;
mod error;
pub mod traits;
pub mod utils;

// Re-exports for public API
pub use config::{EmailMethod, LoggingConfig, MailConfig, MailConfigBuilder};
pub use dispatcher::{MailDispatcher, Transport};
pub use email::{
    CorruptLogPolicy, LogEntry, LogSink, MailLog, MailLogConfig, SmtpConfig, SmtpSink,
    plaintext_of,
};
pub use error::{MailError, Result};
pub use traits::mailer::{BodyKind, Email, Mailer, Recipients};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// Call this early in `main()`, before building the dispatcher.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Overrides the level (e.g., "debug", "maildispatch=debug")
/// - `LOG_LEVEL`: Default level when `RUST_LOG` is unset (default: info)
/// - `LOG_JSON`: Set to "true" for JSON formatted logs
///
/// `LOG_LEVEL` and `LOG_JSON` are also read as `MAILDISPATCH_{NAME}`.
pub fn init_tracing() {
    let (logging, invalid) = match LoggingConfig::from_env() {
        Ok(logging) => (logging, None),
        Err(e) => (LoggingConfig::default(), Some(e)),
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    install_subscriber(env_filter, logging.json);

    if let Some(e) = invalid {
        tracing::warn!(error = %e, "Ignoring invalid logging settings");
    }
}

/// Initialize tracing from the logging section of a [`MailConfig`]
///
/// `RUST_LOG` still takes precedence over the configured level.
pub fn init_tracing_with_config(config: &MailConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    install_subscriber(env_filter, config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
