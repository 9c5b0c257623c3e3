//! Check command - validate configuration and report sink health.

use anyhow::Result;
use colored::Colorize;
use maildispatch::{EmailMethod, MailConfig, MailConfigBuilder, MailDispatcher, Mailer};

use crate::{print_error, print_info, print_success, print_warning};

/// Run the check command
pub fn run() -> Result<()> {
    println!("\n{} Checking mail configuration...\n", "maildispatch".cyan().bold());

    let config = load_config(MailConfigBuilder::new().from_env())?;
    print_success(&format!("EMAIL_METHOD is {}", config.method));

    match config.method {
        EmailMethod::Log => {
            print_info(&format!(
                "Mail log: {} (keeps {} entries)",
                config.log.path.display(),
                config.log.max_entries
            ));
            print_warning("LOG mode does not deliver mail. Do not use in production.");
        }
        EmailMethod::Smtp => {
            if let Some(ref smtp) = config.smtp {
                print_info(&format!("SMTP relay: {}:{} (STARTTLS)", smtp.host, smtp.port));
            }
        }
    }

    let mailer = MailDispatcher::from_config(&config)?;
    if mailer.is_healthy() {
        print_success("Sink is healthy");
    } else {
        print_error("Sink is not healthy");
        anyhow::bail!("{} sink failed its health check", config.method);
    }

    println!();
    Ok(())
}

/// Build the config, printing setup hints on failure
///
/// The error itself is reported once, by the caller.
fn load_config(builder: MailConfigBuilder) -> Result<MailConfig> {
    builder.build().map_err(|e| {
        println!("Set EMAIL_METHOD to SMTP or LOG. For SMTP also set:");
        println!("  SMTP_HOST=smtp.example.com");
        println!("  SMTP_PORT=587 (optional, default: 587)");
        println!("  SMTP_USER / SMTP_PASS");
        println!("  EMAIL_FROM_ADDRESS / EMAIL_FROM_NAME");
        println!("  EMAIL_REPLY_ADDRESS / EMAIL_REPLY_NAME (optional)\n");
        anyhow::Error::new(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_error_is_not_wrapped() {
        let err = load_config(MailConfigBuilder::new().from_lookup(|_: &str| None)).unwrap_err();

        assert_eq!(
            format!("{:#}", err),
            "Configuration error: EMAIL_METHOD is not set. Must be one of: SMTP, LOG"
        );
        assert_eq!(err.chain().count(), 1);
    }

    #[test]
    fn test_load_config_log_method() {
        let builder = MailConfigBuilder::new()
            .from_lookup(|key: &str| (key == "EMAIL_METHOD").then(|| "LOG".to_string()));

        let config = load_config(builder).unwrap();
        assert_eq!(config.method, EmailMethod::Log);
    }
}
