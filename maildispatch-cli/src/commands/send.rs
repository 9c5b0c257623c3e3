//! Send command - dispatch one mail using the configured EMAIL_METHOD.

use anyhow::{Context, Result};
use maildispatch::{Email, EmailMethod, MailConfigBuilder, MailDispatcher, Mailer, Recipients};

use crate::cli::SendArgs;
use crate::{print_info, print_success};

/// Run the send command
pub fn run(args: SendArgs) -> Result<()> {
    let config = MailConfigBuilder::new()
        .from_env()
        .build()
        .context("Failed to load mail configuration")?;
    let mailer = MailDispatcher::from_config(&config)?;

    let email = build_email(args);
    print_info(&format!(
        "Sending to {} recipient(s) via {}",
        email.to.len(),
        config.method
    ));

    mailer.send(&email).context("Failed to send mail")?;

    match config.method {
        EmailMethod::Log => print_success(&format!(
            "Mail written to {}",
            config.log.path.display()
        )),
        EmailMethod::Smtp => print_success("Mail handed to SMTP relay"),
    }

    Ok(())
}

/// A single `--to` is kept as a single recipient, several as a list
fn build_email(args: SendArgs) -> Email {
    let to: Recipients = match <[String; 1]>::try_from(args.to) {
        Ok([single]) => single.into(),
        Err(many) => many.into(),
    };

    if args.html {
        Email::html(to, args.subject, args.body)
    } else {
        Email::text(to, args.subject, args.body)
    }
}
