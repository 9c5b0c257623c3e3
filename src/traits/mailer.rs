//! Mailer trait for sending emails
//!
//! This trait abstracts the delivery backend, so the dispatcher can hand a
//! message to the SMTP relay, the local mail log, or an injected fake in tests.

use crate::email::plaintext_of;
use crate::error::{MailError, Result};
use serde::{Deserialize, Serialize};

/// One recipient address, or several
///
/// The shape given by the caller is kept when the message is written to the
/// mail log, so `"a@x.com"` stays a string and `["a@x.com"]` stays an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    /// Iterate over the recipient addresses
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(address) => std::slice::from_ref(address),
            Self::Many(addresses) => addresses,
        };
        slice.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(addresses) => addresses.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Self::One(address)
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Self::One(address.to_string())
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Self::Many(addresses)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(addresses: Vec<&str>) -> Self {
        Self::Many(addresses.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Recipients {
    fn from(addresses: &[&str]) -> Self {
        Self::Many(addresses.iter().map(|a| a.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Recipients {
    fn from(addresses: [&str; N]) -> Self {
        Self::Many(addresses.iter().map(|a| a.to_string()).collect())
    }
}

/// How the body of an [`Email`] is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// `text/plain`
    #[default]
    Text,
    /// `text/html`, with a derived plain-text alternative
    Html,
}

/// An email message to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Recipient address(es)
    pub to: Recipients,
    /// Email subject line
    pub subject: String,
    /// Message body, plain text or HTML per `kind`
    pub body: String,
    pub kind: BodyKind,
}

impl Email {
    /// Create a plain-text email
    pub fn text(
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            kind: BodyKind::Text,
        }
    }

    /// Create an HTML email
    pub fn html(
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            kind: BodyKind::Html,
            ..Self::text(to, subject, body)
        }
    }

    pub fn is_html(&self) -> bool {
        self.kind == BodyKind::Html
    }

    /// Plain-text alternative of an HTML body, `None` for text emails
    pub fn alt_body(&self) -> Option<String> {
        self.is_html().then(|| plaintext_of(&self.body))
    }

    /// Validate the email has at least one non-blank recipient
    ///
    /// Address syntax is left to the transport; the mail log accepts any string.
    pub fn validate(&self) -> Result<()> {
        if self.to.is_empty() {
            return Err(MailError::invalid_message("Email 'to' is required"));
        }
        if self.to.iter().any(|address| address.trim().is_empty()) {
            return Err(MailError::invalid_message("Email 'to' contains a blank address"));
        }
        Ok(())
    }
}

/// Mailer trait for sending emails
///
/// Implement this trait to plug a custom backend (for example a recording fake
/// in tests) into [`crate::Transport::Custom`].
///
/// # Example
///
/// ```rust,ignore
/// use maildispatch::{Email, Mailer, Result};
///
/// struct MyMailer;
///
/// impl Mailer for MyMailer {
///     fn send(&self, email: &Email) -> Result<()> {
///         // Deliver somewhere
///         Ok(())
///     }
///
///     fn is_healthy(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait Mailer: Send + Sync {
    /// Send an email
    ///
    /// Blocks until the backend has accepted or rejected the message. Exactly
    /// one attempt is made.
    fn send(&self, email: &Email) -> Result<()>;

    /// Check if the mailer backend is usable
    fn is_healthy(&self) -> bool;

    /// Send a plain-text email
    fn send_text(
        &self,
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<()>
    where
        Self: Sized,
    {
        self.send(&Email::text(to, subject, body))
    }

    /// Send an HTML email with a derived plain-text alternative
    fn send_html(
        &self,
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<()>
    where
        Self: Sized,
    {
        self.send(&Email::html(to, subject, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipients_from_single_and_many() {
        let one: Recipients = "a@x.com".into();
        assert_eq!(one, Recipients::One("a@x.com".to_string()));
        assert_eq!(one.len(), 1);

        let many: Recipients = ["a@x.com", "b@x.com"].into();
        assert_eq!(many.iter().collect::<Vec<_>>(), vec!["a@x.com", "b@x.com"]);
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_recipients_serialize_keeps_shape() {
        let one = serde_json::to_string(&Recipients::from("a@x.com")).unwrap();
        assert_eq!(one, "\"a@x.com\"");

        let many = serde_json::to_string(&Recipients::from(vec!["a@x.com"])).unwrap();
        assert_eq!(many, "[\"a@x.com\"]");

        let parsed: Recipients = serde_json::from_str("[\"a@x.com\",\"b@x.com\"]").unwrap();
        assert_eq!(parsed, Recipients::from(vec!["a@x.com", "b@x.com"]));
    }

    #[test]
    fn test_alt_body_only_for_html() {
        let text = Email::text("a@x.com", "Subj", "<b>Body</b>");
        assert!(!text.is_html());
        assert_eq!(text.alt_body(), None);

        let html = Email::html("a@x.com", "Subj", "<b>Body</b> <a href='/x'>x</a>");
        assert!(html.is_html());
        assert_eq!(html.alt_body(), Some("Body <a href='/x'>x</a>".to_string()));
    }

    #[test]
    fn test_validate_requires_recipient() {
        let email = Email::text(Vec::<String>::new(), "Subj", "Body");
        let err = email.validate().unwrap_err();
        assert!(err.to_string().contains("'to' is required"));
    }

    #[test]
    fn test_validate_rejects_blank_recipient() {
        let email = Email::text(["a@x.com", "  "], "Subj", "Body");
        let err = email.validate().unwrap_err();
        assert!(err.to_string().contains("blank address"));
    }

    #[test]
    fn test_validate_allows_empty_subject_and_body() {
        let email = Email::text("a@x.com", "", "");
        assert!(email.validate().is_ok());
    }
}
