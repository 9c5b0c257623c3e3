//! Trait definitions for extensible components
//!
//! The [`mailer::Mailer`] trait lets the dispatcher swap delivery backends or
//! accept a user-provided one.

pub mod mailer;
