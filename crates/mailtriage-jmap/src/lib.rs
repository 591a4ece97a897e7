//! # mailtriage-jmap
//!
//! Minimal JMAP (RFC 8620/8621) client for the `mailtriage` rule engine.
//!
//! This crate covers only the calls the triage run needs:
//! - Session/account discovery
//! - Mailbox listing and idempotent creation
//! - Message query by mailbox (received time, descending, with a ceiling)
//! - Message fetch with an explicit property set (headers and body included)
//! - One batched message mutation (`Email/set`)
//!
//! There is no retry logic: a non-success response from the server is
//! surfaced as [`Error::Server`] and the caller decides what dies with it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod types;

pub use client::{Client, EmailPatch};
pub use error::{Error, Result};
pub use types::{Email, EmailAddress, EmailHeader, EmailId, Mailbox, MailboxId, Session};
