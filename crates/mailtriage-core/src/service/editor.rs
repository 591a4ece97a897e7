//! Editor-facing service.
//!
//! The interactive surface talks to this in plain data contracts: ledger
//! text keyed by `kept`/`excluded`, lock state, and on-demand single
//! message fetches. Bad request fields become [`ValidationError`]s the
//! transport can map to a client error; everything else surfaces as an
//! internal error without taking the process down.
//!
//! Every data-saving write acquires the advisory lock; every read checks
//! it first so lazy expiry has a chance to run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mailtriage_jmap::{Client, Email, EmailAddress, EmailHeader, EmailId};
use serde::Serialize;
use tracing::info;

use crate::ledger::{self, LedgerKind, LedgerStore};
use crate::lock::EditLock;
use crate::time::Clock;

/// A request field the client got wrong. Recovered locally, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The `type` field is not one of `kept` / `excluded`.
    #[error("unknown ledger type: {0:?}")]
    UnknownKind(String),
    /// A required request field is missing or blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),
    /// The named sender has no entry in the source ledger.
    #[error("sender not found: {0:?}")]
    UnknownSender(String),
}

/// Errors from editor operations.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Invalid request; maps to a client error at the transport.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Anything else; maps to a server error, the process keeps serving.
    #[error(transparent)]
    Internal(#[from] crate::Error),
}

impl From<mailtriage_jmap::Error> for EditorError {
    fn from(e: mailtriage_jmap::Error) -> Self {
        Self::Internal(e.into())
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = std::result::Result<T, EditorError>;

/// A full single message, as the editor renders it.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDetail {
    /// Message id.
    pub id: String,
    /// Subject line.
    pub subject: String,
    /// Formatted sender addresses.
    pub from: Vec<String>,
    /// Formatted recipient addresses.
    pub to: Vec<String>,
    /// Server receive time.
    pub received_at: Option<DateTime<Utc>>,
    /// Plain-text body.
    pub body: String,
    /// All header fields in message order.
    pub headers: Vec<EmailHeader>,
}

impl From<Email> for MessageDetail {
    fn from(email: Email) -> Self {
        Self {
            id: email.id.to_string(),
            subject: email.subject.clone().unwrap_or_default(),
            from: email
                .from
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(format_address)
                .collect(),
            to: email
                .to
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(format_address)
                .collect(),
            received_at: email.received_at,
            body: email.plain_text_body().unwrap_or_default().to_string(),
            headers: email.headers,
        }
    }
}

fn validate_message_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::MissingField("id"));
    }
    Ok(())
}

fn format_address(address: &EmailAddress) -> String {
    match &address.name {
        Some(name) if !name.is_empty() => format!("{name} <{}>", address.email),
        _ => address.email.clone(),
    }
}

/// The service behind the interactive surface.
pub struct EditorService {
    store: LedgerStore,
    lock: EditLock,
}

impl EditorService {
    /// Creates the service over the ledger files with an injected clock
    /// for the advisory lock.
    #[must_use]
    pub fn new(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            lock: EditLock::new(clock),
        }
    }

    fn parse_kind(kind: &str) -> EditorResult<LedgerKind> {
        LedgerKind::parse(kind)
            .ok_or_else(|| ValidationError::UnknownKind(kind.to_string()).into())
    }

    /// Returns one ledger's content as normalized text.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown kind, or an internal
    /// error on I/O failure.
    pub fn ledger(&mut self, kind: &str) -> EditorResult<String> {
        let kind = Self::parse_kind(kind)?;
        self.lock.is_locked();
        let pair = self.store.load()?;
        Ok(ledger::render(pair.get(kind)))
    }

    /// Replaces one ledger's content wholesale and acquires the lock.
    ///
    /// The text is parsed and re-rendered through the model, so whatever
    /// the client sends comes back sorted and section-framed.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown kind, or an internal
    /// error on I/O failure.
    pub fn save_ledger(&mut self, kind: &str, content: &str) -> EditorResult<()> {
        let kind = Self::parse_kind(kind)?;
        let mut pair = self.store.load()?;
        *pair.get_mut(kind) = ledger::parse(content);
        self.store.persist(&pair)?;
        self.lock.acquire();
        info!(kind = kind.as_str(), "ledger saved");
        Ok(())
    }

    /// Moves a sender's entry from one ledger to the other, keeping it
    /// under the given label (or its original label when `label` is
    /// `None`). The emptied source section keeps its header. Acquires the
    /// lock.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown kind, a blank sender, or
    /// a sender with no entry in the source ledger.
    pub fn move_sender(
        &mut self,
        sender: &str,
        from_kind: &str,
        to_kind: &str,
        label: Option<&str>,
    ) -> EditorResult<()> {
        if sender.trim().is_empty() {
            return Err(ValidationError::MissingField("sender").into());
        }
        let from = Self::parse_kind(from_kind)?;
        let to = Self::parse_kind(to_kind)?;

        let mut pair = self.store.load()?;
        let (source_label, entry) = pair
            .get_mut(from)
            .take_sender(sender)
            .ok_or_else(|| ValidationError::UnknownSender(sender.to_string()))?;
        let target_label = label.unwrap_or(&source_label).to_string();
        pair.get_mut(to).add_entry(&target_label, entry);

        self.store.persist(&pair)?;
        self.lock.acquire();
        info!(sender, from = from.as_str(), to = to.as_str(), "moved sender");
        Ok(())
    }

    /// Whether the advisory lock is currently held (lazy expiry applied).
    pub fn lock_state(&mut self) -> bool {
        self.lock.is_locked()
    }

    /// Explicitly releases the advisory lock.
    pub fn release_lock(&mut self) {
        self.lock.release();
    }

    /// Fetches one full message from the store for display.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank id, or an internal error on
    /// any remote failure.
    pub async fn fetch_message(&self, client: &Client, id: &str) -> EditorResult<MessageDetail> {
        validate_message_id(id)?;
        let email = client.get_email(&EmailId::new(id)).await?;
        Ok(MessageDetail::from(email))
    }
}
