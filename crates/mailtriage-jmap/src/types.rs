//! JMAP wire types.
//!
//! Only the subset of RFC 8620/8621 objects the triage run touches is
//! modelled here. Unknown fields are ignored on deserialization.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The JMAP mail capability URN.
pub const MAIL_CAPABILITY: &str = "urn:ietf:params:jmap:mail";

/// Identifier of a mailbox on the server.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MailboxId(pub String);

impl MailboxId {
    /// Creates a new mailbox id from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MailboxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message on the server.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailId(pub String);

impl EmailId {
    /// Creates a new email id from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The session resource returned by the well-known endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// URL to POST API requests to.
    pub api_url: String,
    /// Primary account id per capability URN.
    #[serde(default)]
    pub primary_accounts: BTreeMap<String, String>,
}

impl Session {
    /// Returns the primary mail account id, if the server advertises one.
    #[must_use]
    pub fn primary_mail_account(&self) -> Option<&str> {
        self.primary_accounts
            .get(MAIL_CAPABILITY)
            .map(String::as_str)
    }
}

/// A mailbox (folder/label) on the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mailbox {
    /// Server-assigned identifier.
    pub id: MailboxId,
    /// Display name.
    pub name: String,
    /// Special-use role (`inbox`, `archive`, ...), if any.
    #[serde(default)]
    pub role: Option<String>,
    /// Total number of messages in this mailbox.
    #[serde(default)]
    pub total_emails: u64,
}

/// A single address in a `from`/`to` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name, if present.
    #[serde(default)]
    pub name: Option<String>,
    /// Address (`user@example.com`).
    pub email: String,
}

impl EmailAddress {
    /// The identity used for ledger deduplication: display name when
    /// present, address otherwise.
    #[must_use]
    pub fn identity(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => &self.email,
        }
    }
}

/// A raw header field (name/value pair) in original message order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailHeader {
    /// Header field name.
    pub name: String,
    /// Decoded header field value.
    pub value: String,
}

/// Reference to one body part of a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPart {
    /// Part identifier, used to look up the fetched value.
    #[serde(default)]
    pub part_id: Option<String>,
    /// Media type of the part.
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
}

/// A fetched body part value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyValue {
    /// The decoded text content.
    pub value: String,
    /// Whether the server truncated the value.
    #[serde(default)]
    pub is_truncated: bool,
}

/// A message as fetched from the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    /// Server-assigned identifier.
    pub id: EmailId,
    /// Subject line, if present.
    #[serde(default)]
    pub subject: Option<String>,
    /// Sender list.
    #[serde(default)]
    pub from: Option<Vec<EmailAddress>>,
    /// Recipient list.
    #[serde(default)]
    pub to: Option<Vec<EmailAddress>>,
    /// Server receive time.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    /// Keyword set (`$seen`, custom markers, ...).
    #[serde(default)]
    pub keywords: BTreeMap<String, bool>,
    /// Mailbox membership set.
    #[serde(default)]
    pub mailbox_ids: BTreeMap<MailboxId, bool>,
    /// All header fields, in message order.
    #[serde(default)]
    pub headers: Vec<EmailHeader>,
    /// Plain-text body part references.
    #[serde(default)]
    pub text_body: Vec<BodyPart>,
    /// Fetched body values, keyed by part id.
    #[serde(default)]
    pub body_values: BTreeMap<String, BodyValue>,
    /// Server-generated preview snippet.
    #[serde(default)]
    pub preview: Option<String>,
}

impl Email {
    /// Looks up a header value by name, case-insensitively.
    ///
    /// Returns the first matching header in message order.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// The primary (first) sender address, if any.
    #[must_use]
    pub fn primary_from(&self) -> Option<&EmailAddress> {
        self.from.as_deref().and_then(<[EmailAddress]>::first)
    }

    /// Resolves the plain-text body content.
    ///
    /// Walks `textBody` in order and returns the first part whose fetched
    /// value is available.
    #[must_use]
    pub fn plain_text_body(&self) -> Option<&str> {
        self.text_body
            .iter()
            .filter_map(|part| part.part_id.as_deref())
            .find_map(|part_id| self.body_values.get(part_id))
            .map(|v| v.value.as_str())
    }
}
