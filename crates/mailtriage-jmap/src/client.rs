//! JMAP API client.
//!
//! One method call per request: the triage run issues few calls, so request
//! batching inside one envelope is not worth the response bookkeeping. The
//! one place the protocol's batching matters, mutating every modified
//! message at once, happens inside a single `Email/set` call instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{Email, EmailId, MAIL_CAPABILITY, Mailbox, MailboxId, Session};

/// The JMAP core capability URN.
const CORE_CAPABILITY: &str = "urn:ietf:params:jmap:core";

/// Ceiling on fetched body part size; enough for rule matching.
const MAX_BODY_VALUE_BYTES: u64 = 256 * 1024;

/// Properties requested on every message fetch.
const EMAIL_PROPERTIES: &[&str] = &[
    "id",
    "subject",
    "from",
    "to",
    "receivedAt",
    "keywords",
    "mailboxIds",
    "headers",
    "textBody",
    "preview",
];

/// A per-message mutation patch for `Email/set`.
///
/// Keys are JMAP patch paths (`mailboxIds/<id>`, `keywords/<kw>`); a value
/// of `Some(true)` adds, `None` serializes as `null` and removes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmailPatch(pub BTreeMap<String, Option<bool>>);

impl EmailPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the message to a mailbox.
    pub fn add_mailbox(&mut self, id: &MailboxId) {
        self.0.insert(format!("mailboxIds/{id}"), Some(true));
    }

    /// Removes the message from a mailbox.
    pub fn remove_mailbox(&mut self, id: &MailboxId) {
        self.0.insert(format!("mailboxIds/{id}"), None);
    }

    /// Clears a keyword from the message.
    pub fn remove_keyword(&mut self, keyword: &str) {
        self.0.insert(format!("keywords/{keyword}"), None);
    }

    /// Whether the patch contains no mutations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Response envelope for an API request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseEnvelope {
    method_responses: Vec<(String, Value, String)>,
}

/// Extracts the arguments of the expected method response, converting a
/// method-level `error` response into [`Error::Server`].
fn extract_response(envelope: ResponseEnvelope, method: &str) -> Result<Value> {
    for (name, args, _call_id) in envelope.method_responses {
        if name == method {
            return Ok(args);
        }
        if name == "error" {
            let error_type = args
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let description = args.get("description").and_then(Value::as_str);
            return Err(Error::method_error(error_type, description));
        }
    }
    Err(Error::MissingResponse(method.to_string()))
}

/// Authenticated client bound to one account on one server.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_url: String,
    account_id: String,
    token: String,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Discovers the session resource and binds to the primary mail account.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fetch fails or if the server does
    /// not advertise a primary account for the mail capability.
    pub async fn connect(base_url: &str, token: &str) -> Result<Self> {
        let http = reqwest::Client::new();
        let session_url = format!("{}/.well-known/jmap", base_url.trim_end_matches('/'));

        let response = http
            .get(&session_url)
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Server {
                status: response.status().to_string(),
                detail: format!("session fetch from {session_url} failed"),
            });
        }

        let session: Session = response.json().await?;
        let account_id = session
            .primary_mail_account()
            .ok_or_else(|| Error::MissingResponse("primary mail account".to_string()))?
            .to_string();
        debug!(%account_id, api_url = %session.api_url, "JMAP session established");

        Ok(Self {
            http,
            api_url: session.api_url,
            account_id,
            token: token.to_string(),
        })
    }

    /// Issues one method call and returns its response arguments.
    async fn call(&self, method: &str, args: Value) -> Result<Value> {
        let body = json!({
            "using": [CORE_CAPABILITY, MAIL_CAPABILITY],
            "methodCalls": [[method, args, "0"]],
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Server {
                status: response.status().to_string(),
                detail: format!("{method} request rejected"),
            });
        }

        let envelope: ResponseEnvelope = response.json().await?;
        extract_response(envelope, method)
    }

    /// Lists all mailboxes in the account.
    ///
    /// # Errors
    ///
    /// Returns an error on any transport or server failure.
    pub async fn list_mailboxes(&self) -> Result<Vec<Mailbox>> {
        let args = self
            .call(
                "Mailbox/get",
                json!({ "accountId": self.account_id, "ids": null }),
            )
            .await?;
        let list = args
            .get("list")
            .cloned()
            .ok_or_else(|| Error::MissingResponse("Mailbox/get list".to_string()))?;
        Ok(serde_json::from_value(list)?)
    }

    /// Creates a mailbox with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the server refuses the creation.
    pub async fn create_mailbox(&self, name: &str) -> Result<Mailbox> {
        let args = self
            .call(
                "Mailbox/set",
                json!({
                    "accountId": self.account_id,
                    "create": { "new": { "name": name } },
                }),
            )
            .await?;

        if let Some(created) = args.pointer("/created/new") {
            let id: MailboxId = serde_json::from_value(
                created
                    .get("id")
                    .cloned()
                    .ok_or_else(|| Error::MissingResponse("created mailbox id".to_string()))?,
            )?;
            debug!(%id, name, "created mailbox");
            return Ok(Mailbox {
                id,
                name: name.to_string(),
                role: None,
                total_emails: 0,
            });
        }

        let detail = args
            .pointer("/notCreated/new/description")
            .and_then(Value::as_str)
            .unwrap_or("creation rejected");
        Err(Error::Server {
            status: "Mailbox/set".to_string(),
            detail: format!("{name}: {detail}"),
        })
    }

    /// Queries message ids in a mailbox, newest first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error on any transport or server failure.
    pub async fn query_emails(&self, mailbox_id: &MailboxId, limit: u64) -> Result<Vec<EmailId>> {
        let args = self
            .call(
                "Email/query",
                json!({
                    "accountId": self.account_id,
                    "filter": { "inMailbox": mailbox_id },
                    "sort": [{ "property": "receivedAt", "isAscending": false }],
                    "limit": limit,
                }),
            )
            .await?;
        let ids = args
            .get("ids")
            .cloned()
            .ok_or_else(|| Error::MissingResponse("Email/query ids".to_string()))?;
        Ok(serde_json::from_value(ids)?)
    }

    /// Fetches messages by id with the full triage property set.
    ///
    /// When `fetch_body` is set, plain-text body values are fetched too
    /// (capped at 256 KiB per part).
    ///
    /// # Errors
    ///
    /// Returns an error on any transport or server failure.
    pub async fn get_emails(&self, ids: &[EmailId], fetch_body: bool) -> Result<Vec<Email>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let args = self
            .call(
                "Email/get",
                json!({
                    "accountId": self.account_id,
                    "ids": ids,
                    "properties": EMAIL_PROPERTIES,
                    "fetchTextBodyValues": fetch_body,
                    "maxBodyValueBytes": MAX_BODY_VALUE_BYTES,
                }),
            )
            .await?;
        let list = args
            .get("list")
            .cloned()
            .ok_or_else(|| Error::MissingResponse("Email/get list".to_string()))?;
        Ok(serde_json::from_value(list)?)
    }

    /// Fetches a single message by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the server does not know the id.
    pub async fn get_email(&self, id: &EmailId) -> Result<Email> {
        let mut list = self.get_emails(std::slice::from_ref(id), true).await?;
        list.pop().ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Applies all patches in one batched `Email/set` call.
    ///
    /// Returns the ids the server reports as updated. Any per-message
    /// rejection fails the whole call; there is no partial retry.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, server rejection, or if any
    /// message in the batch was not updated.
    pub async fn set_emails(
        &self,
        updates: &BTreeMap<EmailId, EmailPatch>,
    ) -> Result<Vec<EmailId>> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }
        let args = self
            .call(
                "Email/set",
                json!({ "accountId": self.account_id, "update": updates }),
            )
            .await?;

        if let Some(not_updated) = args.get("notUpdated").and_then(Value::as_object)
            && !not_updated.is_empty()
        {
            for (id, reason) in not_updated {
                warn!(%id, %reason, "message update rejected");
            }
            return Err(Error::Server {
                status: "Email/set".to_string(),
                detail: format!("{} of {} updates rejected", not_updated.len(), updates.len()),
            });
        }

        let updated = args
            .get("updated")
            .and_then(Value::as_object)
            .map(|map| map.keys().cloned().map(EmailId::new).collect())
            .unwrap_or_default();
        Ok(updated)
    }
}
