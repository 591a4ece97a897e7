//! Label name to mailbox id resolution.

use std::collections::HashMap;

use mailtriage_jmap::{Mailbox, MailboxId};

/// Name-to-id lookup built from the live mailbox list.
///
/// Resolution tries the exact name first, then falls back to a lowercase
/// match, so rule authors need not mirror server-side capitalization.
#[derive(Debug, Clone)]
pub struct LabelResolver {
    exact: HashMap<String, MailboxId>,
    lowercase: HashMap<String, MailboxId>,
}

impl LabelResolver {
    /// Builds a resolver from the mailbox list.
    ///
    /// When two mailboxes differ only by case, the first one listed wins
    /// the lowercase slot.
    #[must_use]
    pub fn new(mailboxes: &[Mailbox]) -> Self {
        let mut exact = HashMap::new();
        let mut lowercase = HashMap::new();
        for mailbox in mailboxes {
            exact.insert(mailbox.name.clone(), mailbox.id.clone());
            lowercase
                .entry(mailbox.name.to_lowercase())
                .or_insert_with(|| mailbox.id.clone());
        }
        Self { exact, lowercase }
    }

    /// Resolves a label name to a mailbox id.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&MailboxId> {
        self.exact
            .get(name)
            .or_else(|| self.lowercase.get(&name.to_lowercase()))
    }

    /// Returns the required names that have no mailbox yet, preserving
    /// input order. Used for idempotent folder creation.
    #[must_use]
    pub fn missing<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .map(String::as_str)
            .filter(|name| self.resolve(name).is_none())
            .collect()
    }
}
