//! Label synchronizer.
//!
//! Converts accumulated per-message actions into one batched `Email/set`
//! update map. The whole batch goes out in a single call; there is no
//! per-message retry, a rejection fails the run.

use std::collections::BTreeMap;

use mailtriage_jmap::{EmailId, EmailPatch};

use crate::rules::MessageActions;

/// Builds the batched update map from per-message deltas.
///
/// Adds become `mailboxIds/<id>: true`, removes become `null`. With
/// `keyword_cleanup` set, each remove also clears the legacy keyword
/// marker named after the label, for stores that used keywords before
/// mailbox filing.
#[must_use]
pub fn build_update(
    actions: &[MessageActions],
    keyword_cleanup: bool,
) -> BTreeMap<EmailId, EmailPatch> {
    let mut updates = BTreeMap::new();
    for message in actions {
        let mut patch = EmailPatch::new();
        for id in &message.add {
            patch.add_mailbox(id);
        }
        for id in &message.remove {
            patch.remove_mailbox(id);
        }
        if keyword_cleanup {
            for keyword in &message.remove_keywords {
                patch.remove_keyword(keyword);
            }
        }
        if !patch.is_empty() {
            updates.insert(message.email_id.clone(), patch);
        }
    }
    updates
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailtriage_jmap::MailboxId;
    use std::collections::BTreeSet;

    fn actions(id: &str, add: &[&str], remove: &[&str], keywords: &[&str]) -> MessageActions {
        MessageActions {
            email_id: EmailId::new(id),
            add: add.iter().copied().map(MailboxId::new).collect(),
            remove: remove.iter().copied().map(MailboxId::new).collect(),
            remove_keywords: keywords.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn adds_and_removes_become_one_patch_per_message() {
        let updates = build_update(
            &[
                actions("E1", &["M1"], &["M2"], &["old"]),
                actions("E2", &["M3"], &[], &[]),
            ],
            false,
        );

        assert_eq!(updates.len(), 2);
        let patch = serde_json::to_value(&updates[&EmailId::new("E1")]).unwrap();
        assert_eq!(
            patch,
            serde_json::json!({ "mailboxIds/M1": true, "mailboxIds/M2": null })
        );
    }

    #[test]
    fn keyword_cleanup_mirrors_removes_onto_keywords() {
        let updates = build_update(&[actions("E1", &[], &["M2"], &["old"])], true);
        let patch = serde_json::to_value(&updates[&EmailId::new("E1")]).unwrap();
        assert_eq!(
            patch,
            serde_json::json!({ "mailboxIds/M2": null, "keywords/old": null })
        );
    }

    #[test]
    fn empty_deltas_produce_no_update() {
        let updates = build_update(&[actions("E1", &[], &[], &["only-keyword"])], false);
        assert!(updates.is_empty());
    }
}
