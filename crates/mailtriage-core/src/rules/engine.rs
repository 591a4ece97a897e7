//! Rule engine.
//!
//! Walks the ordered rule list per message, composing and testing each
//! rule, and accumulates label actions plus ledger candidates for matched
//! messages. A matching rule with `stop` ends evaluation for that message
//! only; other messages still see the full list.

use std::collections::BTreeSet;

use mailtriage_jmap::{Email, EmailId, MailboxId};
use tracing::{debug, warn};

use super::compose::compose;
use super::matcher::matches;
use super::model::RuleSet;
use crate::labels::LabelResolver;
use crate::ledger::LedgerKind;

/// Accumulated mailbox/keyword delta for one message.
#[derive(Debug, Clone)]
pub struct MessageActions {
    /// The message the delta applies to.
    pub email_id: EmailId,
    /// Mailboxes to add the message to.
    pub add: BTreeSet<MailboxId>,
    /// Mailboxes to remove the message from.
    pub remove: BTreeSet<MailboxId>,
    /// Legacy keyword markers to clear alongside the removes.
    pub remove_keywords: BTreeSet<String>,
}

impl MessageActions {
    fn new(email_id: EmailId) -> Self {
        Self {
            email_id,
            add: BTreeSet::new(),
            remove: BTreeSet::new(),
            remove_keywords: BTreeSet::new(),
        }
    }

    /// Whether any action was accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// A sender/subject pair observed by a matching rule, destined for one
/// ledger section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCandidate {
    /// Which ledger the entry belongs to.
    pub kind: LedgerKind,
    /// Section label (the rule's label name, resolvable or not).
    pub label: String,
    /// Sender identity (display name, or address when unnamed).
    pub sender: String,
    /// Subject text.
    pub subject: String,
    /// Message id, kept for later lookup from the editor.
    pub message_id: String,
}

/// Result of evaluating a batch of messages.
#[derive(Debug, Default)]
pub struct RuleOutcome {
    /// Per-message deltas; messages with zero actions are omitted.
    pub actions: Vec<MessageActions>,
    /// Ledger candidates from all matched rules.
    pub candidates: Vec<LedgerCandidate>,
}

/// Evaluates an ordered rule set against messages.
pub struct RuleEngine<'a> {
    rules: &'a RuleSet,
    resolver: &'a LabelResolver,
}

impl<'a> RuleEngine<'a> {
    /// Creates an engine over a rule set and the live mailbox resolver.
    #[must_use]
    pub const fn new(rules: &'a RuleSet, resolver: &'a LabelResolver) -> Self {
        Self { rules, resolver }
    }

    /// Evaluates every message and collects the batch outcome.
    #[must_use]
    pub fn evaluate_all(&self, emails: &[Email]) -> RuleOutcome {
        let mut outcome = RuleOutcome::default();
        for email in emails {
            let (actions, mut candidates) = self.evaluate(email);
            if let Some(actions) = actions {
                outcome.actions.push(actions);
            }
            outcome.candidates.append(&mut candidates);
        }
        debug!(
            messages = emails.len(),
            modified = outcome.actions.len(),
            candidates = outcome.candidates.len(),
            "rule evaluation finished"
        );
        outcome
    }

    /// Evaluates one message against the rule list.
    ///
    /// Returns the accumulated delta (`None` when no rule produced an
    /// action) and the ledger candidates from matched rules.
    #[must_use]
    pub fn evaluate(&self, email: &Email) -> (Option<MessageActions>, Vec<LedgerCandidate>) {
        let mut actions = MessageActions::new(email.id.clone());
        let mut candidates = Vec::new();

        for rule in self.rules {
            let text = compose(email, &rule.selector);
            if !matches(&text, &rule.conditions) {
                continue;
            }

            for label in &rule.add_labels {
                self.accumulate(label, email, LedgerKind::Kept, &mut candidates, |id| {
                    actions.add.insert(id);
                });
            }
            for label in &rule.remove_labels {
                actions.remove_keywords.insert(label.to_lowercase());
                self.accumulate(label, email, LedgerKind::Excluded, &mut candidates, |id| {
                    actions.remove.insert(id);
                });
            }

            if rule.stop {
                break;
            }
        }

        if actions.is_empty() {
            (None, candidates)
        } else {
            (Some(actions), candidates)
        }
    }

    /// Resolves one label action: records the ledger candidate and, when
    /// the name resolves to a live mailbox, feeds the id to `apply`.
    /// Unresolvable names are logged and skipped, never fatal.
    fn accumulate(
        &self,
        label: &str,
        email: &Email,
        kind: LedgerKind,
        candidates: &mut Vec<LedgerCandidate>,
        apply: impl FnOnce(MailboxId),
    ) {
        if let Some(sender) = email.primary_from().map(|a| a.identity().to_string()) {
            candidates.push(LedgerCandidate {
                kind,
                label: label.to_string(),
                sender,
                subject: email.subject.clone().unwrap_or_default(),
                message_id: email.id.to_string(),
            });
        }

        match self.resolver.resolve(label) {
            Some(id) => apply(id.clone()),
            None => warn!(label, email = %email.id, "label does not resolve to a mailbox"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailtriage_jmap::Mailbox;

    fn resolver() -> LabelResolver {
        let mailboxes: Vec<Mailbox> = serde_json::from_str(
            r#"[
                {"id": "M1", "name": "Receipts"},
                {"id": "M2", "name": "A"},
                {"id": "M3", "name": "B"},
                {"id": "M4", "name": "Newsletters"}
            ]"#,
        )
        .unwrap();
        LabelResolver::new(&mailboxes)
    }

    fn email(id: &str, subject: &str) -> Email {
        serde_json::from_str(&format!(
            r#"{{
                "id": "{id}",
                "subject": "{subject}",
                "from": [{{"name": "Acme Billing", "email": "billing@acme.test"}}]
            }}"#
        ))
        .unwrap()
    }

    fn rules(json: &str) -> RuleSet {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn matching_rule_accumulates_add_action_and_candidate() {
        let rules = rules(r#"[{"subject": true, "contains": "invoice", "add-label": "Receipts"}]"#);
        let resolver = resolver();
        let engine = RuleEngine::new(&rules, &resolver);

        let (actions, candidates) = engine.evaluate(&email("E1", "Invoice #123 due"));
        let actions = actions.unwrap();
        assert!(actions.add.contains(&MailboxId::new("M1")));
        assert!(actions.remove.is_empty());

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, LedgerKind::Kept);
        assert_eq!(candidates[0].label, "Receipts");
        assert_eq!(candidates[0].sender, "Acme Billing");
    }

    #[test]
    fn stop_halts_later_rules_for_that_message_only() {
        let rules = rules(
            r#"[
                {"subject": true, "contains": "invoice", "add-label": "A", "stop": true},
                {"subject": true, "not-empty": true, "add-label": "B"}
            ]"#,
        );
        let resolver = resolver();
        let engine = RuleEngine::new(&rules, &resolver);

        let outcome = engine.evaluate_all(&[
            email("E1", "Invoice #1"),
            email("E2", "Weekly digest"),
        ]);

        assert_eq!(outcome.actions.len(), 2);
        let first = &outcome.actions[0];
        assert_eq!(first.email_id, mailtriage_jmap::EmailId::new("E1"));
        assert!(first.add.contains(&MailboxId::new("M2")));
        assert!(!first.add.contains(&MailboxId::new("M3")));

        let second = &outcome.actions[1];
        assert!(second.add.contains(&MailboxId::new("M3")));
    }

    #[test]
    fn add_and_remove_can_fire_on_one_rule() {
        let rules = rules(
            r#"[{"subject": true, "contains": "digest", "add-label": "Newsletters", "remove-label": "A"}]"#,
        );
        let resolver = resolver();
        let engine = RuleEngine::new(&rules, &resolver);

        let (actions, candidates) = engine.evaluate(&email("E1", "Daily digest"));
        let actions = actions.unwrap();
        assert!(actions.add.contains(&MailboxId::new("M4")));
        assert!(actions.remove.contains(&MailboxId::new("M2")));
        assert!(actions.remove_keywords.contains("a"));
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn unresolvable_label_is_skipped_not_fatal() {
        let rules = rules(r#"[{"subject": true, "not-empty": true, "add-label": "NoSuchBox"}]"#);
        let resolver = resolver();
        let engine = RuleEngine::new(&rules, &resolver);

        let (actions, candidates) = engine.evaluate(&email("E1", "hello"));
        assert!(actions.is_none());
        // The ledger still records the observation.
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn unmatched_message_is_excluded_from_the_batch() {
        let rules = rules(r#"[{"subject": true, "contains": "invoice", "add-label": "Receipts"}]"#);
        let resolver = resolver();
        let engine = RuleEngine::new(&rules, &resolver);

        let outcome = engine.evaluate_all(&[email("E1", "nothing relevant")]);
        assert!(outcome.actions.is_empty());
        assert!(outcome.candidates.is_empty());
    }
}
