//! End-to-end scenarios over the rule engine and ledger, no server needed.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::sync::Arc;

use mailtriage_core::ledger::{LedgerKind, LedgerStore};
use mailtriage_core::rules::{RuleEngine, RuleSet};
use mailtriage_core::time::{Clock, MockClock};
use mailtriage_core::{EditorService, LabelResolver};
use mailtriage_jmap::{Email, Mailbox, MailboxId};

fn mailboxes() -> Vec<Mailbox> {
    serde_json::from_str(
        r#"[
            {"id": "M1", "name": "Receipts"},
            {"id": "MA", "name": "A"},
            {"id": "MB", "name": "B"}
        ]"#,
    )
    .unwrap()
}

fn invoice_email() -> Email {
    serde_json::from_str(
        r#"{
            "id": "E17",
            "subject": "Invoice #123 due",
            "from": [{"name": "Acme Billing", "email": "billing@acme.test"}]
        }"#,
    )
    .unwrap()
}

fn temp_store(tag: &str) -> LedgerStore {
    let dir = std::env::temp_dir().join(format!("mailtriage-e2e-{tag}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    LedgerStore::new(dir.join("kept.txt"), dir.join("excluded.txt"))
}

#[test]
fn invoice_rule_files_message_and_records_sender() {
    let rules: RuleSet = serde_json::from_str(
        r#"[{"subject": true, "contains": "invoice", "add-label": "Receipts"}]"#,
    )
    .unwrap();
    let mailboxes = mailboxes();
    let resolver = LabelResolver::new(&mailboxes);
    let engine = RuleEngine::new(&rules, &resolver);

    let outcome = engine.evaluate_all(&[invoice_email()]);

    // The message gets an add-action for the resolved mailbox id.
    assert_eq!(outcome.actions.len(), 1);
    assert!(outcome.actions[0].add.contains(&MailboxId::new("M1")));

    // And post-merge the kept ledger carries the sender under Receipts.
    let store = temp_store("invoice");
    let mut pair = store.load().unwrap();
    pair.merge(&outcome.candidates);
    store.persist(&pair).unwrap();

    let kept = fs::read_to_string(store.path(LedgerKind::Kept)).unwrap();
    assert!(kept.contains("======= Receipts ======="));
    assert!(kept.contains("Acme Billing | Invoice #123 due | E17"));
}

#[test]
fn stop_rule_applies_only_the_first_label() {
    let rules: RuleSet = serde_json::from_str(
        r#"[
            {"subject": true, "contains": "invoice", "add-label": "A", "stop": true},
            {"subject": true, "contains": "invoice", "add-label": "B"}
        ]"#,
    )
    .unwrap();
    let mailboxes = mailboxes();
    let resolver = LabelResolver::new(&mailboxes);
    let engine = RuleEngine::new(&rules, &resolver);

    let outcome = engine.evaluate_all(&[invoice_email()]);
    assert_eq!(outcome.actions.len(), 1);
    assert!(outcome.actions[0].add.contains(&MailboxId::new("MA")));
    assert!(!outcome.actions[0].add.contains(&MailboxId::new("MB")));
}

#[test]
fn excluded_sender_never_reenters_the_kept_ledger() {
    let store = temp_store("cross-dedup");
    let mut service = EditorService::new(
        store.clone(),
        Arc::new(MockClock::new()) as Arc<dyn Clock>,
    );
    service
        .save_ledger("excluded", "======= Spam =======\nAcme Billing | junk\n")
        .unwrap();

    // A later run observes the same sender for the kept ledger.
    let rules: RuleSet = serde_json::from_str(
        r#"[{"subject": true, "contains": "invoice", "add-label": "Receipts"}]"#,
    )
    .unwrap();
    let mailboxes = mailboxes();
    let resolver = LabelResolver::new(&mailboxes);
    let outcome = RuleEngine::new(&rules, &resolver).evaluate_all(&[invoice_email()]);

    let mut pair = store.load().unwrap();
    let stats = pair.merge(&outcome.candidates);
    store.persist(&pair).unwrap();

    assert_eq!(stats.kept_added, 0);
    let kept = fs::read_to_string(store.path(LedgerKind::Kept)).unwrap();
    assert!(!kept.contains("Acme Billing"));
}
