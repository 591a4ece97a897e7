//! The batch triage run.
//!
//! One linear pass: list mailboxes, create missing required folders,
//! query the scan folder newest-first up to the ceiling, fetch, evaluate
//! the rules, issue the one batched mutation, then merge the observed
//! senders into the ledgers. Any failure aborts the remainder of the run;
//! the mutation and the ledger write are independent, best-effort steps
//! with no cross-call atomicity.

use mailtriage_jmap::Client;
use tracing::{debug, info};

use crate::config::TriageConfig;
use crate::error::{Error, Result};
use crate::labels::{LabelResolver, build_update};
use crate::ledger::LedgerStore;
use crate::rules::RuleEngine;

/// What one run did, for logging and exit reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// Messages fetched and evaluated.
    pub scanned: usize,
    /// Messages with at least one accumulated action.
    pub modified: usize,
    /// Entries newly added to the kept ledger.
    pub kept_added: usize,
    /// Entries newly added to the excluded ledger.
    pub excluded_added: usize,
}

/// Runs one triage pass against the store.
///
/// # Errors
///
/// Returns an error on any remote call failure, when the scan folder does
/// not exist, or on a ledger I/O failure. There are no retries.
pub async fn run_triage(client: &Client, config: &TriageConfig) -> Result<RunSummary> {
    let mut mailboxes = client.list_mailboxes().await?;
    debug!(count = mailboxes.len(), "listed mailboxes");

    // Create only the required folders that are missing; rerunning is a
    // no-op.
    let missing: Vec<String> = LabelResolver::new(&mailboxes)
        .missing(&config.required_labels)
        .into_iter()
        .map(ToString::to_string)
        .collect();
    for name in &missing {
        info!(%name, "creating required mailbox");
        mailboxes.push(client.create_mailbox(name).await?);
    }
    let resolver = LabelResolver::new(&mailboxes);

    let scan_id = resolver
        .resolve(&config.scan_folder)
        .ok_or_else(|| Error::FolderNotFound(config.scan_folder.clone()))?
        .clone();

    let ids = client.query_emails(&scan_id, config.max_messages).await?;
    let emails = client.get_emails(&ids, true).await?;
    debug!(folder = %config.scan_folder, scanned = emails.len(), "fetched messages");

    let engine = RuleEngine::new(&config.rules, &resolver);
    let outcome = engine.evaluate_all(&emails);

    let updates = build_update(&outcome.actions, config.keyword_cleanup);
    let modified = updates.len();
    client.set_emails(&updates).await?;

    let store = LedgerStore::new(&config.kept_path, &config.excluded_path);
    let mut pair = store.load()?;
    let stats = pair.merge(&outcome.candidates);
    store.persist(&pair)?;

    let summary = RunSummary {
        scanned: emails.len(),
        modified,
        kept_added: stats.kept_added,
        excluded_added: stats.excluded_added,
    };
    info!(
        scanned = summary.scanned,
        modified = summary.modified,
        kept_added = summary.kept_added,
        excluded_added = summary.excluded_added,
        "triage run finished"
    );
    Ok(summary)
}
