//! Ledger store: the filesystem boundary.
//!
//! `load` and `persist` translate between the two flat files and the
//! in-memory [`LedgerPair`]; merging never touches the filesystem. Files
//! are rewritten whole (temp file, then rename) so the sorted and
//! deduplicated invariants hold after every run; entries are never
//! appended in place.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::format::{parse, render};
use super::model::{Ledger, LedgerKind, LedgerPair};
use crate::error::Result;

/// Handle on the two ledger file paths.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    kept_path: PathBuf,
    excluded_path: PathBuf,
}

impl LedgerStore {
    /// Creates a store over the two file paths.
    pub fn new(kept_path: impl Into<PathBuf>, excluded_path: impl Into<PathBuf>) -> Self {
        Self {
            kept_path: kept_path.into(),
            excluded_path: excluded_path.into(),
        }
    }

    /// The file path backing one ledger.
    #[must_use]
    pub fn path(&self, kind: LedgerKind) -> &Path {
        match kind {
            LedgerKind::Kept => &self.kept_path,
            LedgerKind::Excluded => &self.excluded_path,
        }
    }

    /// Loads both ledgers. A file that does not exist yet parses as empty.
    ///
    /// # Errors
    ///
    /// Returns an error on any I/O failure other than a missing file.
    pub fn load(&self) -> Result<LedgerPair> {
        Ok(LedgerPair {
            kept: load_one(&self.kept_path)?,
            excluded: load_one(&self.excluded_path)?,
        })
    }

    /// Rewrites both ledger files from the in-memory pair.
    ///
    /// Each file is written to a temporary sibling and renamed over the
    /// old one, so a crash mid-write never leaves a half file behind.
    ///
    /// # Errors
    ///
    /// Returns an error on any I/O failure.
    pub fn persist(&self, pair: &LedgerPair) -> Result<()> {
        persist_one(&self.kept_path, &pair.kept)?;
        persist_one(&self.excluded_path, &pair.excluded)?;
        debug!(
            kept = %self.kept_path.display(),
            excluded = %self.excluded_path.display(),
            "ledgers persisted"
        );
        Ok(())
    }
}

fn load_one(path: &Path) -> Result<Ledger> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(parse(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Ledger::new()),
        Err(e) => Err(e.into()),
    }
}

fn persist_one(path: &Path, ledger: &Ledger) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(render(ledger).as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ledger::model::LedgerEntry;
    use crate::rules::LedgerCandidate;
    use proptest::prelude::*;

    fn temp_store(tag: &str) -> LedgerStore {
        let dir = std::env::temp_dir().join(format!(
            "mailtriage-store-{tag}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        LedgerStore::new(dir.join("kept.txt"), dir.join("excluded.txt"))
    }

    #[test]
    fn missing_files_load_as_empty() {
        let store = temp_store("missing");
        let pair = store.load().unwrap();
        assert!(pair.kept.is_empty());
        assert!(pair.excluded.is_empty());
    }

    #[test]
    fn persist_then_load_round_trips() {
        let store = temp_store("roundtrip");
        let mut pair = LedgerPair::default();
        pair.kept.add_entry(
            "Receipts",
            LedgerEntry {
                sender: "Acme Billing".to_string(),
                subject: "Invoice #123 due".to_string(),
                message_id: Some("E17".to_string()),
            },
        );
        pair.excluded.ensure_section("Spam");

        store.persist(&pair).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, pair);
    }

    #[test]
    fn persist_produces_byte_identical_files_on_identical_merges() {
        let store = temp_store("idempotent");
        let candidates = vec![LedgerCandidate {
            kind: LedgerKind::Kept,
            label: "Receipts".to_string(),
            sender: "Acme Billing".to_string(),
            subject: "Invoice #123 due".to_string(),
            message_id: "E17".to_string(),
        }];

        let mut pair = store.load().unwrap();
        pair.merge(&candidates);
        store.persist(&pair).unwrap();
        let first = fs::read_to_string(store.path(LedgerKind::Kept)).unwrap();

        let mut pair = store.load().unwrap();
        pair.merge(&candidates);
        store.persist(&pair).unwrap();
        let second = fs::read_to_string(store.path(LedgerKind::Kept)).unwrap();

        assert_eq!(first, second);
    }

    prop_compose! {
        fn arb_candidate()(
            kind in prop::bool::ANY,
            label in "[A-Z][a-z]{1,6}",
            sender in "[A-Za-z][A-Za-z ]{0,10}",
            subject in "[a-z ]{0,12}",
        ) -> LedgerCandidate {
            LedgerCandidate {
                kind: if kind { LedgerKind::Kept } else { LedgerKind::Excluded },
                label,
                sender,
                subject,
                message_id: "E0".to_string(),
            }
        }
    }

    proptest! {
        #[test]
        fn merge_is_idempotent_for_any_candidates(
            candidates in prop::collection::vec(arb_candidate(), 0..20)
        ) {
            let mut pair = LedgerPair::default();
            pair.merge(&candidates);
            let after_first = pair.clone();
            let stats = pair.merge(&candidates);

            prop_assert_eq!(stats, super::super::model::MergeStats::default());
            prop_assert_eq!(pair, after_first);
        }

        #[test]
        fn merged_senders_stay_globally_unique(
            candidates in prop::collection::vec(arb_candidate(), 0..20)
        ) {
            let mut pair = LedgerPair::default();
            pair.merge(&candidates);

            let all: Vec<String> = pair.kept.senders().chain(pair.excluded.senders()).collect();
            let unique: std::collections::HashSet<&String> = all.iter().collect();
            prop_assert_eq!(all.len(), unique.len());
        }
    }
}
