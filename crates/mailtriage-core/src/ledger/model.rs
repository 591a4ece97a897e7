//! Ledger data model and merge logic.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rules::LedgerCandidate;

/// Which of the two ledgers an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// Senders whose messages were filed (subjects worth keeping).
    Kept,
    /// Senders whose messages were excluded.
    Excluded,
}

impl LedgerKind {
    /// Parse from the string form used at the interactive boundary.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "kept" => Some(Self::Kept),
            "excluded" => Some(Self::Excluded),
            _ => None,
        }
    }

    /// String form used at the interactive boundary.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kept => "kept",
            Self::Excluded => "excluded",
        }
    }
}

/// One recorded sender/subject observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Sender identity: display name, or address when unnamed. This is the
    /// deduplication key (case-insensitive) across both ledgers.
    pub sender: String,
    /// Subject of the first observed message.
    pub subject: String,
    /// Message id of that observation, when recorded.
    pub message_id: Option<String>,
}

/// One ledger: label sections in alphabetical order, each holding entries
/// sorted by sender, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    sections: BTreeMap<String, Vec<LedgerEntry>>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures a label section exists. Sections are never removed once
    /// created, even when emptied.
    pub fn ensure_section(&mut self, label: &str) {
        self.sections.entry(label.to_string()).or_default();
    }

    /// Appends an entry to a label's section, creating the section if
    /// needed, and keeps the section sorted by sender.
    pub fn add_entry(&mut self, label: &str, entry: LedgerEntry) {
        let section = self.sections.entry(label.to_string()).or_default();
        section.push(entry);
        section.sort_by_key(|e| e.sender.to_lowercase());
    }

    /// Removes the first entry with the given sender (case-insensitive),
    /// returning it with its section label. The emptied section stays.
    pub fn take_sender(&mut self, sender: &str) -> Option<(String, LedgerEntry)> {
        let needle = sender.to_lowercase();
        for (label, entries) in &mut self.sections {
            if let Some(pos) = entries
                .iter()
                .position(|e| e.sender.to_lowercase() == needle)
            {
                return Some((label.clone(), entries.remove(pos)));
            }
        }
        None
    }

    /// Iterates sections in alphabetical label order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[LedgerEntry])> {
        self.sections
            .iter()
            .map(|(label, entries)| (label.as_str(), entries.as_slice()))
    }

    /// All senders in this ledger, lowercased.
    pub fn senders(&self) -> impl Iterator<Item = String> + '_ {
        self.sections
            .values()
            .flatten()
            .map(|e| e.sender.to_lowercase())
    }

    /// Whether the ledger holds no sections at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Counts of entries accepted by one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Entries added to the kept ledger.
    pub kept_added: usize,
    /// Entries added to the excluded ledger.
    pub excluded_added: usize,
}

/// Both ledgers, merged and persisted together so the cross-ledger sender
/// invariant can be enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerPair {
    /// The kept ledger.
    pub kept: Ledger,
    /// The excluded ledger.
    pub excluded: Ledger,
}

impl LedgerPair {
    /// Borrows one ledger by kind.
    #[must_use]
    pub const fn get(&self, kind: LedgerKind) -> &Ledger {
        match kind {
            LedgerKind::Kept => &self.kept,
            LedgerKind::Excluded => &self.excluded,
        }
    }

    /// Mutably borrows one ledger by kind.
    pub const fn get_mut(&mut self, kind: LedgerKind) -> &mut Ledger {
        match kind {
            LedgerKind::Kept => &mut self.kept,
            LedgerKind::Excluded => &mut self.excluded,
        }
    }

    /// The global known-sender set, lowercased, drawn from both ledgers.
    #[must_use]
    pub fn known_senders(&self) -> HashSet<String> {
        self.kept.senders().chain(self.excluded.senders()).collect()
    }

    /// Merges newly observed candidates into the pair.
    ///
    /// A candidate whose sender is already known anywhere (in either
    /// ledger, or accepted earlier in this same merge) is skipped, even
    /// under a different label. The merge is idempotent.
    pub fn merge(&mut self, candidates: &[LedgerCandidate]) -> MergeStats {
        let mut known = self.known_senders();
        let mut stats = MergeStats::default();

        for candidate in candidates {
            let key = candidate.sender.to_lowercase();
            if known.contains(&key) {
                continue;
            }
            known.insert(key);

            self.get_mut(candidate.kind).add_entry(
                &candidate.label,
                LedgerEntry {
                    sender: candidate.sender.clone(),
                    subject: candidate.subject.clone(),
                    message_id: Some(candidate.message_id.clone()),
                },
            );
            match candidate.kind {
                LedgerKind::Kept => stats.kept_added += 1,
                LedgerKind::Excluded => stats.excluded_added += 1,
            }
        }

        debug!(
            kept_added = stats.kept_added,
            excluded_added = stats.excluded_added,
            skipped = candidates.len() - stats.kept_added - stats.excluded_added,
            "ledger merge finished"
        );
        stats
    }
}
