//! The two deduplicated ledger files.
//!
//! Observed sender/subject pairs are recorded into two label-sectioned
//! flat files, `kept` and `excluded`. A sender appears at most once across
//! both files combined; sections are alphabetical and never removed once
//! created. The text format is the load/persist boundary only; merging
//! operates on the structured in-memory model.

mod format;
mod model;
mod store;

pub use format::{parse, render};
pub use model::{Ledger, LedgerEntry, LedgerKind, LedgerPair, MergeStats};
pub use store::LedgerStore;
