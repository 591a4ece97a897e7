//! # mailtriage-core
//!
//! Core logic of the `mailtriage` system:
//! - **Rules** - declarative per-message matching (field composer,
//!   predicate evaluator, ordered rule engine with `stop` short-circuit)
//! - **Labels** - mailbox name resolution and batched membership deltas
//! - **Ledger** - the two deduplicated flat files (`kept` / `excluded`)
//!   recording observed sender/subject pairs
//! - **Lock** - the advisory lock coordinating the batch run against the
//!   interactive editor
//! - **Services** - the batch triage run and the editor-facing surface

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod credentials;
mod error;
pub mod labels;
pub mod ledger;
pub mod lock;
pub mod rules;
pub mod service;
pub mod time;

pub use config::TriageConfig;
pub use error::{Error, Result};
pub use labels::{LabelResolver, build_update};
pub use ledger::{Ledger, LedgerEntry, LedgerKind, LedgerPair, LedgerStore};
pub use lock::{EditLock, LOCK_TIMEOUT};
pub use rules::{Condition, FieldSelector, Rule, RuleEngine, RuleOutcome, RuleSet};
pub use service::{EditorError, EditorService, MessageDetail, RunSummary, ValidationError, run_triage};
pub use time::{Clock, MockClock, SystemClock};
