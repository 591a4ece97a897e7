//! Label resolution and synchronization.
//!
//! Labels are names shared between rule actions, ledger sections, and
//! server mailboxes. This module maps names to live mailbox ids and turns
//! accumulated per-message actions into the one batched mutation the run
//! issues.

mod resolver;
mod sync;

pub use resolver::LabelResolver;
pub use sync::build_update;
