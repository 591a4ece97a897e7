//! Declarative message-matching rules.
//!
//! A [`RuleSet`] is an ordered list of [`Rule`]s evaluated top to bottom
//! per message. Each rule selects a set of message fields, tests the
//! composed text against its conditions (logical AND), and on match
//! accumulates label actions; a matching rule with `stop` ends evaluation
//! for that message only.

mod compose;
mod engine;
mod matcher;
mod model;

pub use compose::compose;
pub use engine::{LedgerCandidate, MessageActions, RuleEngine, RuleOutcome};
pub use matcher::matches;
pub use model::{CompiledPattern, Condition, FieldSelector, Rule, RuleSet};
