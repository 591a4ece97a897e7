//! Predicate evaluator.
//!
//! Tests composed text against a rule's ordered conditions. Conditions are
//! ANDed: the first failing one decides, and a rule with zero conditions
//! always matches. Needles were lowercased at load time and the composer
//! lowercases its output, so comparisons here are direct.

use super::model::Condition;

/// Returns whether `text` satisfies every condition.
#[must_use]
pub fn matches(text: &str, conditions: &[Condition]) -> bool {
    conditions.iter().all(|condition| match condition {
        Condition::Empty(require_empty) => text.is_empty() == *require_empty,
        Condition::NotEmpty(require_non_empty) => !text.is_empty() == *require_non_empty,
        Condition::Exact(needle) => text == needle,
        Condition::NotExact(needle) => text != needle,
        Condition::Regex(pattern) => pattern.is_match(text),
        Condition::Contains(needles) | Condition::OneOf(needles) => {
            needles.iter().any(|needle| text.contains(needle))
        }
    })
}
