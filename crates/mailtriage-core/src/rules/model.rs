//! Rule data model.
//!
//! Rules are authored as JSON objects with optional keys. At load time the
//! optional-keyed form is converted into an ordered list of [`Condition`]
//! variants, so the evaluator matches exhaustively instead of probing for
//! fields, and a malformed regex fails configuration loading before any
//! message is touched.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::Error;

/// Which message fields a rule is tested against.
///
/// Selected values are joined with `|` and lowercased by the composer; an
/// absent value still contributes its (empty) segment.
#[derive(Debug, Clone, Default)]
pub struct FieldSelector {
    /// Test against a named header (lookup is case-insensitive).
    pub header: Option<String>,
    /// Test against the primary sender address.
    pub from: bool,
    /// Test against all recipient addresses, space-joined.
    pub to: bool,
    /// Test against the subject line.
    pub subject: bool,
    /// Test against the plain-text body.
    pub body: bool,
}

/// A regex condition with its compiled, case-insensitive pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// The pattern as authored.
    pub pattern: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles a pattern case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Config(format!("invalid rule regex {pattern:?}: {e}")))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Unanchored match test.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// One condition of a rule.
///
/// All string comparisons are case-insensitive; needles are lowercased at
/// load time to match the composer's lowercased output.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Require the composed text to be empty (`true`) or non-empty (`false`).
    Empty(bool),
    /// Inverse framing of [`Condition::Empty`].
    NotEmpty(bool),
    /// Full-string equality.
    Exact(String),
    /// Full-string inequality.
    NotExact(String),
    /// Regex test (unanchored, case-insensitive).
    Regex(CompiledPattern),
    /// Substring test; multiple needles are a logical OR.
    Contains(Vec<String>),
    /// Substring OR test, identical in evaluation to list-form `contains`;
    /// kept distinct for rule-authoring clarity.
    OneOf(Vec<String>),
}

/// One guard clause of a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RuleSpec")]
pub struct Rule {
    /// Fields the rule is tested against.
    pub selector: FieldSelector,
    /// Conditions in fixed evaluation order; all must pass (zero always
    /// passes).
    pub conditions: Vec<Condition>,
    /// Labels to add the message to on match.
    pub add_labels: Vec<String>,
    /// Labels to remove the message from on match.
    pub remove_labels: Vec<String>,
    /// End evaluation of remaining rules for this message on match.
    pub stop: bool,
}

/// Ordered sequence of rules, evaluated top to bottom per message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(pub Vec<Rule>);

impl RuleSet {
    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the rules in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A scalar-or-list JSON value, normalized to a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(v: OneOrMany) -> Self {
        match v {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(list) => list,
        }
    }
}

/// The optional-keyed authored form of a rule.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RuleSpec {
    #[serde(default)]
    header: Option<String>,
    #[serde(default)]
    from: bool,
    #[serde(default)]
    to: bool,
    #[serde(default)]
    subject: bool,
    #[serde(default)]
    body: bool,
    #[serde(default)]
    empty: Option<bool>,
    #[serde(default)]
    not_empty: Option<bool>,
    #[serde(default)]
    exact: Option<String>,
    #[serde(default)]
    not_exact: Option<String>,
    #[serde(default)]
    regex: Option<String>,
    #[serde(default)]
    contains: Option<OneOrMany>,
    #[serde(default)]
    one_of: Option<Vec<String>>,
    #[serde(default)]
    add_label: Option<OneOrMany>,
    #[serde(default)]
    remove_label: Option<OneOrMany>,
    #[serde(default)]
    stop: bool,
}

fn lowercase_all(list: Vec<String>) -> Vec<String> {
    list.into_iter().map(|s| s.to_lowercase()).collect()
}

impl TryFrom<RuleSpec> for Rule {
    type Error = Error;

    fn try_from(spec: RuleSpec) -> Result<Self, Self::Error> {
        // Conditions in the fixed evaluation order.
        let mut conditions = Vec::new();
        if let Some(v) = spec.empty {
            conditions.push(Condition::Empty(v));
        }
        if let Some(v) = spec.not_empty {
            conditions.push(Condition::NotEmpty(v));
        }
        if let Some(v) = spec.exact {
            conditions.push(Condition::Exact(v.to_lowercase()));
        }
        if let Some(v) = spec.not_exact {
            conditions.push(Condition::NotExact(v.to_lowercase()));
        }
        if let Some(v) = spec.regex {
            conditions.push(Condition::Regex(CompiledPattern::new(&v)?));
        }
        if let Some(v) = spec.contains {
            conditions.push(Condition::Contains(lowercase_all(v.into())));
        }
        if let Some(v) = spec.one_of {
            conditions.push(Condition::OneOf(lowercase_all(v)));
        }

        Ok(Self {
            selector: FieldSelector {
                header: spec.header,
                from: spec.from,
                to: spec.to,
                subject: spec.subject,
                body: spec.body,
            },
            conditions,
            add_labels: spec.add_label.map(Vec::from).unwrap_or_default(),
            remove_labels: spec.remove_label.map(Vec::from).unwrap_or_default(),
            stop: spec.stop,
        })
    }
}
