//! Ledger text format.
//!
//! ```text
//! ======= Newsletters =======
//! Daily Digest | Your Tuesday roundup | E42
//!
//! ======= Receipts =======
//! Acme Billing | Invoice #123 due | E17
//! ```
//!
//! A section is a marker-framed label header followed by zero or more
//! `sender | subject [| messageId]` lines; sections are separated by one
//! blank line and labels are alphabetical. Parsing tolerates files that do
//! not exist yet (empty input) and lines outside any section.

use super::model::{Ledger, LedgerEntry};

/// Marker framing a section label.
const SECTION_MARKER: &str = "=======";

/// Parses one ledger file's content.
#[must_use]
pub fn parse(content: &str) -> Ledger {
    let mut ledger = Ledger::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(label) = parse_header(line) {
            ledger.ensure_section(&label);
            current = Some(label);
            continue;
        }

        let Some(label) = &current else {
            // Entry line before any header; nothing to attach it to.
            continue;
        };
        ledger.add_entry(label, parse_entry(line));
    }

    ledger
}

/// Renders a ledger back to text: alphabetical sections, a blank line
/// between them, and headers kept for sections with no entries.
#[must_use]
pub fn render(ledger: &Ledger) -> String {
    let mut blocks = Vec::new();
    for (label, entries) in ledger.sections() {
        let mut lines = vec![format!("{SECTION_MARKER} {label} {SECTION_MARKER}")];
        for entry in entries {
            lines.push(render_entry(entry));
        }
        blocks.push(lines.join("\n"));
    }

    let mut out = blocks.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn parse_header(line: &str) -> Option<String> {
    let rest = line.strip_prefix(SECTION_MARKER)?;
    let label = rest.strip_suffix(SECTION_MARKER)?;
    Some(label.trim().to_string())
}

fn parse_entry(line: &str) -> LedgerEntry {
    let parts: Vec<&str> = line.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [sender] => LedgerEntry {
            sender: (*sender).to_string(),
            subject: String::new(),
            message_id: None,
        },
        [sender, subject] => LedgerEntry {
            sender: (*sender).to_string(),
            subject: (*subject).to_string(),
            message_id: None,
        },
        // A trailing empty field marks "no message id" for subjects that
        // themselves contain a pipe; see `render_entry`.
        [sender, middle @ .., id] => LedgerEntry {
            sender: (*sender).to_string(),
            subject: middle.join(" | "),
            message_id: (!id.is_empty()).then(|| (*id).to_string()),
        },
        [] => unreachable!("split always yields at least one part"),
    }
}

fn render_entry(entry: &LedgerEntry) -> String {
    match &entry.message_id {
        Some(id) => format!("{} | {} | {id}", entry.sender, entry.subject),
        // An id-less subject containing a pipe would otherwise reparse with
        // its last segment taken for a message id, so pin it with an empty
        // trailing field.
        None if entry.subject.contains('|') => format!("{} | {} |", entry.sender, entry.subject),
        None => format!("{} | {}", entry.sender, entry.subject).trim_end().to_string(),
    }
}
