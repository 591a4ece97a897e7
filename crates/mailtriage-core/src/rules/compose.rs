//! Field composer.
//!
//! Builds the text a rule is tested against from the message fields its
//! selector names. Parts are appended in a fixed order (header, from, to,
//! subject, body), joined with a literal `|`, and the whole result is
//! lowercased. An absent value still contributes its empty segment, so the
//! shape of the composed text depends only on the selector.

use mailtriage_jmap::Email;

use super::model::FieldSelector;

/// Composes the lowercased `|`-joined text for one message and selector.
#[must_use]
pub fn compose(email: &Email, selector: &FieldSelector) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(name) = &selector.header {
        parts.push(email.header(name).unwrap_or_default().to_string());
    }
    if selector.from {
        let from = email
            .primary_from()
            .map(|a| a.email.clone())
            .unwrap_or_default();
        parts.push(from);
    }
    if selector.to {
        let to = email
            .to
            .as_deref()
            .map(|addrs| {
                addrs
                    .iter()
                    .map(|a| a.email.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        parts.push(to);
    }
    if selector.subject {
        parts.push(email.subject.clone().unwrap_or_default());
    }
    if selector.body {
        parts.push(email.plain_text_body().unwrap_or_default().to_string());
    }

    parts.join("|").to_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email() -> Email {
        serde_json::from_str(
            r#"{
                "id": "M1",
                "subject": "Weekly Digest",
                "from": [{"name": "News", "email": "News@Letters.test"}],
                "to": [
                    {"name": null, "email": "me@example.test"},
                    {"name": null, "email": "Other@example.test"}
                ],
                "headers": [{"name": "List-Id", "value": "<digest.letters.test>"}],
                "textBody": [{"partId": "1", "type": "text/plain"}],
                "bodyValues": {"1": {"value": "Top Stories"}}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn single_field_is_lowercased() {
        let selector = FieldSelector {
            subject: true,
            ..FieldSelector::default()
        };
        assert_eq!(compose(&email(), &selector), "weekly digest");
    }

    #[test]
    fn fields_join_in_fixed_order_with_pipe() {
        let selector = FieldSelector {
            header: Some("List-Id".to_string()),
            from: true,
            to: true,
            subject: true,
            body: true,
        };
        assert_eq!(
            compose(&email(), &selector),
            "<digest.letters.test>|news@letters.test|me@example.test other@example.test|weekly digest|top stories"
        );
    }

    #[test]
    fn absent_value_keeps_its_empty_segment() {
        let selector = FieldSelector {
            header: Some("X-Missing".to_string()),
            subject: true,
            ..FieldSelector::default()
        };
        assert_eq!(compose(&email(), &selector), "|weekly digest");
    }

    #[test]
    fn empty_selector_composes_empty_text() {
        assert_eq!(compose(&email(), &FieldSelector::default()), "");
    }
}
