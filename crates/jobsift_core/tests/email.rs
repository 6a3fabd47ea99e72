use jobsift_core::{ExtractionStrategy, MessagePart, RawEmail, RedirectOutcome, SourcePolicy};
use pretty_assertions::assert_eq;

#[test]
fn formatted_carries_all_fields_with_fixed_delimiters() {
    let email = RawEmail {
        sender: "jobs@example.com".to_string(),
        subject: "New roles".to_string(),
        date: "Mon, 1 Jan 2024".to_string(),
        body: "<p>hi</p>".to_string(),
    };
    let formatted = email.formatted();
    assert_eq!(
        formatted,
        "From: jobs@example.com\nSubject: New roles\nDate: Mon, 1 Jan 2024\n\n<p>hi</p>"
    );
}

#[test]
fn part_walk_prefers_html_over_plain_text() {
    let message = MessagePart::Multipart {
        children: vec![
            MessagePart::Body {
                content: "plain".to_string(),
                is_html: false,
            },
            MessagePart::Multipart {
                children: vec![MessagePart::Body {
                    content: "<html>rich</html>".to_string(),
                    is_html: true,
                }],
            },
        ],
    };
    assert_eq!(message.preferred_body(), Some("<html>rich</html>"));
}

#[test]
fn part_walk_falls_back_to_plain_text() {
    let message = MessagePart::Multipart {
        children: vec![MessagePart::Body {
            content: "plain only".to_string(),
            is_html: false,
        }],
    };
    assert_eq!(message.preferred_body(), Some("plain only"));
}

#[test]
fn part_walk_handles_empty_multipart() {
    let message = MessagePart::Multipart { children: vec![] };
    assert_eq!(message.preferred_body(), None);
}

#[test]
fn failed_outcome_passes_original_url_through() {
    let outcome = RedirectOutcome::failed("https://t.co/x", "timed out");
    assert_eq!(outcome.final_url, outcome.original_url);
    assert!(!outcome.succeeded);
    assert_eq!(outcome.failure_reason.as_deref(), Some("timed out"));
}

#[test]
fn policy_deserializes_with_defaults() {
    let policy: SourcePolicy = serde_json::from_str(
        r#"{
            "sender_match": "jobs@example.com",
            "link_patterns": ["https://example.com/jobs/*"],
            "link_selector": "a.job-link"
        }"#,
    )
    .expect("policy parses");

    assert!(policy.follow_redirects);
    assert!(policy.text_exclusions.is_empty());
    assert!(policy.applies_to("Example Jobs <jobs@example.com>"));
    assert!(!policy.applies_to("news@example.com"));

    let patterns = policy.compile_patterns().expect("patterns compile");
    assert!(patterns.matches("https://example.com/jobs/123"));
}

#[test]
fn strategy_selection_comes_from_configuration() {
    let structural: ExtractionStrategy = serde_json::from_str(r#""structural""#).unwrap();
    let model: ExtractionStrategy = serde_json::from_str(r#""model_assisted""#).unwrap();
    assert_eq!(structural, ExtractionStrategy::Structural);
    assert_eq!(model, ExtractionStrategy::ModelAssisted);
}
