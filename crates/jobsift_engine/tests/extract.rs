use std::sync::Once;

use jobsift_core::SourcePolicy;
use jobsift_engine::{strip_default_xmlns, EngineError, StructuralLinkExtractor};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn policy() -> SourcePolicy {
    SourcePolicy {
        sender_match: "jobs@example.com".to_string(),
        link_patterns: vec!["https://example.com/jobs/*".to_string()],
        follow_redirects: false,
        link_selector: "a".to_string(),
        text_exclusions: vec!["unsubscribe".to_string()],
    }
}

#[test]
fn filters_by_text_and_pattern_preserving_document_order() {
    init_logging();
    let html = r#"
        <html><body>
            <a href="https://example.com/jobs/1">Senior Engineer</a>
            <a href="https://example.com/jobs/2">UNSUBSCRIBE from this digest</a>
            <a href="https://tracker.example.net/click">Junior Engineer</a>
        </body></html>
    "#;
    let extractor = StructuralLinkExtractor::for_policy(&policy()).expect("policy compiles");
    let (candidates, stats) = extractor.extract_with_stats(html);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].url, "https://example.com/jobs/1");
    assert_eq!(candidates[0].anchor_text, "Senior Engineer");

    assert_eq!(stats.selected, 3);
    assert_eq!(stats.excluded_by_text, 1);
    assert_eq!(stats.excluded_by_pattern, 1);
    assert_eq!(stats.matched, 1);
}

#[test]
fn text_exclusion_is_case_insensitive_substring() {
    init_logging();
    let html = r#"<a href="https://example.com/jobs/1">Click to UnSuBsCrIbE now</a>"#;
    let extractor = StructuralLinkExtractor::for_policy(&policy()).expect("policy compiles");
    assert!(extractor.extract(html).is_empty());
}

#[test]
fn candidates_come_back_in_document_order() {
    let html = r#"
        <a href="https://example.com/jobs/3">Third listed first</a>
        <a href="https://example.com/jobs/1">Then this one</a>
        <a href="https://example.com/jobs/2">And this one</a>
    "#;
    let extractor = StructuralLinkExtractor::for_policy(&policy()).expect("policy compiles");
    let urls: Vec<String> = extractor.extract(html).into_iter().map(|c| c.url).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com/jobs/3",
            "https://example.com/jobs/1",
            "https://example.com/jobs/2",
        ]
    );
}

#[test]
fn nodes_without_link_target_are_skipped_not_errors() {
    let html = r#"<a name="anchor-only">No target</a><a href="https://example.com/jobs/1">Real</a>"#;
    let extractor = StructuralLinkExtractor::for_policy(&policy()).expect("policy compiles");
    let (candidates, stats) = extractor.extract_with_stats(html);
    assert_eq!(candidates.len(), 1);
    assert_eq!(stats.missing_target, 1);
}

#[test]
fn malformed_markup_still_yields_recoverable_candidates() {
    // Unclosed tags and stray closers; the matching anchor is still
    // structurally recoverable and extraction must not raise.
    let html = r#"
        <html><body><div><p>Broken
        <a href="https://example.com/jobs/1">Engineer</a>
        </span></table>
    "#;
    let extractor = StructuralLinkExtractor::for_policy(&policy()).expect("policy compiles");
    let candidates = extractor.extract(html);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].anchor_text, "Engineer");
}

#[test]
fn zero_candidates_is_a_valid_outcome() {
    let extractor = StructuralLinkExtractor::for_policy(&policy()).expect("policy compiles");
    assert!(extractor.extract("<html><body><p>no links</p></body></html>").is_empty());
    assert!(extractor.extract("").is_empty());
}

#[test]
fn xhtml_namespace_declaration_does_not_break_selection() {
    let html = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body>
        <a href="https://example.com/jobs/1">Engineer</a>
    </body></html>"#;
    let extractor = StructuralLinkExtractor::for_policy(&policy()).expect("policy compiles");
    assert_eq!(extractor.extract(html).len(), 1);

    let stripped = strip_default_xmlns(html);
    assert!(!stripped.contains("xmlns="));
}

#[test]
fn invalid_selector_fails_naming_selector_and_sender() {
    init_logging();
    let mut bad = policy();
    bad.link_selector = "a[href=".to_string();
    let err = StructuralLinkExtractor::for_policy(&bad).expect_err("selector must not compile");
    match err {
        EngineError::Selector { selector, sender, .. } => {
            assert_eq!(selector, "a[href=");
            assert_eq!(sender, "jobs@example.com");
        }
        other => panic!("unexpected error: {other}"),
    }
}
