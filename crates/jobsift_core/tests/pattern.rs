use jobsift_core::{wildcard_matches, PatternSet};
use pretty_assertions::assert_eq;

#[test]
fn star_matches_any_substring_including_slashes() {
    assert!(wildcard_matches("https://a.com/x/y", "https://a.com/*"));
    assert!(wildcard_matches(
        "https://a.com/jobs/view/12345?ref=email",
        "https://a.com/jobs/*"
    ));
}

#[test]
fn star_matches_the_empty_substring() {
    assert!(wildcard_matches("https://a.com/", "https://a.com/*"));
    assert!(wildcard_matches("https://a.com", "https://a.com*"));
}

#[test]
fn different_host_does_not_match() {
    assert!(!wildcard_matches("https://a.com", "https://b.com/*"));
}

#[test]
fn match_is_full_string_not_substring() {
    // Without anchors "a.com/*" would match inside a longer URL.
    assert!(!wildcard_matches(
        "https://evil.com/https://a.com/x",
        "https://a.com/*"
    ));
    assert!(!wildcard_matches("xhttps://a.com/x", "https://a.com/*"));
}

#[test]
fn dot_is_literal_not_a_metacharacter() {
    assert!(!wildcard_matches("https://aXcom/page", "https://a.com/*"));
    assert!(wildcard_matches("https://a.com/page", "https://a.com/*"));
}

#[test]
fn question_mark_is_literal() {
    assert!(wildcard_matches("https://a.com/q?id=9", "https://a.com/q?id=*"));
    assert!(!wildcard_matches("https://a.com/qid=9", "https://a.com/q?id=*"));
}

#[test]
fn pattern_set_matches_any_pattern() {
    let patterns = vec![
        "https://b.com/*".to_string(),
        "https://a.com/jobs/*".to_string(),
    ];
    let set = PatternSet::compile(&patterns).expect("patterns compile");
    assert_eq!(set.len(), 2);
    assert!(set.matches("https://a.com/jobs/1"));
    assert!(set.matches("https://b.com/whatever"));
    assert!(!set.matches("https://c.com/jobs/1"));
}

#[test]
fn empty_pattern_set_matches_nothing() {
    let set = PatternSet::compile(&[]).expect("empty set compiles");
    assert!(set.is_empty());
    assert!(!set.matches("https://a.com/"));
}
