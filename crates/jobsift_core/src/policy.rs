//! Per-sender extraction policies.
//!
//! Policies are configuration: loaded externally (serde), read-only during
//! a run, and mapped one-to-one to a sender.

use serde::Deserialize;

use crate::pattern::{PatternError, PatternSet};

/// Which of the two extraction strategies a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    Structural,
    ModelAssisted,
}

/// Read-only extraction configuration for exactly one sender.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourcePolicy {
    /// Substring matched against `RawEmail::sender`.
    pub sender_match: String,
    /// Ordered wildcard URL patterns; a link must match at least one.
    pub link_patterns: Vec<String>,
    /// Resolve redirect chains for matched links.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
    /// Selector query yielding the anchor-like nodes to inspect.
    pub link_selector: String,
    /// Lowercase substrings; an anchor whose text contains one is dropped.
    #[serde(default)]
    pub text_exclusions: Vec<String>,
}

fn default_follow_redirects() -> bool {
    true
}

impl SourcePolicy {
    pub fn applies_to(&self, sender: &str) -> bool {
        sender.contains(&self.sender_match)
    }

    pub fn compile_patterns(&self) -> Result<PatternSet, PatternError> {
        PatternSet::compile(&self.link_patterns)
    }
}
