//! Structural link extraction: selector query plus text/pattern filtering.

use jobsift_core::{CandidateLink, PatternSet, SourcePolicy};
use scraper::{Html, Selector};

use crate::error::EngineError;

/// Filter counters reported in debug mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Nodes the selector query yielded.
    pub selected: usize,
    /// Nodes without a link-target attribute (skipped, not an error).
    pub missing_target: usize,
    pub excluded_by_text: usize,
    pub excluded_by_pattern: usize,
    pub matched: usize,
}

/// Compiled structural extractor for one sender's policy.
#[derive(Debug)]
pub struct StructuralLinkExtractor {
    selector: Selector,
    patterns: PatternSet,
    exclusions: Vec<String>,
}

impl StructuralLinkExtractor {
    /// Compile a policy's selector query and link patterns.
    ///
    /// An invalid selector fails here, at configuration-validation time,
    /// naming the offending selector and sender.
    pub fn for_policy(policy: &SourcePolicy) -> Result<Self, EngineError> {
        let selector =
            Selector::parse(&policy.link_selector).map_err(|err| EngineError::Selector {
                selector: policy.link_selector.clone(),
                sender: policy.sender_match.clone(),
                message: err.to_string(),
            })?;
        let patterns = policy.compile_patterns()?;
        let exclusions = policy
            .text_exclusions
            .iter()
            .map(|needle| needle.to_lowercase())
            .collect();
        Ok(Self {
            selector,
            patterns,
            exclusions,
        })
    }

    pub fn extract(&self, html: &str) -> Vec<CandidateLink> {
        self.extract_with_stats(html).0
    }

    /// Extract candidate links in document order and count what each
    /// filter rejected.
    ///
    /// Parsing is permissive: malformed markup yields whatever structure
    /// could be recovered, possibly zero candidates, never an error. Zero
    /// candidates is a valid outcome, not a failure.
    pub fn extract_with_stats(&self, html: &str) -> (Vec<CandidateLink>, ExtractionStats) {
        let normalized = strip_default_xmlns(html);
        let document = Html::parse_document(&normalized);

        let mut stats = ExtractionStats::default();
        let mut candidates = Vec::new();
        for node in document.select(&self.selector) {
            stats.selected += 1;
            let Some(href) = node.value().attr("href") else {
                stats.missing_target += 1;
                continue;
            };
            let text = node.text().collect::<String>().trim().to_string();
            if self.is_excluded_text(&text) {
                stats.excluded_by_text += 1;
                continue;
            }
            let url = href.trim();
            if !self.patterns.matches(url) {
                stats.excluded_by_pattern += 1;
                continue;
            }
            stats.matched += 1;
            candidates.push(CandidateLink {
                url: url.to_string(),
                anchor_text: text,
            });
        }
        (candidates, stats)
    }

    fn is_excluded_text(&self, text: &str) -> bool {
        if self.exclusions.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        self.exclusions
            .iter()
            .any(|needle| lowered.contains(needle.as_str()))
    }
}

/// Strip a default XML/XHTML namespace declaration so unqualified selector
/// queries behave the same whether or not the document declares one.
pub fn strip_default_xmlns(html: &str) -> String {
    const DOUBLE_QUOTED: &str = r#" xmlns="http://www.w3.org/1999/xhtml""#;
    const SINGLE_QUOTED: &str = r#" xmlns='http://www.w3.org/1999/xhtml'"#;
    html.replacen(DOUBLE_QUOTED, "", 1).replacen(SINGLE_QUOTED, "", 1)
}
