//! Wildcard URL patterns.
//!
//! A pattern is a literal string where `*` matches any substring at that
//! position, including the empty string and additional `/` segments. Every
//! other character matches itself, URL metacharacters (`.`, `?`, ...)
//! included.

use engine_logging::engine_warn;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("failed to compile link pattern {pattern:?}: {source}")]
    Compile {
        pattern: String,
        source: regex::Error,
    },
}

/// Compiled form of one policy's ordered pattern list.
#[derive(Debug, Clone)]
pub struct PatternSet {
    compiled: Vec<Regex>,
}

impl PatternSet {
    pub fn compile(patterns: &[String]) -> Result<Self, PatternError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            compiled.push(compile_pattern(pattern)?);
        }
        Ok(Self { compiled })
    }

    /// True when the URL matches any pattern; the first hit short-circuits.
    pub fn matches(&self, url: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(url))
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }
}

/// One-off check of a single pattern against a URL.
pub fn wildcard_matches(url: &str, pattern: &str) -> bool {
    match compile_pattern(pattern) {
        Ok(re) => re.is_match(url),
        Err(err) => {
            engine_warn!("unusable link pattern: {err}");
            false
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, PatternError> {
    // Escape everything, then widen the escaped `*` back into a "match
    // anything" token. `(?s)` lets `*` span newlines, and the anchors make
    // this a full-string match rather than a substring search.
    let escaped = regex::escape(pattern).replace("\\*", ".*");
    let anchored = format!("^(?s:{escaped})$");
    Regex::new(&anchored).map_err(|source| PatternError::Compile {
        pattern: pattern.to_string(),
        source,
    })
}
