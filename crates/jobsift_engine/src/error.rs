use thiserror::Error;

use crate::debug::PersistError;

/// Engine-level failures.
///
/// Per-link redirect failures never appear here: they are folded into
/// `RedirectOutcome` and reported as data. Selector and configuration
/// variants are fatal pre-run; `ResponseFormat` is per-batch and the run
/// continues past it.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configured selector query is syntactically invalid. Raised at
    /// pipeline construction: it would fail identically for every email.
    #[error("invalid link selector {selector:?} for sender {sender:?}: {message}")]
    Selector {
        selector: String,
        sender: String,
        message: String,
    },

    #[error(transparent)]
    Pattern(#[from] jobsift_core::PatternError),

    #[error("configuration error: {0}")]
    Config(String),

    /// The model reply was not the expected structure. Carries a raw
    /// excerpt so the failure can be diagnosed from logs.
    #[error("model response was not valid structured data ({message}); excerpt: {excerpt:?}")]
    ResponseFormat { message: String, excerpt: String },

    #[error("model request failed: {0}")]
    ModelRequest(String),

    #[error("debug artifact error: {0}")]
    Persist(#[from] PersistError),
}
