//! Approximate token counting for model budgeting.

use engine_logging::engine_warn;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("tokenizer failed: {0}")]
pub struct TokenizerError(pub String);

/// Static description of a model: context window plus tuning for the
/// subword approximation. Process-wide read-only data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelProfile {
    pub name: &'static str,
    pub context_limit: u32,
    /// Average characters folded into one subword token.
    pub chars_per_token: u32,
}

/// Conservative assumption for models absent from the table.
pub const DEFAULT_CONTEXT_LIMIT: u32 = 128_000;

const DEFAULT_PROFILE: ModelProfile = ModelProfile {
    name: "unknown",
    context_limit: DEFAULT_CONTEXT_LIMIT,
    chars_per_token: 4,
};

static KNOWN_MODELS: &[ModelProfile] = &[
    ModelProfile {
        name: "gpt-4o-mini",
        context_limit: 128_000,
        chars_per_token: 4,
    },
    ModelProfile {
        name: "gpt-4o",
        context_limit: 128_000,
        chars_per_token: 4,
    },
    ModelProfile {
        name: "gpt-4-turbo",
        context_limit: 128_000,
        chars_per_token: 4,
    },
    ModelProfile {
        name: "gpt-4",
        context_limit: 8_192,
        chars_per_token: 4,
    },
    ModelProfile {
        name: "gpt-3.5-turbo",
        context_limit: 16_385,
        chars_per_token: 4,
    },
];

/// Look up the profile for a model identifier.
///
/// Longest-prefix match against the static table so dated variants
/// ("gpt-4o-2024-08-06") land on their family; unknown identifiers get the
/// conservative default rather than failing.
pub fn profile_for(model: &str) -> ModelProfile {
    KNOWN_MODELS
        .iter()
        .copied()
        .find(|profile| model.starts_with(profile.name))
        .unwrap_or(DEFAULT_PROFILE)
}

pub fn context_limit_for(model: &str) -> u32 {
    profile_for(model).context_limit
}

/// Something that can count tokens of arbitrary text. Implementations may
/// fail; callers go through [`estimate_tokens`] for the non-failing path.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<u32, TokenizerError>;
}

/// Deterministic subword approximation.
///
/// Whitespace-delimited words cost one token per `chars_per_token` chunk,
/// so long words are charged as several subwords the way real tokenizers
/// split them.
#[derive(Debug, Clone, Copy)]
pub struct SubwordHeuristicCounter {
    chars_per_token: u32,
}

impl SubwordHeuristicCounter {
    pub fn for_model(model: &str) -> Self {
        Self {
            chars_per_token: profile_for(model).chars_per_token.max(1),
        }
    }
}

impl Default for SubwordHeuristicCounter {
    fn default() -> Self {
        Self { chars_per_token: 4 }
    }
}

impl TokenCounter for SubwordHeuristicCounter {
    fn count(&self, text: &str) -> Result<u32, TokenizerError> {
        let mut tokens: u64 = 0;
        for word in text.split_whitespace() {
            let chars = word.chars().count() as u64;
            tokens += chars.div_ceil(u64::from(self.chars_per_token)).max(1);
        }
        u32::try_from(tokens).map_err(|_| TokenizerError("token count overflow".into()))
    }
}

/// Fallback floor: roughly four characters per token. Never fails and is
/// non-negative by construction.
pub fn heuristic_estimate(text: &str) -> u32 {
    let chars = text.chars().count() as u64;
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX)
}

/// Count tokens via `counter`, falling back to the character heuristic when
/// the counter fails. Pure aside from a diagnostic warning on fallback.
pub fn estimate_tokens(text: &str, counter: &dyn TokenCounter) -> u32 {
    match counter.count(text) {
        Ok(tokens) => tokens,
        Err(err) => {
            engine_warn!("token counter failed ({err}); using character heuristic");
            heuristic_estimate(text)
        }
    }
}
