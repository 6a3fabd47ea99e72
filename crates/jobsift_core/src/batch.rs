//! Adaptive batch sizing for model-assisted extraction.

use thiserror::Error;

use crate::email::RawEmail;
use crate::token::{context_limit_for, estimate_tokens, TokenCounter};

/// How many leading emails are sampled to estimate the average size.
const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("reserved tokens ({reserved}) must stay below the context limit ({limit})")]
    ReservedExceedsLimit { reserved: u32, limit: u32 },
    #[error("max batch size must be at least 1")]
    ZeroBatchSize,
}

/// Token budget for one model profile.
///
/// Invariants held at construction: `reserved_tokens < context_limit` and
/// `max_batch_size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    context_limit: u32,
    reserved_tokens: u32,
    max_batch_size: usize,
}

impl TokenBudget {
    /// Fixed safety margin kept free for the model's reply.
    pub const DEFAULT_RESERVED_TOKENS: u32 = 10_000;

    pub fn new(
        context_limit: u32,
        reserved_tokens: u32,
        max_batch_size: usize,
    ) -> Result<Self, BudgetError> {
        if reserved_tokens >= context_limit {
            return Err(BudgetError::ReservedExceedsLimit {
                reserved: reserved_tokens,
                limit: context_limit,
            });
        }
        if max_batch_size == 0 {
            return Err(BudgetError::ZeroBatchSize);
        }
        Ok(Self {
            context_limit,
            reserved_tokens,
            max_batch_size,
        })
    }

    /// Budget for a model identifier, from the static context-limit table.
    pub fn for_model(model: &str, max_batch_size: usize) -> Result<Self, BudgetError> {
        let context_limit = context_limit_for(model);
        // The table never carries a window smaller than the margin, but the
        // invariant is enforced in one place either way.
        let reserved = Self::DEFAULT_RESERVED_TOKENS.min(context_limit / 2);
        Self::new(context_limit, reserved, max_batch_size)
    }

    pub fn context_limit(&self) -> u32 {
        self.context_limit
    }

    pub fn reserved_tokens(&self) -> u32 {
        self.reserved_tokens
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Tokens usable for prompt content after the safety margin.
    pub fn available_tokens(&self) -> u32 {
        self.context_limit - self.reserved_tokens
    }
}

/// Compute how many emails fit into one model call.
///
/// Samples up to the first [`SAMPLE_SIZE`] emails to estimate the average
/// formatted size, then divides the budget left after `prompt_overhead`.
/// Never returns less than 1 (an oversized email still forms its own batch)
/// and never exceeds the configured ceiling. An empty input returns the
/// ceiling unchanged.
pub fn plan_batch_size(
    emails: &[RawEmail],
    budget: &TokenBudget,
    prompt_overhead: u32,
    counter: &dyn TokenCounter,
) -> usize {
    if emails.is_empty() {
        return budget.max_batch_size();
    }

    let sample = &emails[..emails.len().min(SAMPLE_SIZE)];
    let sample_total: u64 = sample
        .iter()
        .map(|email| u64::from(estimate_tokens(&email.formatted(), counter)))
        .sum();
    let avg_per_email = (sample_total / sample.len() as u64).max(1);

    let available =
        u64::from(budget.available_tokens()).saturating_sub(u64::from(prompt_overhead));
    let calculated = usize::try_from(available / avg_per_email).unwrap_or(usize::MAX);

    calculated.clamp(1, budget.max_batch_size())
}
