//! Jobsift core: pure data model, pattern matching, and batch planning.
mod batch;
mod email;
mod pattern;
mod policy;
mod token;

pub use batch::{plan_batch_size, BudgetError, TokenBudget};
pub use email::{CandidateLink, JobListing, MessagePart, RawEmail, RedirectOutcome};
pub use pattern::{wildcard_matches, PatternError, PatternSet};
pub use policy::{ExtractionStrategy, SourcePolicy};
pub use token::{
    context_limit_for, estimate_tokens, heuristic_estimate, profile_for, ModelProfile,
    SubwordHeuristicCounter, TokenCounter, TokenizerError, DEFAULT_CONTEXT_LIMIT,
};
