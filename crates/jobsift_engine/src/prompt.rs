//! Prompt assembly for model-assisted extraction.
//!
//! The wrapper text is process-wide read-only data; its token cost is the
//! `prompt_overhead` input to the batch planner.

use jobsift_core::{estimate_tokens, RawEmail, TokenCounter};

/// Fixed instructional wrapper, constant per model and independent of
/// email content.
pub const PROMPT_HEADER: &str = "\
You are given a numbered series of emails that may contain job postings.
Extract every job posting you find.

Respond with JSON only: an array of objects, each shaped as
{\"email_index\": <number of the source email>, \"job_title\": \"...\", \"job_link\": \"...\"}.
Wrapping the array in an object under a \"jobs\" key is also accepted.
Return [] if no email contains a job posting.
";

/// Serialize a batch into one prompt, each email introduced by an explicit
/// index marker the model echoes back as `email_index`.
pub fn render_batch_prompt(batch: &[RawEmail]) -> String {
    let mut prompt = String::from(PROMPT_HEADER);
    for (index, email) in batch.iter().enumerate() {
        prompt.push_str(&format!("\n=== EMAIL {index} ===\n"));
        prompt.push_str(&email.formatted());
        prompt.push('\n');
    }
    prompt
}

/// Token cost of the wrapper text alone.
pub fn prompt_overhead(counter: &dyn TokenCounter) -> u32 {
    estimate_tokens(PROMPT_HEADER, counter)
}
