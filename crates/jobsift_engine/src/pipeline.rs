//! Pipeline orchestration: the two extraction strategies behind one trait.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use jobsift_core::{
    plan_batch_size, JobListing, RawEmail, SourcePolicy, SubwordHeuristicCounter, TokenBudget,
};

use crate::debug::DebugSink;
use crate::error::EngineError;
use crate::extract::{strip_default_xmlns, StructuralLinkExtractor};
use crate::model::{ModelAssistedExtractor, ModelClient};
use crate::prompt::{prompt_overhead, render_batch_prompt};
use crate::resolve::{RedirectResolver, ResolveSettings};

/// Common interface over both strategies: produce listings from raw
/// emails. Which implementation runs is a configuration choice.
#[async_trait]
pub trait ListingExtractor: Send + Sync {
    async fn process(&self, emails: &[RawEmail]) -> Vec<JobListing>;
}

#[derive(Debug)]
struct CompiledPolicy {
    policy: SourcePolicy,
    extractor: StructuralLinkExtractor,
}

/// Structural strategy: selector extraction, pattern filtering, redirect
/// resolution.
#[derive(Debug)]
pub struct StructuralPipeline {
    policies: Vec<CompiledPolicy>,
    resolver: RedirectResolver,
    debug: Option<DebugSink>,
}

impl StructuralPipeline {
    /// Compile every policy up front so a bad selector aborts before any
    /// email is touched.
    pub fn new(
        policies: Vec<SourcePolicy>,
        settings: ResolveSettings,
    ) -> Result<Self, EngineError> {
        let mut compiled = Vec::with_capacity(policies.len());
        for policy in policies {
            let extractor = StructuralLinkExtractor::for_policy(&policy)?;
            compiled.push(CompiledPolicy { policy, extractor });
        }
        Ok(Self {
            policies: compiled,
            resolver: RedirectResolver::new(settings)?,
            debug: None,
        })
    }

    /// Additionally report filter counts and keep the normalized markup
    /// for inspection.
    pub fn with_debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug = Some(sink);
        self
    }

    async fn process_email(&self, email: &RawEmail) -> Vec<JobListing> {
        let Some(compiled) = self
            .policies
            .iter()
            .find(|compiled| compiled.policy.applies_to(&email.sender))
        else {
            engine_debug!("no policy for sender {:?}; skipping", email.sender);
            return Vec::new();
        };

        let (candidates, stats) = compiled.extractor.extract_with_stats(&email.body);
        if let Some(sink) = &self.debug {
            engine_info!(
                "{:?}: {} matched, {} excluded by text, {} excluded by pattern, {} without target",
                email.subject,
                stats.matched,
                stats.excluded_by_text,
                stats.excluded_by_pattern,
                stats.missing_target,
            );
            if let Err(err) = sink.write_markup(&email.subject, &strip_default_xmlns(&email.body))
            {
                engine_warn!("failed to write markup artifact: {err}");
            }
        }

        let final_urls: HashMap<String, String> =
            if compiled.policy.follow_redirects && !candidates.is_empty() {
                let urls: Vec<String> = candidates.iter().map(|c| c.url.clone()).collect();
                let outcomes = self.resolver.resolve_batch(&urls).await;
                for outcome in outcomes.values().filter(|outcome| !outcome.succeeded) {
                    engine_warn!(
                        "redirect probe failed for {}: {}",
                        outcome.original_url,
                        outcome.failure_reason.as_deref().unwrap_or("unknown"),
                    );
                }
                outcomes
                    .into_iter()
                    .map(|(url, outcome)| (url, outcome.final_url))
                    .collect()
            } else {
                HashMap::new()
            };

        candidates
            .into_iter()
            .map(|candidate| {
                let link = final_urls
                    .get(&candidate.url)
                    .cloned()
                    .unwrap_or(candidate.url);
                JobListing {
                    email_from: email.sender.clone(),
                    email_subject: email.subject.clone(),
                    email_date: email.date.clone(),
                    job_title: candidate.anchor_text,
                    job_link: link,
                }
            })
            .collect()
    }
}

#[async_trait]
impl ListingExtractor for StructuralPipeline {
    async fn process(&self, emails: &[RawEmail]) -> Vec<JobListing> {
        let mut listings = Vec::new();
        for email in emails {
            listings.extend(self.process_email(email).await);
        }
        listings
    }
}

/// Tuning for the model-assisted pipeline.
#[derive(Debug, Clone)]
pub struct ModelRunSettings {
    /// Ceiling on emails per model call, before token budgeting.
    pub max_batch_size: usize,
    /// Politeness pause between successive model calls; zero disables it.
    /// A rate-limit control, not a performance knob.
    pub batch_delay: Duration,
}

impl Default for ModelRunSettings {
    fn default() -> Self {
        Self {
            max_batch_size: 10,
            batch_delay: Duration::from_secs(1),
        }
    }
}

/// Model-assisted strategy: token-budgeted batches, strictly sequential
/// calls.
pub struct ModelPipeline<C> {
    extractor: ModelAssistedExtractor<C>,
    budget: TokenBudget,
    counter: SubwordHeuristicCounter,
    settings: ModelRunSettings,
    debug: Option<DebugSink>,
}

impl<C: ModelClient> ModelPipeline<C> {
    pub fn new(client: C, settings: ModelRunSettings) -> Result<Self, EngineError> {
        let budget = TokenBudget::for_model(client.model(), settings.max_batch_size)
            .map_err(|err| EngineError::Config(err.to_string()))?;
        let counter = SubwordHeuristicCounter::for_model(client.model());
        Ok(Self {
            extractor: ModelAssistedExtractor::new(client),
            budget,
            counter,
            settings,
            debug: None,
        })
    }

    /// Keep rendered prompts for inspection and skip the network call
    /// entirely, yielding no listings.
    pub fn with_debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug = Some(sink);
        self
    }
}

#[async_trait]
impl<C: ModelClient> ListingExtractor for ModelPipeline<C> {
    async fn process(&self, emails: &[RawEmail]) -> Vec<JobListing> {
        if emails.is_empty() {
            return Vec::new();
        }
        let overhead = prompt_overhead(&self.counter);
        let batch_size = plan_batch_size(emails, &self.budget, overhead, &self.counter);
        engine_info!(
            "processing {} emails in batches of {batch_size}",
            emails.len()
        );

        let mut listings = Vec::new();
        let mut first = true;
        for batch in emails.chunks(batch_size) {
            if !first && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
            first = false;

            if let Some(sink) = &self.debug {
                let prompt = render_batch_prompt(batch);
                let subject = batch
                    .first()
                    .map(|email| email.subject.as_str())
                    .unwrap_or("batch");
                if let Err(err) = sink.write_prompt(subject, &prompt) {
                    engine_warn!("failed to write prompt artifact: {err}");
                }
                continue;
            }

            // A failed batch loses its listings but never the run.
            match self.extractor.extract_batch(batch).await {
                Ok(batch_listings) => listings.extend(batch_listings),
                Err(err) => engine_error!("batch failed, continuing with next: {err}"),
            }
        }
        listings
    }
}
