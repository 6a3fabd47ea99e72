//! Concurrency-bounded redirect resolution.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures_util::future::join_all;
use jobsift_core::RedirectOutcome;

use crate::error::EngineError;

/// Desktop browser identity, for origins that vary their redirect
/// behaviour on user agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ResolveSettings {
    /// Per-request budget, measured from issuance. A timed-out probe is
    /// abandoned and reported as a failed outcome, never retried here.
    pub timeout: Duration,
    /// Peak in-flight probes within one batch window.
    pub max_concurrent: usize,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_concurrent: 5,
        }
    }
}

/// Follows redirect chains with lightweight HEAD probes.
#[derive(Debug)]
pub struct RedirectResolver {
    client: reqwest::Client,
    settings: ResolveSettings,
}

impl RedirectResolver {
    pub fn new(settings: ResolveSettings) -> Result<Self, EngineError> {
        // Redirects are followed transparently up to reqwest's default
        // chain length; only the timeout and identity are ours.
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| EngineError::Config(format!("http client: {err}")))?;
        Ok(Self { client, settings })
    }

    /// Probe one URL's redirect chain.
    ///
    /// Total over its input domain: every failure is folded into the
    /// outcome with `final_url` falling back to the original, never
    /// surfaced as an error.
    pub async fn resolve(&self, url: &str) -> RedirectOutcome {
        match self.client.head(url).send().await {
            Ok(response) => {
                let final_url = response.url().to_string();
                let status = response.status();
                if status.is_success() {
                    RedirectOutcome::resolved(url, final_url)
                } else {
                    RedirectOutcome::failed(url, format!("http status {status}"))
                }
            }
            Err(err) if err.is_timeout() => RedirectOutcome::failed(
                url,
                format!("timed out after {:?}", self.settings.timeout),
            ),
            Err(err) => RedirectOutcome::failed(url, err.to_string()),
        }
    }

    /// Resolve many URLs with bounded concurrency.
    ///
    /// Inputs are deduplicated (each distinct URL resolved once), then
    /// partitioned into consecutive windows of `max_concurrent`. Windows
    /// run sequentially; probes inside a window run concurrently. Peak
    /// outbound connections never exceed the window size regardless of
    /// total URL count.
    pub async fn resolve_batch(&self, urls: &[String]) -> HashMap<String, RedirectOutcome> {
        let mut seen = HashSet::new();
        let distinct: Vec<&str> = urls
            .iter()
            .map(String::as_str)
            .filter(|url| seen.insert(*url))
            .collect();

        let window = self.settings.max_concurrent.max(1);
        let mut outcomes = HashMap::with_capacity(distinct.len());
        for chunk in distinct.chunks(window) {
            let probes = chunk.iter().map(|url| self.resolve(url));
            for outcome in join_all(probes).await {
                outcomes.insert(outcome.original_url.clone(), outcome);
            }
        }
        outcomes
    }
}
