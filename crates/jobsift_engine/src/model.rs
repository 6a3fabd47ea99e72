//! Model-assisted extraction: one structured request per email batch.

use async_trait::async_trait;
use engine_logging::engine_warn;
use serde::Deserialize;
use serde_json::Value;

use jobsift_core::{JobListing, RawEmail};

use crate::error::EngineError;
use crate::prompt::render_batch_prompt;

/// A collaborator that answers one prompt with structured text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete_structured(&self, prompt: &str) -> Result<String, EngineError>;

    /// Model identifier, for budget and tokenizer selection.
    fn model(&self) -> &str;
}

/// OpenAI-style chat-completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Read the API key from `OPENAI_API_KEY`.
    pub fn from_env(model: impl Into<String>) -> Result<Self, EngineError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| EngineError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key, model))
    }

    /// Point at a different endpoint (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete_structured(&self, prompt: &str) -> Result<String, EngineError> {
        let request = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.0,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| EngineError::ModelRequest(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::ModelRequest(format!(
                "http status {status}: {}",
                excerpt(&body)
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|err| EngineError::ModelRequest(format!("malformed envelope: {err}")))?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| EngineError::ModelRequest("response carried no choices".into()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Builds batch prompts, invokes the model, and parses its reply.
pub struct ModelAssistedExtractor<C> {
    client: C,
}

impl<C: ModelClient> ModelAssistedExtractor<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Extract listings from one batch via a single model call.
    ///
    /// An unparseable or empty response is a hard failure for the batch; a
    /// parseable empty array is a valid "model found nothing".
    pub async fn extract_batch(&self, batch: &[RawEmail]) -> Result<Vec<JobListing>, EngineError> {
        let prompt = render_batch_prompt(batch);
        let raw = self.client.complete_structured(&prompt).await?;
        parse_listings(&raw, batch)
    }
}

/// Wire shape of one listing in the model's reply.
#[derive(Debug, Deserialize)]
struct RawListingEntry {
    #[serde(default)]
    email_index: Option<usize>,
    #[serde(default, alias = "title")]
    job_title: Option<String>,
    #[serde(default, alias = "job_url", alias = "link", alias = "url")]
    job_link: Option<String>,
}

/// Field names under which a wrapping object may carry the listing array.
const WRAPPER_FIELDS: &[&str] = &["jobs", "listings", "results"];

/// Parse the model reply: either a bare array of listing records or an
/// object wrapping the array under a known field. Both shapes are handled
/// identically.
///
/// Entries without a usable link are dropped with a warning; a missing
/// title passes through as an empty string.
pub fn parse_listings(raw: &str, batch: &[RawEmail]) -> Result<Vec<JobListing>, EngineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format_error("empty response", raw));
    }
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|err| format_error(&format!("not parseable JSON: {err}"), raw))?;

    let entries = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            match WRAPPER_FIELDS.iter().find(|field| map.contains_key(**field)) {
                Some(field) => match map.remove(*field) {
                    Some(Value::Array(items)) => items,
                    _ => {
                        return Err(format_error(
                            &format!("field {field:?} is not an array"),
                            raw,
                        ))
                    }
                },
                None => return Err(format_error("object carries no known listing field", raw)),
            }
        }
        _ => return Err(format_error("expected an array or wrapping object", raw)),
    };

    let mut listings = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry: RawListingEntry = serde_json::from_value(entry)
            .map_err(|err| format_error(&format!("listing entry malformed: {err}"), raw))?;
        let Some(link) = entry.job_link.filter(|link| !link.trim().is_empty()) else {
            engine_warn!("dropping listing entry without a job link");
            continue;
        };
        // Attribute source metadata through the echoed email index; an
        // entry with a missing or out-of-range index inherits the first
        // email of the batch.
        let Some(source) = entry
            .email_index
            .and_then(|index| batch.get(index))
            .or_else(|| batch.first())
        else {
            continue;
        };
        listings.push(JobListing {
            email_from: source.sender.clone(),
            email_subject: source.subject.clone(),
            email_date: source.date.clone(),
            job_title: entry.job_title.unwrap_or_default(),
            job_link: link.trim().to_string(),
        });
    }
    Ok(listings)
}

fn format_error(message: &str, raw: &str) -> EngineError {
    EngineError::ResponseFormat {
        message: message.to_string(),
        excerpt: excerpt(raw),
    }
}

/// Leading slice of the raw response kept for diagnostics.
fn excerpt(raw: &str) -> String {
    const MAX_CHARS: usize = 200;
    if raw.chars().count() <= MAX_CHARS {
        return raw.to_string();
    }
    let mut excerpt: String = raw.chars().take(MAX_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}
