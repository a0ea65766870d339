//! # Generation Client
//!
//! Wraps the Gemini `generateContent` endpoint: exactly one outbound HTTPS
//! request per attempt, a hard timeout, and bounded exponential backoff on
//! transient failures. Every retry re-acquires a quota slot from the tracker
//! first; the rate gate is never bypassed.
//!
//! The API key comes from the process environment and is only ever sent as a
//! request header. It must not appear in log events or output files.

use serde::{Deserialize, Serialize};
use std::env;
use std::thread;
use std::time::Duration;
use tracing::warn;

use crate::error::ProviderError;
use crate::models::{GenerationResult, ModelQuota};
use crate::tracker::{QuotaDecision, QuotaTracker};
use crate::utils::estimate_tokens;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Total attempts, including the first one
const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 2_000;
const MAX_DELAY_MS: u64 = 30_000;
/// How much of an error body to keep in failure messages
const ERROR_DETAIL_LIMIT: usize = 300;

pub struct GenerationClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<ContentPayload<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct ContentPayload<'a> {
    parts: Vec<PartPayload<'a>>,
}

#[derive(Serialize)]
struct PartPayload<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentDto {
    #[serde(default)]
    candidates: Vec<CandidateDto>,
}

#[derive(Debug, Deserialize)]
struct CandidateDto {
    content: Option<ContentDto>,
}

#[derive(Debug, Deserialize)]
struct ContentDto {
    #[serde(default)]
    parts: Vec<PartDto>,
}

#[derive(Debug, Deserialize)]
struct PartDto {
    text: Option<String>,
}

impl GenerationClient {
    /// Client against the real endpoint (or `GEMINI_API_BASE_URL` override)
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let base_url =
            env::var("GEMINI_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(api_key, timeout, base_url)
    }

    pub fn with_base_url(api_key: String, timeout: Duration, base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_read(timeout)
            .timeout_write(timeout)
            .timeout(timeout)
            .build();
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            agent,
            api_key,
            base_url,
        }
    }

    /// Generate text for `prompt`, retrying transient failures.
    ///
    /// The caller has already acquired a quota slot for the first attempt;
    /// each retry wins its own slot from `tracker` before going out. Provider
    /// failures are reported in-band on the result; only tracker/store
    /// failures propagate as errors.
    pub fn generate(
        &self,
        tracker: &QuotaTracker,
        quota: &ModelQuota,
        prompt: &str,
        max_output_tokens: u32,
    ) -> anyhow::Result<GenerationResult> {
        let estimated = estimate_tokens(prompt, max_output_tokens);
        let mut last_transient = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                thread::sleep(backoff_delay(attempt - 1));
                match tracker.try_acquire(quota, estimated)? {
                    QuotaDecision::Allowed => {}
                    QuotaDecision::Denied { reason, .. } => {
                        return Ok(GenerationResult::failed(
                            &quota.model,
                            format!("retry blocked by quota: {reason}"),
                        ));
                    }
                }
            }

            match self.attempt(&quota.model, prompt, max_output_tokens) {
                Ok(content) => return Ok(GenerationResult::ok(content, &quota.model)),
                Err(ProviderError::Transient(msg)) => {
                    warn!(
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        "transient provider failure: {msg}"
                    );
                    last_transient = msg;
                }
                Err(err @ ProviderError::Permanent(_)) => {
                    return Ok(GenerationResult::failed(&quota.model, err.to_string()));
                }
            }
        }

        Ok(GenerationResult::failed(
            &quota.model,
            format!("retries exhausted after {MAX_ATTEMPTS} attempts: {last_transient}"),
        ))
    }

    /// One request, one response. Classification of failures happens here.
    fn attempt(
        &self,
        model: &str,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = GenerateRequest {
            contents: vec![ContentPayload {
                parts: vec![PartPayload { text: prompt }],
            }],
            generation_config: GenerationConfig { max_output_tokens },
        };

        let response = self
            .agent
            .post(&url)
            .set("x-goog-api-key", &self.api_key)
            .send_json(body);

        match response {
            Ok(resp) => {
                let dto: GenerateContentDto = resp.into_json().map_err(|e| {
                    ProviderError::Permanent(format!("malformed response body: {e}"))
                })?;
                extract_text(dto).ok_or_else(|| {
                    ProviderError::Permanent("response contained no generated text".to_string())
                })
            }
            Err(ureq::Error::Status(code, resp)) => {
                let detail = truncate(&resp.into_string().unwrap_or_default());
                Err(classify_status(code, detail))
            }
            Err(ureq::Error::Transport(t)) => {
                Err(ProviderError::Transient(format!("transport error: {t}")))
            }
        }
    }
}

/// Rate-limit signals, timeouts and server errors are retryable; every other
/// status is a request we should not repeat
fn classify_status(code: u16, detail: String) -> ProviderError {
    match code {
        408 | 429 | 500..=599 => ProviderError::Transient(format!("HTTP {code}: {detail}")),
        _ => ProviderError::Permanent(format!("HTTP {code}: {detail}")),
    }
}

/// Delay before the (retries+1)-th attempt: doubling from the base, capped.
/// `GEMINI_BLOGGEN_RETRY_BASE_MS` overrides the base (tests use this).
fn backoff_delay(retries: u32) -> Duration {
    let base = env::var("GEMINI_BLOGGEN_RETRY_BASE_MS")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(BASE_DELAY_MS);
    let ms = base.saturating_mul(1u64 << retries.saturating_sub(1).min(16));
    Duration::from_millis(ms.min(MAX_DELAY_MS))
}

fn extract_text(dto: GenerateContentDto) -> Option<String> {
    let text: String = dto
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn truncate(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() <= ERROR_DETAIL_LIMIT {
        trimmed.to_string()
    } else {
        let mut end = ERROR_DETAIL_LIMIT;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &trimmed[..end])
    }
}
