pub mod types;

use std::future::Future;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::warn;

use types::{Content, GenerateContentRequest, GenerateContentResponse, Part};

/// Model selection is a build-time constant, not user-facing.
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Total tries for a transient failure, including the first.
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(2);
const BACKOFF_JITTER_MS: u64 = 2_000;

/// Closed set of backend failure kinds. The presentation layer maps these to
/// localized text; nothing above this module inspects message strings.
#[derive(Debug, Clone, Error)]
pub enum GenerateError {
    #[error("API key is not configured")]
    MissingKey,
    #[error("API key was rejected")]
    InvalidKey,
    #[error("model overloaded: {0}")]
    Overloaded(String),
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GenerateError {
    /// Only overload/rate-limit failures are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerateError::Overloaded(_))
    }
}

/// Seam between the request tracker and the concrete backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

pub struct GeminiClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key)
    }

    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            http: Client::new(),
        }
    }

    /// POST /models/{model}:generateContent — one attempt, no retry.
    async fn generate_once(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/models/{GEMINI_MODEL}:generateContent", self.base_url);
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let body: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| GenerateError::Malformed(e.to_string()))?;

        let text: String = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerateError::Malformed("empty candidate text".into()));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerateError::MissingKey);
        }
        with_retry(|| self.generate_once(prompt)).await
    }
}

/// Run `attempt` up to [`MAX_ATTEMPTS`] times, backing off exponentially
/// (2s, 4s base + 0-2s jitter) between transient failures.
pub(crate) async fn with_retry<F, Fut>(mut attempt: F) -> Result<String, GenerateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, GenerateError>>,
{
    let mut tries = 0u32;
    loop {
        tries += 1;
        match attempt().await {
            Ok(text) => return Ok(text),
            Err(e) if e.is_transient() && tries < MAX_ATTEMPTS => {
                let jitter = Duration::from_millis(rand::rng().random_range(0..=BACKOFF_JITTER_MS));
                let delay = BACKOFF_BASE * 2u32.pow(tries - 1) + jitter;
                warn!(attempt = tries, delay_ms = delay.as_millis() as u64, "backend busy, retrying: {e}");
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Map a non-2xx response to a [`GenerateError`] kind.
fn classify_failure(status: StatusCode, body: &str) -> GenerateError {
    let envelope: types::ApiErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let detail = envelope.error.unwrap_or_default();
    let message = detail
        .message
        .unwrap_or_else(|| body.trim().to_string());
    let api_status = detail.status.unwrap_or_default();

    if message.contains("API key not valid")
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
    {
        return GenerateError::InvalidKey;
    }

    let lowered = message.to_lowercase();
    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::SERVICE_UNAVAILABLE
        || api_status == "RESOURCE_EXHAUSTED"
        || api_status == "UNAVAILABLE"
        || lowered.contains("overloaded")
        || lowered.contains("busy")
    {
        return GenerateError::Overloaded(message);
    }

    GenerateError::Api {
        code: detail.code.unwrap_or_else(|| status.as_u16()),
        message,
    }
}
