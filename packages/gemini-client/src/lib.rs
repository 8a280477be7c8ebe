//! Pure Gemini REST API client
//!
//! A minimal client for Google's Gemini `generateContent` endpoint with no
//! domain-specific logic.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::GeminiClient;
//!
//! let client = GeminiClient::from_env()?.with_model("gemini-1.5-flash");
//!
//! let text = client
//!     .generate("You are a terse assistant.", "Say hello.")
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Per-request timeout unless `with_timeout` overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pure Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies, test servers, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeminiError::Config(format!("Failed to build HTTP client: {}", e)))?;
        self.timeout = timeout;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send a raw `generateContent` request.
    pub async fn generate_content(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, timed_out = e.is_timeout(), "Gemini request failed");
                GeminiError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "Gemini API error");
            return Err(api_error(status.as_u16(), &body));
        }

        let raw: types::GenerateResponseRaw = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let text = raw.first_text().ok_or_else(|| GeminiError::Blocked {
            reason: raw.empty_reason(),
        })?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "Gemini generate content"
        );

        Ok(GenerateResponse {
            text,
            usage: raw.usage_metadata,
        })
    }

    /// Deterministic single-turn generation: temperature 0, one system
    /// instruction, one user message.
    pub async fn generate(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<String> {
        let request = GenerateRequest::new(Some(system_prompt.into()), user_prompt).temperature(0.0);
        Ok(self.generate_content(&request).await?.text)
    }
}

/// Structured API error from a non-2xx body, falling back to the raw text.
fn api_error(code: u16, body: &str) -> GeminiError {
    match serde_json::from_str::<types::ErrorEnvelope>(body) {
        Ok(envelope) => GeminiError::Api {
            code,
            status: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => GeminiError::Api {
            code,
            status: String::new(),
            message: body.to_string(),
        },
    }
}
