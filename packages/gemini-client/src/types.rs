//! Gemini `generateContent` request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Request
// =============================================================================

/// `generateContent` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Standing instruction for the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Conversation turns
    pub contents: Vec<Content>,

    /// Sampling settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    /// A single user turn with an optional system instruction.
    pub fn new(system: Option<String>, user: impl Into<String>) -> Self {
        Self {
            system_instruction: system.map(|s| Content::text(None, s)),
            contents: vec![Content::user(user)],
            generation_config: None,
        }
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation_config
            .get_or_insert_with(GenerationConfig::default)
            .temperature = Some(temperature);
        self
    }

    /// Set max output tokens.
    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.generation_config
            .get_or_insert_with(GenerationConfig::default)
            .max_output_tokens = Some(max);
        self
    }
}

/// One turn (or the system instruction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// "user" or "model"; absent for system instructions
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text.into()) }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Some("user"), text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

// =============================================================================
// Response
// =============================================================================

/// Raw `generateContent` response (for internal parsing).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponseRaw {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

impl GenerateResponseRaw {
    /// Why no text came back: the prompt block reason, else the first
    /// candidate's finish reason.
    pub(crate) fn empty_reason(&self) -> String {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| self.candidates.first().and_then(|c| c.finish_reason.clone()))
            .unwrap_or_else(|| "no candidates".to_string())
    }

    /// Concatenated text of the first candidate.
    pub(crate) fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Error envelope Google APIs return on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Generated text plus token usage.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub text: String,
    pub usage: Option<UsageMetadata>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,

    #[serde(default)]
    pub candidates_token_count: u32,

    #[serde(default)]
    pub total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let req = GenerateRequest::new(Some("be terse".into()), "hello").temperature(0.0);
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be terse");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["temperature"], 0.0);
    }

    #[test]
    fn test_request_without_config_omits_it() {
        let json = serde_json::to_value(GenerateRequest::new(None, "hi")).unwrap();
        assert!(json.get("generationConfig").is_none());
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_first_text_joins_parts() {
        let raw: GenerateResponseRaw = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{'bed': "},{"text":"'3'}"}]},"finishReason":"STOP"}],
                "usageMetadata":{"promptTokenCount":10,"candidatesTokenCount":4,"totalTokenCount":14}}"#,
        )
        .unwrap();

        assert_eq!(raw.first_text().as_deref(), Some("{'bed': '3'}"));
        assert_eq!(raw.usage_metadata.unwrap().total_token_count, 14);
    }

    #[test]
    fn test_first_text_missing() {
        let raw: GenerateResponseRaw =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(raw.first_text(), None);
        assert_eq!(raw.empty_reason(), "SAFETY");
    }

    #[test]
    fn test_blocked_prompt_reason() {
        let raw: GenerateResponseRaw =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"OTHER"}}"#).unwrap();
        assert_eq!(raw.empty_reason(), "OTHER");
    }

    #[test]
    fn test_error_envelope() {
        let env: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#,
        )
        .unwrap();
        assert_eq!(env.error.status, "INVALID_ARGUMENT");
        assert_eq!(env.error.message, "API key not valid.");
    }
}
