//! Core trait definitions for LLM providers and reasoning scorers.
//!
//! These async traits are implemented by the `reasonbench-providers` and
//! `reasonbench-runner` crates respectively.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::AttachmentError;
use crate::score_report::ScoreReport;

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that answer rendered prompts.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Generate a response for a prompt.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List available models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to generate a response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gpt-4.1").
    pub model: String,
    /// The rendered prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Image sent alongside the prompt.
    #[serde(default)]
    pub image: Option<ImageAttachment>,
    /// Maximum tokens to generate; provider default when unset.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response content.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Whether the model accepts image input.
    pub vision: bool,
}

/// An image inlined into a request as base64.
#[derive(Clone, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Base64 (standard alphabet) encoded file contents.
    pub data: String,
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl ImageAttachment {
    /// Encode raw image bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Read and encode an image file, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let bytes = std::fs::read(path).map_err(|source| AttachmentError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_bytes(&bytes, mime_type_for(path)))
    }

    /// `data:` URL form accepted by chat-completion APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

// ---------------------------------------------------------------------------
// Reasoning scorer trait
// ---------------------------------------------------------------------------

/// Trait for reasoning-quality evaluators that score a solution step by step.
#[async_trait]
pub trait ReasoningScorer: Send + Sync {
    /// Human-readable scorer name.
    fn name(&self) -> &str;

    /// Score the steps of a solution to `question`.
    async fn score(&self, request: &ScoreRequest) -> anyhow::Result<ScoreReport>;
}

/// Request to score one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// The problem statement.
    pub question: String,
    /// Solution steps, one per non-empty response line.
    pub steps: Vec<String>,
}

impl ScoreRequest {
    pub fn from_response(question: &str, response: &str) -> Self {
        Self {
            question: question.to_string(),
            steps: split_steps(response),
        }
    }
}

/// Split a response into steps: trimmed lines, blank lines dropped.
pub fn split_steps(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default system prompt for generation providers.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful linear algebra assistant.";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_steps_drops_blank_lines() {
        let response = "1. Write the matrix.\n\n   2. Reduce row 2.  \n\t\n3. Done.\n";
        assert_eq!(
            split_steps(response),
            vec!["1. Write the matrix.", "2. Reduce row 2.", "3. Done."]
        );
        assert!(split_steps("\n \n").is_empty());
    }

    #[test]
    fn image_attachment_encodes_base64() {
        let image = ImageAttachment::from_bytes(b"hello", "image/png");
        assert_eq!(image.data, "aGVsbG8=");
        assert_eq!(image.data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn image_attachment_from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let jpg = dir.path().join("matrix.JPG");
        std::fs::write(&jpg, [1u8, 2, 3]).unwrap();
        let image = ImageAttachment::from_path(&jpg).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "AQID");

        let other = dir.path().join("matrix.bin");
        std::fs::write(&other, [0u8]).unwrap();
        assert_eq!(ImageAttachment::from_path(&other).unwrap().mime_type, "image/png");
    }

    #[test]
    fn image_attachment_missing_file() {
        let err = ImageAttachment::from_path(Path::new("no/such/image.png")).unwrap_err();
        assert!(err.to_string().contains("no/such/image.png"));
    }

    #[test]
    fn image_debug_hides_payload() {
        let image = ImageAttachment::from_bytes(&[0u8; 64], "image/png");
        let debug = format!("{image:?}");
        assert!(!debug.contains(&image.data));
        assert!(debug.contains("data_len"));
    }
}
