//! Mock provider for test mode.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use reasonbench_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

/// Prefix of every echoed mock response.
pub const MOCK_RESPONSE_PREFIX: &str = "[MOCK RESPONSE] This is a test response for the prompt:";

/// A mock LLM provider that never leaves the process.
///
/// By default it echoes the prompt behind [`MOCK_RESPONSE_PREFIX`], which is
/// what test mode writes into response files.
pub struct MockProvider {
    /// Fixed response; `None` echoes the prompt.
    fixed_response: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a mock that echoes the prompt.
    pub fn new() -> Self {
        Self {
            fixed_response: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            fixed_response: Some(response.to_string()),
            ..Self::new()
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// The deterministic placeholder returned for `prompt` in test mode.
pub fn mock_response(prompt: &str) -> String {
    format!("{MOCK_RESPONSE_PREFIX}\n\n{prompt}")
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        tracing::info!("[TEST MODE] skipping real API call");

        let content = self
            .fixed_response
            .clone()
            .unwrap_or_else(|| mock_response(&request.prompt));
        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32; // Rough estimate

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 0,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            vision: true,
        }]
    }
}
