//! reasonbench-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for OpenAI-compatible chat-completion
//! endpoints and a deterministic mock used in test mode.

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, ProviderConfig, ReasonbenchConfig, ScorerConfig};
pub use error::ProviderError;
