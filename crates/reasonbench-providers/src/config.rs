//! Harness configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use reasonbench_core::model::ModelSize;
use reasonbench_core::traits::{LlmProvider, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

use crate::mock::MockProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Mock {
        #[serde(default)]
        response: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Mock { response } => {
                f.debug_struct("Mock").field("response", response).finish()
            }
        }
    }
}

/// How to invoke the external reasoning evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Executable to run.
    #[serde(default = "default_scorer_program")]
    pub program: String,
    /// Arguments placed before the generated ones.
    #[serde(default)]
    pub args: Vec<String>,
    /// Evaluator checkpoint.
    #[serde(default = "default_scorer_model")]
    pub model_name_or_path: String,
    #[serde(default)]
    pub model_size: ModelSize,
    /// Per-response timeout in seconds.
    #[serde(default = "default_scorer_timeout")]
    pub timeout_secs: u64,
}

fn default_scorer_program() -> String {
    "reasoneval".to_string()
}
fn default_scorer_model() -> String {
    "GAIR/ReasonEval-7B".to_string()
}
fn default_scorer_timeout() -> u64 {
    600
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            program: default_scorer_program(),
            args: Vec::new(),
            model_name_or_path: default_scorer_model(),
            model_size: ModelSize::default(),
            timeout_secs: default_scorer_timeout(),
        }
    }
}

/// Top-level reasonbench configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonbenchConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Completion token cap; provider default when unset.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// System prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// External reasoning evaluator.
    #[serde(default)]
    pub scorer: ScorerConfig,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

impl Default for ReasonbenchConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            system_prompt: None,
            scorer: ScorerConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not rescanned, so a value containing `${..}` is
/// kept literally.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..start],
            value,
            &result[start + end + 1..]
        );
        from = start + value.len();
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Mock { response } => ProviderConfig::Mock {
            response: response.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `reasonbench.toml` in the current directory
/// 2. `~/.config/reasonbench/config.toml`
///
/// `OPENAI_API_KEY` in the environment overrides the `openai` provider key.
pub fn load_config() -> Result<ReasonbenchConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ReasonbenchConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("reasonbench.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ReasonbenchConfig::default(),
    };

    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        apply_openai_key(&mut config, key);
    }

    Ok(config)
}

/// Parse a TOML string and resolve `${VAR}` references.
pub fn parse_config_str(content: &str) -> Result<ReasonbenchConfig> {
    let mut config: ReasonbenchConfig = toml::from_str(content)?;
    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.scorer.program = resolve_env_vars(&config.scorer.program);
    config.scorer.model_name_or_path = resolve_env_vars(&config.scorer.model_name_or_path);
    Ok(config)
}

fn apply_openai_key(config: &mut ReasonbenchConfig, key: String) {
    if key.is_empty() {
        return;
    }
    let entry = config
        .providers
        .entry("openai".into())
        .or_insert(ProviderConfig::OpenAI {
            api_key: String::new(),
            base_url: None,
            org_id: None,
        });
    if let ProviderConfig::OpenAI { api_key, .. } = entry {
        *api_key = key;
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("reasonbench"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            anyhow::ensure!(
                !api_key.trim().is_empty(),
                "provider '{name}' has no API key; set OPENAI_API_KEY or api_key in reasonbench.toml"
            );
            Ok(Box::new(OpenAiProvider::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
            )?))
        }
        ProviderConfig::Mock { response } => Ok(Box::new(match response {
            Some(fixed) => MockProvider::with_fixed_response(fixed),
            None => MockProvider::new(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_REASONBENCH_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_REASONBENCH_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_REASONBENCH_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_vars"), "no_vars");
        std::env::remove_var("_REASONBENCH_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_rescan_values() {
        std::env::set_var("_REASONBENCH_SELF_REF", "${_REASONBENCH_SELF_REF}");
        std::env::set_var("_REASONBENCH_OTHER", "b");
        assert_eq!(
            resolve_env_vars("x${_REASONBENCH_SELF_REF}y${_REASONBENCH_OTHER}"),
            "x${_REASONBENCH_SELF_REF}yb"
        );
        std::env::remove_var("_REASONBENCH_SELF_REF");
        std::env::remove_var("_REASONBENCH_OTHER");

        assert_eq!(resolve_env_vars("${_REASONBENCH_UNSET_VAR}-${"), "-${");
    }

    #[test]
    fn default_config() {
        let config = ReasonbenchConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4.1");
        assert!((config.temperature - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.scorer.model_name_or_path, "GAIR/ReasonEval-7B");
        assert_eq!(config.scorer.model_size, ModelSize::Small);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
default_provider = "openai"
default_model = "gpt-4o"
temperature = 0.0

[providers.openai]
type = "openai"
api_key = "sk-test"

[providers.offline]
type = "mock"
response = "1. step"

[scorer]
program = "python"
args = ["scripts/reasoneval.py"]
model_name_or_path = "GAIR/ReasonEval-34B"
model_size = "34B"
timeout_secs = 30
"#;
        let config = parse_config_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.default_model, "gpt-4o");
        assert!(matches!(
            config.providers.get("offline"),
            Some(ProviderConfig::Mock { response: Some(r) }) if r == "1. step"
        ));
        assert_eq!(config.scorer.program, "python");
        assert_eq!(config.scorer.args, vec!["scripts/reasoneval.py"]);
        assert_eq!(config.scorer.model_size, ModelSize::Large);
        assert_eq!(config.scorer.timeout_secs, 30);
    }

    #[test]
    fn debug_masks_api_key() {
        let config = ProviderConfig::OpenAI {
            api_key: "sk-secret".into(),
            base_url: None,
            org_id: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn env_key_creates_openai_provider() {
        let mut config = ReasonbenchConfig::default();
        apply_openai_key(&mut config, "sk-env".into());
        assert!(matches!(
            config.providers.get("openai"),
            Some(ProviderConfig::OpenAI { api_key, .. }) if api_key == "sk-env"
        ));

        let mut config = ReasonbenchConfig::default();
        apply_openai_key(&mut config, String::new());
        assert!(config.providers.is_empty());
    }

    #[test]
    fn create_provider_requires_key() {
        let config = ProviderConfig::OpenAI {
            api_key: "  ".into(),
            base_url: None,
            org_id: None,
        };
        let err = create_provider("openai", &config).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let mock = create_provider("offline", &ProviderConfig::Mock { response: None }).unwrap();
        assert_eq!(mock.name(), "mock");
    }

    #[test]
    fn load_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "default_provider = \"offline\"\n\n[providers.offline]\ntype = \"mock\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_provider, "offline");
        assert!(config.providers.contains_key("offline"));
        assert_eq!(config.scorer.timeout_secs, 600);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config_from(Some(Path::new("no/such/reasonbench.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
