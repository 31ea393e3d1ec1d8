use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Valid values for `summary.provider`.
pub const PROVIDER_NAMES: &[&str] = &["auto", "openai", "ollama", "custom", "basic"];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub custom: Option<CustomEndpointConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.md".to_string(),
        "**/*.txt".to_string(),
        "**/*.pdf".to_string(),
        "**/*.epub".to_string(),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummaryConfig {
    /// One of [`PROVIDER_NAMES`]. `auto` walks the fallback chain.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_bullet_count")]
    pub bullet_count: usize,
    /// Per-request bound for provider HTTP calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Keep `<think>` blocks in model output instead of stripping them.
    #[serde(default)]
    pub preserve_thinking: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            bullet_count: default_bullet_count(),
            timeout_secs: default_timeout_secs(),
            preserve_thinking: false,
        }
    }
}

fn default_provider() -> String {
    "auto".to_string()
}
fn default_bullet_count() -> usize {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    /// Resolved once at startup; absence means the provider reports
    /// a missing credential instead of attempting a request.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
        }
    }
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CustomEndpointConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Config {
    /// Resolve credentials from the process environment when the config file
    /// left them unset. Called once at startup; providers only ever see the
    /// injected values.
    pub fn resolve_credentials(&mut self) {
        if self.openai.api_key.is_none() {
            self.openai.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if let Some(custom) = &mut self.custom {
            if custom.api_key.is_none() {
                custom.api_key = std::env::var("CUSTOM_API_KEY").ok();
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.summary.bullet_count == 0 {
        anyhow::bail!("summary.bullet_count must be >= 1");
    }

    if config.summary.timeout_secs == 0 {
        anyhow::bail!("summary.timeout_secs must be >= 1");
    }

    if !PROVIDER_NAMES.contains(&config.summary.provider.as_str()) {
        anyhow::bail!(
            "Unknown summary provider: '{}'. Must be one of: {}.",
            config.summary.provider,
            PROVIDER_NAMES.join(", ")
        );
    }

    if config.summary.provider == "custom" && config.custom.is_none() {
        anyhow::bail!("summary.provider = 'custom' requires a [custom] section with a url");
    }

    if config.discovery.include_globs.is_empty() {
        anyhow::bail!("discovery.include_globs must not be empty");
    }

    Ok(())
}
