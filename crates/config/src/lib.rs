//! Configuration loading, validation, and management for LogSeek.
//!
//! Loads configuration from `logseek.toml` (optional) with environment
//! variable overrides applied afterwards. Every setting has a default and a
//! missing file or variable never prevents startup — though the default
//! storage and engine credentials are placeholders that will not reach real
//! services, which is a deployment hazard rather than a startup failure.
//!
//! Recognized environment variables:
//! - `PORT` — gateway listening port
//! - `LOGSEEK_HOST` — gateway bind host
//! - `AZURE_STORAGE_CONNECTION_STRING` / `AZURE_STORAGE_CONTAINER_NAME` —
//!   dataset source location
//! - `AZURE_OPENAI_ENDPOINT` / `AZURE_OPENAI_API_KEY` /
//!   `AZURE_OPENAI_DEPLOYMENT` / `AZURE_OPENAI_MODEL` /
//!   `AZURE_OPENAI_API_VERSION` — query engine endpoint and credentials

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The root configuration structure. Maps directly to `logseek.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gateway listening port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Gateway bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// The assistant's presented identity
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Dataset source (blob storage)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Query engine endpoint and credentials
    #[serde(default)]
    pub engine: EngineConfig,

    /// Chat behavior (pacing, transcript retention)
    #[serde(default)]
    pub chat: ChatConfig,

    /// Answer safety filter
    #[serde(default)]
    pub safety: SafetyConfig,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "0.0.0.0".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &str) -> &'static str {
    if s.is_empty() { "<empty>" } else { "[REDACTED]" }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("persona", &self.persona)
            .field("storage", &self.storage)
            .field("engine", &self.engine)
            .field("chat", &self.chat)
            .field("safety", &self.safety)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_persona_name")]
    pub name: String,

    #[serde(default = "default_persona_role")]
    pub role: String,
}

fn default_persona_name() -> String {
    "LogSeek".into()
}
fn default_persona_role() -> String {
    "your personal log assistant bot".into()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            role: default_persona_role(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Azure connection string (AccountName/AccountKey pairs).
    /// The default is a placeholder that parses but reaches nothing.
    #[serde(default = "default_connection_string")]
    pub connection_string: String,

    /// Container holding the dataset fragments
    #[serde(default = "default_container")]
    pub container: String,

    /// Only blobs with this suffix are treated as fragments
    #[serde(default = "default_fragment_suffix")]
    pub fragment_suffix: String,
}

fn default_connection_string() -> String {
    concat!(
        "DefaultEndpointsProtocol=https;",
        "AccountName=logseekdev;",
        "AccountKey=UExBQ0VIT0xERVItS0VZLVBMQUNFSE9MREVSLUtFWQ==;",
        "EndpointSuffix=core.windows.net"
    )
    .into()
}
fn default_container() -> String {
    "log-fragments".into()
}
fn default_fragment_suffix() -> String {
    ".json".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            connection_string: default_connection_string(),
            container: default_container(),
            fragment_suffix: default_fragment_suffix(),
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("connection_string", &redact(&self.connection_string))
            .field("container", &self.container)
            .field("fragment_suffix", &self.fragment_suffix)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Azure OpenAI resource endpoint (scheme + host)
    #[serde(default = "default_engine_endpoint")]
    pub endpoint: String,

    /// API key sent in the `api-key` header
    #[serde(default = "default_engine_api_key")]
    pub api_key: String,

    /// Deployment name in the request path
    #[serde(default = "default_engine_deployment")]
    pub deployment: String,

    /// Model identifier (informational; the deployment decides what runs)
    #[serde(default = "default_engine_deployment")]
    pub model: String,

    /// `api-version` query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Maximum tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Hard deadline for a single engine call
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,

    /// Rows of the table included in the prompt context
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_engine_endpoint() -> String {
    "https://logseekdev.openai.azure.com".into()
}
fn default_engine_api_key() -> String {
    "placeholder-api-key".into()
}
fn default_engine_deployment() -> String {
    "gpt-35-turbo".into()
}
fn default_api_version() -> String {
    "2023-07-01-preview".into()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_engine_timeout() -> u64 {
    30
}
fn default_preview_rows() -> usize {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: default_engine_endpoint(),
            api_key: default_engine_api_key(),
            deployment: default_engine_deployment(),
            model: default_engine_deployment(),
            api_version: default_api_version(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_engine_timeout(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("deployment", &self.deployment)
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("preview_rows", &self.preview_rows)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Delay between successive reveal items, in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Transcript retention per session (0 = unbounded)
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Maximum accepted message length in bytes
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

fn default_pacing_ms() -> u64 {
    100
}
fn default_max_turns() -> usize {
    64
}
fn default_max_message_len() -> usize {
    2000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            max_turns: default_max_turns(),
            max_message_len: default_max_message_len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Terms that trigger the filter (case-insensitive substrings)
    #[serde(default)]
    pub deny_terms: Vec<String>,

    /// Replacement token when redacting
    #[serde(default = "default_mask")]
    pub mask: String,

    /// Reject the whole answer instead of redacting
    #[serde(default)]
    pub reject_on_hit: bool,
}

fn default_true() -> bool {
    true
}
fn default_mask() -> String {
    "[filtered]".into()
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            deny_terms: vec![],
            mask: default_mask(),
            reject_on_hit: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path with environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("logseek.toml"))?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Apply environment overrides through an injectable lookup, so override
    /// precedence is testable without touching process environment.
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
            self.port = port;
        }
        if let Some(host) = get("LOGSEEK_HOST") {
            self.host = host;
        }
        if let Some(cs) = get("AZURE_STORAGE_CONNECTION_STRING") {
            self.storage.connection_string = cs;
        }
        if let Some(container) = get("AZURE_STORAGE_CONTAINER_NAME") {
            self.storage.container = container;
        }
        if let Some(endpoint) = get("AZURE_OPENAI_ENDPOINT") {
            self.engine.endpoint = endpoint;
        }
        if let Some(key) = get("AZURE_OPENAI_API_KEY") {
            self.engine.api_key = key;
        }
        if let Some(deployment) = get("AZURE_OPENAI_DEPLOYMENT") {
            self.engine.deployment = deployment;
        }
        if let Some(model) = get("AZURE_OPENAI_MODEL") {
            self.engine.model = model;
        }
        if let Some(version) = get("AZURE_OPENAI_API_VERSION") {
            self.engine.api_version = version;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.engine.temperature) {
            return Err(ConfigError::ValidationError(
                "engine.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.engine.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "engine.timeout_secs must be nonzero".into(),
            ));
        }
        if self.chat.pacing_ms > 10_000 {
            return Err(ConfigError::ValidationError(
                "chat.pacing_ms above 10s makes the reveal unusable".into(),
            ));
        }
        Ok(())
    }

    /// Build the domain persona from this config.
    pub fn persona(&self) -> logseek_core::Persona {
        logseek_core::Persona::new(self.persona.name.clone(), self.persona.role.clone())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            persona: PersonaConfig::default(),
            storage: StorageConfig::default(),
            engine: EngineConfig::default(),
            chat: ChatConfig::default(),
            safety: SafetyConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
