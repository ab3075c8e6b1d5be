//! Configuration loading for epidash.
//! Reads epidash.toml from the current directory or the path in the
//! EPIDASH_CONFIG env var. `.yaml`/`.yml` paths are parsed as YAML.
//! Selected fields can be overridden from the environment (see
//! [`Config::apply_env`]).

use std::path::{Path, PathBuf};

use epidash_common::EpidashError;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Invalid TOML in {path}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },
    #[error("Invalid YAML in {path}: {source}")]
    Yaml { path: PathBuf, source: serde_yaml::Error },
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<ConfigError> for EpidashError {
    fn from(err: ConfigError) -> Self {
        EpidashError::InvalidInput(err.to_string())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "0.0.0.0:3000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String { "sqlite://epidash.sqlite".to_string() }
fn default_max_connections() -> u32 { 5 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: default_database_url(), max_connections: default_max_connections() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LlmBackendKind {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
    #[serde(rename = "ollama")]
    Ollama,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub backend: LlmBackendKind,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Never written back out.
    #[serde(default, deserialize_with = "deserialize_secret", skip_serializing)]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_model()    -> String { "gpt-4o".to_string() }
fn default_llm_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_max_tokens()   -> u32 { 1000 }
fn default_timeout_secs() -> u64 { 60 }

fn deserialize_secret<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .filter(|s| !s.trim().is_empty())
        .map(SecretString::from))
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackendKind::default(),
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            api_key: None,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of cached reference data (diseases, questions, summary).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 { 60 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: default_ttl_secs() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_diseases")]
    pub diseases: Vec<String>,
}

fn default_region() -> String { "Bariga, Lagos".to_string() }
fn default_diseases() -> Vec<String> {
    vec!["malaria".to_string(), "cholera".to_string(), "heat stress".to_string()]
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { region: default_region(), diseases: default_diseases() }
    }
}

impl Config {
    /// Load from `EPIDASH_CONFIG` or `./epidash.toml`, then apply env
    /// overrides. A missing file is not an error; defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();

        let path = std::env::var("EPIDASH_CONFIG")
            .unwrap_or_else(|_| "epidash.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            info!("Loading config from {}", path);
            Self::load_from(&path)?
        } else {
            warn!("Config file not found: {}, using defaults", path);
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file; the format follows the extension.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&content)
                .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source }),
            _ => Self::from_toml(&content)
                .map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source }),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("EPIDASH_BIND") {
            self.server.bind = bind;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.llm.model = model;
        }
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = get("OPENAI_API_KEY").map(SecretString::from);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "cache.ttl_secs", reason: "must be positive".into() });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                field: "database.max_connections",
                reason: "must be positive".into(),
            });
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Invalid { field: "llm.max_tokens", reason: "must be positive".into() });
        }
        if self.llm.backend == LlmBackendKind::OpenAi && self.llm.api_key.is_none() {
            warn!("No OpenAI API key configured for the openai backend");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
