//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use epidash_config::{Config, LlmBackendKind, LlmConfig};
use epidash_db::{Database, ReferenceRepository, ResponseRepository};
use epidash_llm::{
    Assistant, DashboardContext, LlmBackend, OllamaBackend, OpenAiBackend, OpenAiCompatibleBackend,
};

use secrecy::{ExposeSecret, SecretString};

use crate::cache::{Clock, ReferenceCache, SystemClock};

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub db: Arc<Database>,
    pub references: ReferenceRepository,
    pub responses: ResponseRepository,
    pub assistant: Assistant,
    pub cache: ReferenceCache,
}

impl AppState {
    pub fn new(db: Arc<Database>, assistant: Assistant, cache: ReferenceCache) -> Self {
        Self {
            references: ReferenceRepository::new(db.clone()),
            responses: ResponseRepository::new(db.clone()),
            db,
            assistant,
            cache,
        }
    }

    /// Wire everything from configuration with the system clock.
    pub fn from_config(config: &Config, db: Arc<Database>) -> anyhow::Result<Self> {
        let backend = build_backend(&config.llm)?;
        let context = DashboardContext {
            region: config.dashboard.region.clone(),
            diseases: config.dashboard.diseases.clone(),
        };
        let assistant = Assistant::new(backend, context).with_max_tokens(config.llm.max_tokens);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = ReferenceCache::new(Duration::from_secs(config.cache.ttl_secs), clock);
        tracing::info!(
            model = assistant.model_id(),
            cache_ttl_secs = cache.ttl().as_secs(),
            "application state ready"
        );
        Ok(Self::new(db, assistant, cache))
    }
}

pub type SharedState = Arc<AppState>;

/// Pick the language-model backend named in the config.
pub fn build_backend(cfg: &LlmConfig) -> anyhow::Result<Arc<dyn LlmBackend>> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let backend: Arc<dyn LlmBackend> = match cfg.backend {
        LlmBackendKind::OpenAi => {
            let Some(key) = cfg.api_key.as_ref().map(copy_secret) else {
                bail!("OpenAI backend selected but no API key is configured (set OPENAI_API_KEY)");
            };
            Arc::new(
                OpenAiBackend::new(key, &cfg.model)
                    .with_base_url(&cfg.base_url)
                    .with_timeout(timeout),
            )
        }
        LlmBackendKind::OpenAiCompatible => Arc::new(
            OpenAiCompatibleBackend::new(&cfg.base_url, &cfg.model, cfg.api_key.as_ref().map(copy_secret))
                .with_timeout(timeout),
        ),
        LlmBackendKind::Ollama => Arc::new(OllamaBackend::new(&cfg.base_url, &cfg.model)),
    };
    tracing::info!(model = backend.model_id(), local = backend.is_local(), "LLM backend ready");
    Ok(backend)
}

fn copy_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_without_key_is_rejected() {
        let cfg = LlmConfig::default();
        let err = build_backend(&cfg).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let cfg = LlmConfig {
            backend: LlmBackendKind::Ollama,
            model: "llama3:8b".into(),
            base_url: "http://localhost:11434".into(),
            ..Default::default()
        };
        let backend = build_backend(&cfg).unwrap();
        assert!(backend.is_local());
        assert_eq!(backend.model_id(), "llama3:8b");
    }

    #[test]
    fn test_openai_with_key() {
        let cfg = LlmConfig {
            api_key: Some(SecretString::from("sk-test".to_string())),
            ..Default::default()
        };
        let backend = build_backend(&cfg).unwrap();
        assert_eq!(backend.model_id(), "gpt-4o");
        assert!(!backend.is_local());
    }
}
