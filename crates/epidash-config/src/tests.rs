use super::*;
use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_empty_toml_gives_defaults() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config.server.bind, "0.0.0.0:3000");
    assert_eq!(config.database.max_connections, 5);
    assert_eq!(config.llm.backend, LlmBackendKind::OpenAi);
    assert_eq!(config.llm.max_tokens, 1000);
    assert_eq!(config.cache.ttl_secs, 60);
    assert_eq!(config.dashboard.diseases, vec!["malaria", "cholera", "heat stress"]);
    assert!(config.llm.api_key.is_none());
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let config = Config::from_toml(
        r#"
        [llm]
        backend = "ollama"
        model = "llama3:8b"
        base_url = "http://localhost:11434"

        [cache]
        ttl_secs = 5
        "#,
    )
    .unwrap();
    assert_eq!(config.llm.backend, LlmBackendKind::Ollama);
    assert_eq!(config.llm.model, "llama3:8b");
    assert_eq!(config.llm.timeout_secs, 60);
    assert_eq!(config.cache.ttl_secs, 5);
    assert_eq!(config.database.url, "sqlite://epidash.sqlite");
}

#[test]
fn test_yaml_config() {
    let config = Config::from_yaml(
        "dashboard:\n  region: Ibadan\n  diseases: [dengue]\nllm:\n  backend: openai_compatible\n",
    )
    .unwrap();
    assert_eq!(config.dashboard.region, "Ibadan");
    assert_eq!(config.dashboard.diseases, vec!["dengue"]);
    assert_eq!(config.llm.backend, LlmBackendKind::OpenAiCompatible);
}

#[test]
fn test_api_key_from_file_is_secret() {
    let config = Config::from_toml("[llm]\napi_key = \"sk-file\"\n").unwrap();
    assert_eq!(config.llm.api_key.as_ref().unwrap().expose_secret(), "sk-file");
    assert!(!format!("{:?}", config.llm).contains("sk-file"));
}

#[test]
fn test_blank_api_key_is_none() {
    let config = Config::from_toml("[llm]\napi_key = \"\"\n").unwrap();
    assert!(config.llm.api_key.is_none());
}

#[test]
fn test_env_overrides() {
    let mut config = Config::default();
    config.apply_env_with(env(&[
        ("EPIDASH_BIND", "127.0.0.1:8080"),
        ("DATABASE_URL", "sqlite::memory:"),
        ("OPENAI_MODEL", "gpt-4o-mini"),
        ("OPENAI_BASE_URL", ""),
        ("OPENAI_API_KEY", "sk-env"),
    ]));
    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.database.url, "sqlite::memory:");
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    assert_eq!(config.llm.api_key.as_ref().unwrap().expose_secret(), "sk-env");
}

#[test]
fn test_file_api_key_wins_over_env() {
    let mut config = Config::from_toml("[llm]\napi_key = \"sk-file\"\n").unwrap();
    config.apply_env_with(env(&[("OPENAI_API_KEY", "sk-env")]));
    assert_eq!(config.llm.api_key.as_ref().unwrap().expose_secret(), "sk-file");
}

#[test]
fn test_validate_rejects_zero_ttl() {
    let config = Config::from_toml("[cache]\nttl_secs = 0\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("cache.ttl_secs"));
}

#[test]
fn test_load_from_missing_file_is_io_error() {
    let err = Config::load_from("/nonexistent/epidash.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_load_from_yaml_file() {
    let path = std::env::temp_dir().join(format!("epidash-test-{}.yaml", std::process::id()));
    std::fs::write(&path, "server:\n  bind: 127.0.0.1:9999\n").unwrap();
    let config = Config::load_from(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(config.server.bind, "127.0.0.1:9999");
}
