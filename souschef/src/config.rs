use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub embeddings: EmbeddingsConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    /// Embedding strategy: "semantic" (fastembed, requires the `semantic`
    /// feature) or "hash" (deterministic, dependency-free).
    pub strategy: String,
    pub dimensions: usize,
}

/// Configuration for the inference endpoint the gateway talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub model: String,
    /// Default base URL; callers may override it per analysis call.
    pub base_url: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embeddings: EmbeddingsConfig {
                strategy: env::var("SOUSCHEF_EMBEDDING_STRATEGY")
                    .unwrap_or_else(|_| "semantic".to_string()),
                dimensions: parse_env_or("SOUSCHEF_EMBEDDING_DIMENSIONS", 384),
            },
            model: ModelConfig {
                model: env::var("SOUSCHEF_MODEL").unwrap_or_else(|_| "llama3".to_string()),
                base_url: env::var("SOUSCHEF_MODEL_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
                timeout_secs: parse_env_or("SOUSCHEF_MODEL_TIMEOUT", 30),
                temperature: parse_env_or("SOUSCHEF_MODEL_TEMPERATURE", 0.7),
                top_p: parse_env_or("SOUSCHEF_MODEL_TOP_P", 0.9),
                max_tokens: parse_env_or("SOUSCHEF_MODEL_MAX_TOKENS", 1024),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("SOUSCHEF_EMBEDDING_STRATEGY");
        std::env::remove_var("SOUSCHEF_EMBEDDING_DIMENSIONS");
        std::env::remove_var("SOUSCHEF_MODEL");
        std::env::remove_var("SOUSCHEF_MODEL_BASE_URL");
        std::env::remove_var("SOUSCHEF_MODEL_TIMEOUT");

        let config = Config::from_env();
        assert_eq!(config.embeddings.strategy, "semantic");
        assert_eq!(config.embeddings.dimensions, 384);
        assert_eq!(config.model.model, "llama3");
        assert_eq!(config.model.base_url, "http://localhost:11434");
        assert_eq!(config.model.timeout_secs, 30);
    }

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("SOUSCHEF_EMBEDDING_STRATEGY", "hash");
        std::env::set_var("SOUSCHEF_EMBEDDING_DIMENSIONS", "128");
        std::env::set_var("SOUSCHEF_MODEL_TIMEOUT", "10");

        let config = Config::from_env();
        assert_eq!(config.embeddings.strategy, "hash");
        assert_eq!(config.embeddings.dimensions, 128);
        assert_eq!(config.model.timeout_secs, 10);

        std::env::remove_var("SOUSCHEF_EMBEDDING_STRATEGY");
        std::env::remove_var("SOUSCHEF_EMBEDDING_DIMENSIONS");
        std::env::remove_var("SOUSCHEF_MODEL_TIMEOUT");
    }

    #[test]
    fn test_invalid_env_value_falls_back_to_default() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("SOUSCHEF_MODEL_TIMEOUT", "not-a-number");
        let config = Config::from_env();
        assert_eq!(config.model.timeout_secs, 30);
        std::env::remove_var("SOUSCHEF_MODEL_TIMEOUT");
    }
}
