// src/config/mod.rs
// All tunables come from the environment (.env supported); defaults suit local dev.

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct FolioConfig {
    // ── Completion provider (DeepSeek, OpenAI-compatible)
    pub deepseek_api_key: String,
    pub deepseek_base_url: String,
    pub chat_model: String,

    // ── Embedding provider (OpenAI-compatible /embeddings)
    pub embedding_api_key: String,
    pub embedding_base_url: String,
    pub embedding_model: String,
    pub embedding_dim: usize,

    // ── Vector index
    pub qdrant_url: String,
    pub qdrant_collection: String,

    // ── Database
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Orchestration
    pub step_budget: usize,
    pub retrieval_limit: usize,
    pub retrieval_threshold: f32,

    // ── History API
    pub history_default_limit: usize,
    pub history_max_limit: usize,

    // ── Server
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub cors_origin: String,

    // ── Logging
    pub log_level: String,
}

/// Parse an env var, falling back to a default on absence or parse failure.
/// Values may carry inline comments and stray whitespace; both are stripped.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl FolioConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            deepseek_api_key: env_var_or("DEEPSEEK_API_KEY", String::new()),
            deepseek_base_url: env_var_or(
                "DEEPSEEK_BASE_URL",
                "https://api.deepseek.com/v1".to_string(),
            ),
            chat_model: env_var_or("FOLIO_CHAT_MODEL", "deepseek-chat".to_string()),
            embedding_api_key: env_var_or("EMBEDDING_API_KEY", String::new()),
            embedding_base_url: env_var_or(
                "EMBEDDING_BASE_URL",
                "https://open.bigmodel.cn/api/paas/v4".to_string(),
            ),
            embedding_model: env_var_or("EMBEDDING_MODEL", "embedding-3".to_string()),
            embedding_dim: env_var_or("EMBEDDING_DIM", 2048),
            qdrant_url: env_var_or("QDRANT_URL", "http://localhost:6333".to_string()),
            qdrant_collection: env_var_or("QDRANT_COLLECTION", "resume-docs".to_string()),
            database_url: env_var_or("DATABASE_URL", "sqlite:./folio.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),
            step_budget: env_var_or("FOLIO_STEP_BUDGET", 5),
            retrieval_limit: env_var_or("FOLIO_RETRIEVAL_LIMIT", 5),
            retrieval_threshold: env_var_or("FOLIO_RETRIEVAL_THRESHOLD", 0.0),
            history_default_limit: env_var_or("FOLIO_HISTORY_DEFAULT_LIMIT", 5),
            history_max_limit: env_var_or("FOLIO_HISTORY_MAX_LIMIT", 100),
            host: env_var_or("FOLIO_HOST", "0.0.0.0".to_string()),
            port: env_var_or("FOLIO_PORT", 3001),
            request_timeout_secs: env_var_or("FOLIO_REQUEST_TIMEOUT", 30),
            cors_origin: env_var_or("FOLIO_CORS_ORIGIN", "http://localhost:3000".to_string()),
            log_level: env_var_or("FOLIO_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full URL for a DeepSeek endpoint
    pub fn deepseek_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.deepseek_base_url.trim_end_matches('/'), endpoint)
    }

    /// Full URL for an embedding-provider endpoint
    pub fn embedding_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.embedding_base_url.trim_end_matches('/'), endpoint)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<FolioConfig> = Lazy::new(FolioConfig::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FolioConfig::from_env();
        assert_eq!(config.chat_model, "deepseek-chat");
        assert_eq!(config.step_budget, 5);
        assert_eq!(config.retrieval_limit, 5);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_url_helpers() {
        let config = FolioConfig::from_env();
        assert!(config
            .deepseek_url("chat/completions")
            .ends_with("/chat/completions"));
        assert!(config.embedding_url("embeddings").ends_with("/embeddings"));
        assert!(config.bind_address().contains(':'));
    }
}
