use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;

use crate::auth::MIN_BCRYPT_COST;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Elasticsearch,
    Memory,
}

/// What an update does when the target document does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMissingPolicy {
    /// Answer 404
    Reject,
    /// Create the document from the supplied fields
    Upsert,
}

impl UpdateMissingPolicy {
    pub fn upsert(self) -> bool {
        matches!(self, UpdateMissingPolicy::Upsert)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    /// Wait for the index refresh on writes so reads see them immediately
    pub refresh: bool,
    /// Documents fetched per round trip when listing a whole collection
    pub page_size: usize,
    pub timeout_secs: u64,
    pub update_missing: UpdateMissingPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub engine_id: Option<String>,
    /// Custom Search returns at most 10 results per request
    pub max_results: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter directive; RUST_LOG takes precedence
    pub filter: String,
}

impl AppConfig {
    /// Preset for APP_ENV, replaced by the YAML file named in
    /// ECHOFEED_CONFIG when set, then overridden per key from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match env::var("ECHOFEED_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(&path)?,
            _ => Self::preset(Self::environment_from_env()),
        };
        Ok(base.with_env_overrides())
    }

    /// Preset plus environment overrides, without a config file
    pub fn from_env() -> Self {
        Self::preset(Self::environment_from_env()).with_env_overrides()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    fn environment_from_env() -> Environment {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }

    pub fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("ECHOFEED_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("ECHOFEED_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Store overrides
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.store.backend = match v.as_str() {
                "memory" => StoreBackend::Memory,
                "elasticsearch" => StoreBackend::Elasticsearch,
                _ => self.store.backend,
            };
        }
        if let Ok(v) = env::var("ELASTICSEARCH_URL") {
            self.store.url = v;
        }
        if let Ok(v) = env::var("STORE_REFRESH") {
            self.store.refresh = v.parse().unwrap_or(self.store.refresh);
        }
        if let Ok(v) = env::var("STORE_PAGE_SIZE") {
            self.store.page_size = v.parse().unwrap_or(self.store.page_size);
        }
        if let Ok(v) = env::var("STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = v.parse().unwrap_or(self.store.timeout_secs);
        }
        if let Ok(v) = env::var("STORE_UPDATE_MISSING") {
            self.store.update_missing = match v.as_str() {
                "upsert" => UpdateMissingPolicy::Upsert,
                "reject" => UpdateMissingPolicy::Reject,
                _ => self.store.update_missing,
            };
        }

        // LLM overrides
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            self.llm.api_key = Some(v).filter(|key| !key.is_empty());
        }
        if let Ok(v) = env::var("OPENAI_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = env::var("OPENAI_TEMPERATURE") {
            self.llm.temperature = v.parse().unwrap_or(self.llm.temperature);
        }
        if let Ok(v) = env::var("OPENAI_TIMEOUT_SECS") {
            self.llm.timeout_secs = v.parse().unwrap_or(self.llm.timeout_secs);
        }

        // Search overrides
        if let Ok(v) = env::var("GOOGLE_SEARCH_URL") {
            self.search.url = v;
        }
        if let Ok(v) = env::var("GOOGLE_API_KEY") {
            self.search.api_key = Some(v).filter(|key| !key.is_empty());
        }
        if let Ok(v) = env::var("GOOGLE_ENGINE_ID") {
            self.search.engine_id = Some(v).filter(|id| !id.is_empty());
        }
        if let Ok(v) = env::var("SEARCH_MAX_RESULTS") {
            self.search.max_results = v.parse().unwrap_or(self.search.max_results);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(v) = env::var("LOG_FILTER") {
            self.logging.filter = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            store: StoreConfig {
                backend: StoreBackend::Elasticsearch,
                url: "http://127.0.0.1:9200".to_string(),
                refresh: true,
                page_size: 1000,
                timeout_secs: 30,
                update_missing: UpdateMissingPolicy::Reject,
            },
            llm: Self::default_llm(),
            search: Self::default_search(),
            security: SecurityConfig {
                bcrypt_cost: 10,
                enable_cors: true,
                cors_origins: vec!["http://localhost:8081".to_string(), "http://127.0.0.1:8081".to_string()],
            },
            logging: LoggingConfig {
                filter: "echofeed=debug,tower_http=debug".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            store: StoreConfig {
                backend: StoreBackend::Elasticsearch,
                url: "http://elasticsearch:9200".to_string(),
                refresh: true,
                page_size: 500,
                timeout_secs: 10,
                update_missing: UpdateMissingPolicy::Reject,
            },
            llm: Self::default_llm(),
            search: Self::default_search(),
            security: SecurityConfig {
                bcrypt_cost: 12,
                enable_cors: true,
                cors_origins: vec!["https://staging.echofeed.example".to_string()],
            },
            logging: LoggingConfig {
                filter: "echofeed=info,tower_http=info".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            store: StoreConfig {
                backend: StoreBackend::Elasticsearch,
                url: "http://elasticsearch:9200".to_string(),
                refresh: false,
                page_size: 200,
                timeout_secs: 5,
                update_missing: UpdateMissingPolicy::Reject,
            },
            llm: Self::default_llm(),
            search: Self::default_search(),
            security: SecurityConfig {
                bcrypt_cost: 12,
                enable_cors: true,
                cors_origins: vec!["https://echofeed.example".to_string()],
            },
            logging: LoggingConfig {
                filter: "echofeed=info,tower_http=warn".to_string(),
            },
        }
    }

    fn default_llm() -> LlmConfig {
        LlmConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.5,
            max_tokens: 150,
            timeout_secs: 60,
        }
    }

    fn default_search() -> SearchConfig {
        SearchConfig {
            url: "https://www.googleapis.com/customsearch/v1".to_string(),
            api_key: None,
            engine_id: None,
            max_results: 10,
            timeout_secs: 30,
        }
    }

    /// Config for tests: in-memory store, cheapest bcrypt cost
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.store.backend = StoreBackend::Memory;
        config.security.bcrypt_cost = MIN_BCRYPT_COST;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 8080);
        assert!(config.store.refresh);
        assert_eq!(config.store.update_missing, UpdateMissingPolicy::Reject);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_config_for_tests() {
        let config = AppConfig::for_tests();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.security.bcrypt_cost, MIN_BCRYPT_COST);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.store.refresh);
        assert_eq!(config.store.page_size, 200);
        assert_eq!(config.security.bcrypt_cost, 12);
    }

    #[test]
    fn yaml_round_trip_omits_secrets() {
        let mut config = AppConfig::staging();
        config.llm.api_key = Some("sk-secret".into());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("sk-secret"));

        let parsed = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.environment, Environment::Staging);
        assert_eq!(parsed.store.url, config.store.url);
        assert!(parsed.llm.api_key.is_none());
    }

    #[test]
    fn yaml_accepts_lowercase_enums() {
        let mut config = AppConfig::development();
        config.store.backend = StoreBackend::Memory;
        config.store.update_missing = UpdateMissingPolicy::Upsert;
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("backend: memory"));
        assert!(yaml.contains("update_missing: upsert"));
        assert!(AppConfig::from_yaml(&yaml).unwrap().store.update_missing.upsert());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AppConfig::from_file("/nonexistent/echofeed.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
