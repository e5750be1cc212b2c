//! Gateway configuration, read once at process start.
//!
//! Precedence: env `DOCUCHAT_*` > TOML file (`DOCUCHAT_CONFIG` path, default `config/docuchat`)
//! > defaults.
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | host | DOCUCHAT_HOST | 127.0.0.1 |
//! | port | DOCUCHAT_PORT | 8000 |
//! | api_base_url | DOCUCHAT_API_BASE_URL | https://api.smartdocumentassistant.com |
//! | api_mocking | DOCUCHAT_API_MOCKING | false |
//! | mock_latency_ms | DOCUCHAT_MOCK_LATENCY_MS | 1500 |
//! | allowed_origins | DOCUCHAT_ALLOWED_ORIGINS (comma separated) | http://localhost:3000 |
//! | environment | DOCUCHAT_ENVIRONMENT | development |
//! | max_upload_bytes | DOCUCHAT_MAX_UPLOAD_BYTES | 26214400 |
//! | chat_cache_ttl_secs | DOCUCHAT_CHAT_CACHE_TTL_SECS | 60 |
//! | chat_cache_capacity | DOCUCHAT_CHAT_CACHE_CAPACITY | 1024 |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "DOCUCHAT";
const ENV_CONFIG_PATH: &str = "DOCUCHAT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/docuchat";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Document QA API base URL, scheme included.
    pub api_base_url: String,
    /// Serve canned data instead of calling the API.
    pub api_mocking: bool,
    /// Simulated ask latency in mock mode.
    pub mock_latency_ms: u64,
    /// CORS allow-list for browser origins.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// "production" turns on `Secure` session cookies.
    pub environment: String,
    pub max_upload_bytes: usize,
    /// How long a cached chat view stays fresh.
    pub chat_cache_ttl_secs: u64,
    /// Most sessions the chat view cache holds at once.
    pub chat_cache_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            api_base_url: "https://api.smartdocumentassistant.com".to_string(),
            api_mocking: false,
            mock_latency_ms: 1500,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            environment: "development".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
            chat_cache_ttl_secs: 60,
            chat_cache_capacity: 1024,
        }
    }
}

impl GatewayConfig {
    /// Load from the config file and `DOCUCHAT_*` environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_with(&config_path, environment_source(ENV_PREFIX))
    }

    pub fn load_with(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("api_mocking", defaults.api_mocking)?
            .set_default("mock_latency_ms", defaults.mock_latency_ms)?
            .set_default("allowed_origins", defaults.allowed_origins)?
            .set_default("environment", defaults.environment)?
            .set_default("max_upload_bytes", defaults.max_upload_bytes as u64)?
            .set_default("chat_cache_ttl_secs", defaults.chat_cache_ttl_secs)?
            .set_default("chat_cache_capacity", defaults.chat_cache_capacity as u64)?;

        let path = Path::new(config_path);
        let with_toml = path.with_extension("toml");
        let builder = if path.is_file() {
            builder.add_source(config::File::from(path))
        } else if with_toml.is_file() {
            builder.add_source(config::File::from(with_toml))
        } else {
            builder
        };

        builder.add_source(env).build()?.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn chat_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.chat_cache_ttl_secs)
    }
}

/// `DOCUCHAT_API_BASE_URL` style variables; `allowed_origins` splits on commas.
pub fn environment_source(prefix: &str) -> config::Environment {
    config::Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_origins")
}
