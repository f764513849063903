use config::{Config as ConfigLoader, ConfigError, Environment, File};
use ponder_types::{ContextPolicy, SessionConfig, DEFAULT_MODEL};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a whole request, streaming turns included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// JSON document holding all threads and messages; in-memory when unset
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub context: ContextPolicy,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_channel_capacity() -> usize {
    256
}

impl From<&LlmConfig> for SessionConfig {
    fn from(config: &LlmConfig) -> Self {
        let session = SessionConfig::new(config.model.clone())
            .with_context(config.context)
            .with_channel_capacity(config.channel_capacity);

        match &config.system_prompt {
            Some(prompt) if !prompt.trim().is_empty() => session.with_system_prompt(prompt.clone()),
            _ => session,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. built-in defaults
    /// 2. config/default.toml
    /// 3. config/{ENV}.toml (if ENV is set, `dev` otherwise)
    /// 4. `PONDER_`-prefixed environment variables, `__` between levels
    ///    (e.g. `PONDER_SERVER__PORT`, `PONDER_LLM__BASE_URL`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = Self::with_defaults(ConfigLoader::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("PONDER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.origins"),
            );

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = Self::with_defaults(ConfigLoader::builder())?
            .add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("cors.enabled", true)?
            .set_default("cors.origins", vec!["*"])?
            .set_default("llm.base_url", ponder_llm::ollama::OLLAMA_API_BASE)?
            .set_default("llm.model", DEFAULT_MODEL)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")
    }
}
