//! Session configuration
//!
//! Values come from an optional TOML file, then `DIALOGUE__SECTION__KEY`
//! environment variables. Every field has a default, so an empty file (or
//! no file at all) yields a session pointed at a local HTTP generator.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::context::TokenBudget;
use crate::error::{DialogueError, Result};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "DIALOGUE";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Conversation context settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Token ceiling for the running context
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,

    /// Assistant message shown when the session opens (empty disables it)
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

fn default_max_context_tokens() -> usize {
    1024
}

fn default_greeting() -> String {
    "Hello! How can I help you today?".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: default_max_context_tokens(),
            greeting: default_greeting(),
        }
    }
}

/// Decoding parameters sent with every generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum total length (input + continuation) of the generated sequence
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,
}

fn default_max_length() -> usize {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

fn default_repetition_penalty() -> f32 {
    1.2
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            temperature: default_temperature(),
            repetition_penalty: default_repetition_penalty(),
        }
    }
}

/// Tokenizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// BPE encoding name (cl100k_base, p50k_base, r50k_base)
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Explicit pad token; aliased to the end-of-turn token when unset
    #[serde(default)]
    pub pad_token: Option<String>,
}

fn default_encoding() -> String {
    "cl100k_base".to_string()
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            pad_token: None,
        }
    }
}

/// Which generation backend a session talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorBackend {
    Http,
    Echo,
}

impl std::str::FromStr for GeneratorBackend {
    type Err = DialogueError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(GeneratorBackend::Http),
            "echo" => Ok(GeneratorBackend::Echo),
            other => Err(DialogueError::Configuration(format!(
                "unknown generator backend '{}'",
                other
            ))),
        }
    }
}

/// Generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_backend")]
    pub backend: GeneratorBackend,

    /// Generation endpoint for the HTTP backend
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier forwarded to the endpoint
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token (read from GENERATOR_API_KEY if not set)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend() -> GeneratorBackend {
    GeneratorBackend::Http
}

fn default_endpoint() -> String {
    "http://localhost:8080/generate".to_string()
}

fn default_model() -> String {
    "microsoft/DialoGPT-medium".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; RUST_LOG takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load from an optional TOML file plus `DIALOGUE__*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        let config: Config = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        let config = config.with_env_secrets();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without touching the environment
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Config = ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_secrets(mut self) -> Self {
        if self.generator.api_key.is_none() {
            if let Ok(val) = std::env::var("GENERATOR_API_KEY") {
                self.generator.api_key = Some(val);
            }
        }
        self
    }

    /// Validate that the configuration can drive a session
    pub fn validate(&self) -> Result<()> {
        TokenBudget::new(self.session.max_context_tokens)?;

        if self.generation.max_length == 0 {
            return Err(DialogueError::Configuration(
                "generation.max_length must be positive".to_string(),
            ));
        }

        if self.generation.temperature <= 0.0 {
            return Err(DialogueError::Configuration(format!(
                "generation.temperature must be positive, got {}",
                self.generation.temperature
            )));
        }

        if self.generation.repetition_penalty <= 0.0 {
            return Err(DialogueError::Configuration(format!(
                "generation.repetition_penalty must be positive, got {}",
                self.generation.repetition_penalty
            )));
        }

        Ok(())
    }

    /// Context budget derived from the session section
    pub fn budget(&self) -> Result<TokenBudget> {
        Ok(TokenBudget::new(self.session.max_context_tokens)?)
    }
}
