//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `HKM_CHAT_ENDPOINT`, `HKM_CHAT_LOG_LEVEL` and `HKM_CHAT_BIND`
//! env overrides. A missing file is not an error: every field has a default,
//! so the client runs out of the box against a local endpoint.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    /// Append logs here instead of stderr (already expanded, no `~`).
    /// The terminal UI owns the screen, so this is the only way to see its
    /// logs while it runs.
    pub file: Option<PathBuf>,
}

/// Outbound chat call configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the chat endpoint, e.g. `http://127.0.0.1:8000/chat`.
    pub endpoint: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
}

/// Chat endpoint server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the `/chat` server binds to.
    pub bind: String,
}

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration used by the chat endpoint server.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"openai"`).
    /// Maps to `default` in `[llm]` TOML.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log: LogConfig,
    pub client: ClientConfig,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` env var; `None` for keyless local models.
    /// Never sourced from TOML.
    pub llm_api_key: Option<String>,
}

/// Env-var overrides, passed explicitly so tests never mutate the process env.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub log_level: Option<String>,
    pub bind: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("HKM_CHAT_ENDPOINT").ok(),
            log_level: env::var("HKM_CHAT_LOG_LEVEL").ok(),
            bind: env::var("HKM_CHAT_BIND").ok(),
        }
    }
}

/// Raw TOML shape, the `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    log: RawLog,
    #[serde(default)]
    client: RawClient,
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawLog {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default)]
    file: Option<String>,
}

impl Default for RawLog {
    fn default() -> Self {
        Self { level: default_log_level(), file: None }
    }
}

#[derive(Deserialize)]
struct RawClient {
    #[serde(default = "default_endpoint")]
    endpoint: String,
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl Default for RawClient {
    fn default() -> Self {
        Self { endpoint: default_endpoint(), timeout_seconds: None }
    }
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_endpoint() -> String { "http://127.0.0.1:8000/chat".to_string() }
fn default_bind() -> String { "127.0.0.1:8000".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_openai_temperature() -> f32 { 0.2 }
fn default_openai_timeout_seconds() -> u64 { 60 }

/// Load config from `path` (default `config/default.toml`), then apply env-var
/// overrides. An explicitly given path must exist.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    match path {
        Some(p) => {
            let p = expand_home(p);
            if !p.exists() {
                return Err(AppError::Config(format!("config file not found: {}", p.display())));
            }
            load_from(&p, &Overrides::from_env())
        }
        None => load_from(Path::new(DEFAULT_CONFIG_PATH), &Overrides::from_env()),
    }
}

/// Internal loader with an explicit path and overrides.
pub fn load_from(path: &Path, overrides: &Overrides) -> Result<Config, AppError> {
    let parsed: RawConfig = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
        Err(e) => {
            return Err(AppError::Config(format!("cannot read {}: {e}", path.display())));
        }
    };

    let endpoint = overrides.endpoint.clone().unwrap_or(parsed.client.endpoint);
    validate_endpoint(&endpoint)?;

    if parsed.client.timeout_seconds == Some(0) {
        return Err(AppError::Config(
            "client.timeout_seconds must be positive (omit it to disable the timeout)".into(),
        ));
    }

    Ok(Config {
        log: LogConfig {
            level: overrides.log_level.clone().unwrap_or(parsed.log.level),
            file: parsed.log.file.as_deref().map(expand_home),
        },
        client: ClientConfig {
            endpoint,
            timeout_seconds: parsed.client.timeout_seconds,
        },
        server: ServerConfig {
            bind: overrides.bind.clone().unwrap_or(parsed.server.bind),
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        llm_api_key: env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
    })
}

fn validate_endpoint(endpoint: &str) -> Result<(), AppError> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| AppError::Config(format!("invalid client.endpoint '{endpoint}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::Config(format!(
            "invalid client.endpoint '{endpoint}': unsupported scheme '{other}'"
        ))),
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests: dummy LLM, no API keys, unroutable endpoint.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            log: LogConfig { level: "info".into(), file: None },
            client: ClientConfig {
                endpoint: "http://localhost:0/chat".into(),
                timeout_seconds: Some(1),
            },
            server: ServerConfig { bind: "127.0.0.1:0".into() },
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
            },
            llm_api_key: None,
        }
    }
}
