use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens. Required; the process refuses to
    /// start without one, since every issued token would be unverifiable.
    #[serde(default)]
    pub token_secret: String,
    /// Session token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
    /// Mark the session cookie Secure. Leave off only for local development
    /// over plain HTTP.
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
            secure_cookies: false,
        }
    }
}

fn default_token_ttl() -> i64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Base URL of the summarization service. The page URL is appended as
    /// the path, e.g. https://r.jina.ai/https://example.com
    #[serde(default = "default_summarizer_url")]
    pub summarizer_url: String,
    /// Timeout for each outbound enrichment fetch in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            summarizer_url: default_summarizer_url(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_summarizer_url() -> String {
    "https://r.jina.ai".to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse configuration file")?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        if config.auth.token_secret.is_empty() {
            if let Ok(secret) = std::env::var("LINKSTASH_TOKEN_SECRET") {
                config.auth.token_secret = secret;
            }
        }
        if config.auth.token_secret.is_empty() {
            bail!(
                "No token signing secret configured. Set [auth] token_secret in {} \
                 or the LINKSTASH_TOKEN_SECRET environment variable",
                path.display()
            );
        }

        Ok(config)
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            enrichment: EnrichmentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
