use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `DECOR_ANALYZER__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "DECOR_ANALYZER";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
}

/// Inference endpoint settings. The API key is deliberately absent: it is
/// supplied per session and never stored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                log_level: "info".to_string(),
                log_format: "pretty".to_string(),
            },
            gemini: GeminiConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Load configuration: defaults, then the optional file, then environment.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let defaults = Config::default();
    let config = config::Config::builder()
        .set_default("server.host", defaults.server.host)?
        .set_default("server.port", i64::from(defaults.server.port))?
        .set_default("server.log_level", defaults.server.log_level)?
        .set_default("server.log_format", defaults.server.log_format)?
        .set_default("gemini.base_url", defaults.gemini.base_url)?
        .set_default("gemini.model", defaults.gemini.model)?
        .set_default("gemini.timeout_seconds", defaults.gemini.timeout_seconds as i64)?
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.host.trim().is_empty() {
        anyhow::bail!("server.host cannot be empty");
    }

    match cfg.server.log_format.as_str() {
        "pretty" | "json" => {}
        other => anyhow::bail!("Invalid log_format '{}': expected 'pretty' or 'json'", other),
    }

    let base_url = cfg.gemini.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        anyhow::bail!("gemini.base_url must be an http(s) URL, got '{}'", base_url);
    }

    if cfg.gemini.model.trim().is_empty() {
        anyhow::bail!("gemini.model cannot be empty");
    }

    if cfg.gemini.timeout_seconds == 0 {
        anyhow::bail!("gemini.timeout_seconds must be greater than zero");
    }

    Ok(())
}
