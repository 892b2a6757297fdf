use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::webhook::WebhookConfig;
use crate::BoxError;

pub const DEFAULT_CONFIG_PATH: &str = "config/contract-gateway.config.toml";
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_WEBHOOK_URL: &str = "https://n8n.doorbinwaste.com/webhook/consultar-cotizacion";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const MODE_ENV_VAR: &str = "CONTRACT_GATEWAY_MODE";

/// Selects how the acceptance page is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Serve a prebuilt bundle from `static_dir` when one is available.
    Production,
    /// Always serve the embedded page, uncached.
    Development,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Mode::Production),
            "development" | "dev" => Ok(Mode::Development),
            other => Err(format!(
                "Invalid mode '{}': expected 'production' or 'development'",
                other
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Production => write!(f, "production"),
            Mode::Development => write!(f, "development"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_address: String,
    pub mode: Mode,
    pub static_dir: Option<PathBuf>,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayConfigFile {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    webhook: WebhookSection,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    listen_address: Option<String>,
    mode: Option<String>,
    static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: Some(DEFAULT_LISTEN_ADDRESS.to_string()),
            mode: Some("production".to_string()),
            static_dir: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookSection {
    url: Option<String>,
    fetch_timeout_secs: Option<u64>,
    submit_timeout_secs: Option<u64>,
    user_agent: Option<String>,
    pool_idle_timeout_secs: Option<u64>,
}

impl Default for WebhookSection {
    fn default() -> Self {
        Self {
            url: Some(DEFAULT_WEBHOOK_URL.to_string()),
            fetch_timeout_secs: Some(10),
            submit_timeout_secs: Some(10),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            pool_idle_timeout_secs: Some(300),
        }
    }
}

fn arg_value(args: &[String], long: &str, short: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == long || arg == short)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn timeout_secs(name: &str, secs: u64) -> Result<Duration, BoxError> {
    if secs == 0 {
        return Err(format!("Invalid config: webhook.{} must be greater than zero", name).into());
    }
    Ok(Duration::from_secs(secs))
}

impl Config {
    pub fn from_args() -> Result<Self, BoxError> {
        let args: Vec<String> = env::args().collect();
        let env_mode = env::var(MODE_ENV_VAR).ok();
        Self::from_arg_list(&args, env_mode)
    }

    /// Resolves configuration from CLI arguments, the config file they point
    /// at and the mode environment variable. CLI flags win over the
    /// environment, which wins over the file.
    pub fn from_arg_list(
        args: &[String],
        env_mode: Option<String>,
    ) -> Result<Self, BoxError> {
        let config_path = arg_value(args, "--config", "-c")
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        // A missing file means defaults
        let config_str = fs::read_to_string(&config_path).unwrap_or_default();
        let file = Self::parse_file(&config_str)?;

        let listen_address = arg_value(args, "--listen-address", "-l")
            .or(file.server.listen_address)
            .ok_or("Missing required config: server.listen_address")?;

        let mode = arg_value(args, "--mode", "-m")
            .or(env_mode)
            .or(file.server.mode)
            .map(|m| m.parse::<Mode>())
            .transpose()?
            .unwrap_or(Mode::Production);

        let url = arg_value(args, "--webhook-url", "-w")
            .or(file.webhook.url)
            .ok_or("Missing required config: webhook.url")?;
        let url = Url::parse(&url).map_err(|e| format!("Invalid webhook url '{}': {}", url, e))?;

        let webhook = WebhookConfig {
            url,
            fetch_timeout: timeout_secs(
                "fetch_timeout_secs",
                file.webhook.fetch_timeout_secs.unwrap_or(10),
            )?,
            submit_timeout: timeout_secs(
                "submit_timeout_secs",
                file.webhook.submit_timeout_secs.unwrap_or(10),
            )?,
            user_agent: file
                .webhook
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            pool_idle_timeout: Duration::from_secs(
                file.webhook.pool_idle_timeout_secs.unwrap_or(300),
            ),
        };

        Ok(Config {
            listen_address,
            mode,
            static_dir: file.server.static_dir,
            webhook,
        })
    }

    fn parse_file(config_str: &str) -> Result<GatewayConfigFile, toml::de::Error> {
        if config_str.trim().is_empty() {
            Ok(GatewayConfigFile::default())
        } else {
            toml::from_str(config_str)
        }
    }
}
