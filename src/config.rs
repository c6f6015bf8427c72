use crate::error::RelayError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_FILE: &str = ".env";

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub practicum: PracticumConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PracticumConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_timeout_ms() -> u64 { 10_000 }

impl Default for PracticumConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    #[serde(default = "default_retry_period_s")]
    pub retry_period_s: u64,
    /// Fixed lower bound for the `from_date` filter. Defaults to process start.
    #[serde(default)]
    pub from_date: Option<i64>,
}

fn default_retry_period_s() -> u64 { 600 }

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            retry_period_s: default_retry_period_s(),
            from_date: None,
        }
    }
}

impl PollingConfig {
    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_s)
    }

    /// The cursor is computed once here and reused for every poll.
    pub fn initial_cursor(&self) -> i64 {
        self.from_date.unwrap_or_else(|| chrono::Utc::now().timestamp())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("homework.log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { file: default_log_file() }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        // Absent .env is the normal case in deployments.
        let _ = dotenvy::from_filename(ENV_FILE);
    }
}

/// The three secrets the relay needs. Read once at startup.
#[derive(Clone, Default)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).map(|v| sanitize_key(&v)).unwrap_or_default();
        Self {
            practicum_token: read(PRACTICUM_TOKEN),
            telegram_token: read(TELEGRAM_TOKEN),
            telegram_chat_id: read(TELEGRAM_CHAT_ID),
        }
    }

    /// Names of the variables that are empty or unset.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (PRACTICUM_TOKEN, &self.practicum_token),
            (TELEGRAM_TOKEN, &self.telegram_token),
            (TELEGRAM_CHAT_ID, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn check(&self) -> std::result::Result<(), RelayError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RelayError::MissingCredentials(missing))
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(v: &str) -> &'static str {
            if v.is_empty() { "<unset>" } else { "<redacted>" }
        }
        f.debug_struct("Credentials")
            .field("practicum_token", &redact(&self.practicum_token))
            .field("telegram_token", &redact(&self.telegram_token))
            .field("telegram_chat_id", &redact(&self.telegram_chat_id))
            .finish()
    }
}

/// Strip carriage returns, BOM, and other invisible chars from a key value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
