use std::time::Duration;

use crate::error::WatchError;
use crate::types::CheckpointPolicy;

pub const DEFAULT_PRACTICUM_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct AppConfig {
    /// OAuth token for the Practicum homework API
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives status and failure notifications
    pub telegram_chat_id: String,

    /// Homework statuses endpoint
    pub practicum_endpoint: String,

    /// Telegram Bot API base URL
    pub telegram_api_url: String,

    /// Seconds between two polling cycles (default: 600)
    pub poll_interval_secs: u64,

    /// How far back the first fetch window starts (default: one poll interval)
    pub initial_offset_secs: u64,

    /// Timeout applied to every outgoing HTTP request (default: 5)
    pub http_timeout_secs: u64,

    /// Where the checkpoint moves after each cycle
    pub checkpoint_policy: CheckpointPolicy,

    /// Treat a payload without `current_date` as invalid
    pub require_current_date: bool,
}

impl AppConfig {
    /// Load configuration from environment variables (and `.env`, if present).
    ///
    /// All missing credentials are reported in a single error.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::from_lookup(|key| std::env::var(key).ok())?)
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WatchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"]
            .into_iter()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(WatchError::Config(format!(
                "required environment variables are missing: {}",
                missing.join(", ")
            )));
        }

        let parse_u64 = |key: &str, default: u64| -> Result<u64, WatchError> {
            match get(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| WatchError::Config(format!("{} must be a valid u64", key))),
                None => Ok(default),
            }
        };

        let poll_interval_secs = parse_u64("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        if poll_interval_secs == 0 {
            return Err(WatchError::Config(
                "POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        let require_current_date = match get("REQUIRE_CURRENT_DATE") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(WatchError::Config(
                        "REQUIRE_CURRENT_DATE must be a boolean".to_string(),
                    ));
                }
            },
            None => false,
        };

        Ok(Self {
            practicum_token: get("PRACTICUM_TOKEN").unwrap_or_default(),
            telegram_token: get("TELEGRAM_TOKEN").unwrap_or_default(),
            telegram_chat_id: get("TELEGRAM_CHAT_ID").unwrap_or_default(),
            practicum_endpoint: get("PRACTICUM_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PRACTICUM_ENDPOINT.to_string()),
            telegram_api_url: get("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            poll_interval_secs,
            initial_offset_secs: parse_u64("INITIAL_OFFSET_SECS", poll_interval_secs)?,
            http_timeout_secs: parse_u64("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            checkpoint_policy: match get("CHECKPOINT_POLICY") {
                Some(raw) => raw.parse()?,
                None => CheckpointPolicy::default(),
            },
            require_current_date,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

// Tokens must never reach the logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("practicum_endpoint", &self.practicum_endpoint)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("initial_offset_secs", &self.initial_offset_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("checkpoint_policy", &self.checkpoint_policy)
            .field("require_current_date", &self.require_current_date)
            .finish()
    }
}
