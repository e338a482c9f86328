use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub asset_base_url: String,
    pub default_locale: String,
    pub pagination_idle_timeout: Duration,
    pub http_timeout_secs: u64,
    pub asset_cache_capacity: usize,
    pub dev_guild_id: Option<u64>,
    pub register_commands: bool,
    pub status_message: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        let pagination_idle_timeout = match env::var("PAGINATION_IDLE_TIMEOUT") {
            Ok(raw) => humantime::parse_duration(raw.trim()).map_err(|e| {
                anyhow::anyhow!("PAGINATION_IDLE_TIMEOUT must be a duration like `2m`: {}", e)
            })?,
            Err(_) => crate::pagination::DEFAULT_IDLE_TIMEOUT,
        };
        if pagination_idle_timeout.is_zero() {
            anyhow::bail!("PAGINATION_IDLE_TIMEOUT must be longer than zero");
        }

        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "https://dbd.tricky.lol/api".to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: env::var("API_KEY").ok().filter(|key| !key.is_empty()),
            asset_base_url: env::var("ASSET_BASE_URL")
                .unwrap_or_else(|_| "https://dbd.tricky.lol/dbdassets".to_string())
                .trim_end_matches('/')
                .to_string(),
            default_locale: env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en-US".to_string()),
            pagination_idle_timeout,
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            asset_cache_capacity: env::var("ASSET_CACHE_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse()
                .unwrap_or(256),
            dev_guild_id: env::var("DEV_GUILD_ID").ok().and_then(|id| id.parse().ok()),
            register_commands: env::var("REGISTER_COMMANDS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Watching the fog".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults without touching the process environment.
    pub fn for_tests() -> Self {
        Config {
            discord_token: "test_token".to_string(),
            api_base_url: "http://127.0.0.1:9/api".to_string(),
            api_key: None,
            asset_base_url: "http://127.0.0.1:9/assets".to_string(),
            default_locale: "en-US".to_string(),
            pagination_idle_timeout: crate::pagination::DEFAULT_IDLE_TIMEOUT,
            http_timeout_secs: 1,
            asset_cache_capacity: 8,
            dev_guild_id: None,
            register_commands: false,
            status_message: "Testing".to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("asset_base_url", &self.asset_base_url)
            .field("default_locale", &self.default_locale)
            .field("pagination_idle_timeout", &self.pagination_idle_timeout)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("asset_cache_capacity", &self.asset_cache_capacity)
            .field("dev_guild_id", &self.dev_guild_id)
            .field("register_commands", &self.register_commands)
            .field("status_message", &self.status_message)
            .finish()
    }
}

/// Embed description limit is 4096 characters
pub const DISCORD_EMBED_LIMIT: usize = 4096;
/// Embed field values are capped at 1024 characters
pub const DISCORD_FIELD_LIMIT: usize = 1024;
