use eyre::Result;
use std::time::Duration;
use url::Url;

/// Getgems collection the watcher tracks (+888 anonymous numbers).
pub const COLLECTION_ADDRESS: &str = "EQAOQdwdw8kGftJCSFgOErM1mBjYPe4DBPq8-AhF6vr9si5N";

pub const DEFAULT_MARKETPLACE_URL: &str = "https://getgems.io/graphql/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org/";
pub const DEFAULT_COLLECTION_PAGE_URL: &str = "https://getgems.io/collection/";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

// Configuration struct
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub group_id: String,
    pub marketplace_url: String,
    pub telegram_api_url: String,
    pub collection_address: String,
    pub poll_interval_secs: u64,
}

impl BotConfig {
    /// Load the bot token and destination chat from the environment (or `.env`).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let bot_token = std::env::var("BOT_TOKEN")
            .map_err(|_| eyre::eyre!("BOT_TOKEN environment variable not set"))?;

        let group_id = std::env::var("GROUP_ID")
            .map_err(|_| eyre::eyre!("GROUP_ID environment variable not set"))?;

        Ok(Self::new(bot_token, group_id))
    }

    pub fn new(bot_token: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            group_id: group_id.into(),
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            collection_address: COLLECTION_ADDRESS.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            return Err(eyre::eyre!("BOT_TOKEN cannot be empty"));
        }

        if self.group_id.trim().is_empty() {
            return Err(eyre::eyre!("GROUP_ID cannot be empty"));
        }

        Url::parse(&self.marketplace_url)
            .map_err(|e| eyre::eyre!("Invalid marketplace URL '{}': {}", self.marketplace_url, e))?;
        Url::parse(&self.telegram_api_url).map_err(|e| {
            eyre::eyre!("Invalid Telegram API URL '{}': {}", self.telegram_api_url, e)
        })?;

        if self.poll_interval_secs == 0 {
            return Err(eyre::eyre!("Poll interval must be greater than 0"));
        }

        Ok(())
    }

    /// Get a summary of the configuration. The bot token is never printed.
    pub fn summary(&self) -> String {
        format!(
            "Floor Watch Configuration:\n\
             - Marketplace: {}\n\
             - Collection: {}\n\
             - Telegram API: {}\n\
             - Bot Token: {}\n\
             - Group ID: {}\n\
             - Poll Interval: {} seconds",
            self.marketplace_url,
            self.collection_address,
            self.telegram_api_url,
            redact(&self.bot_token),
            self.group_id,
            self.poll_interval_secs
        )
    }
}

fn redact(secret: &str) -> String {
    match secret.split_once(':') {
        Some((bot_id, _)) => format!("{}:***", bot_id),
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_fixed_defaults() {
        let config = BotConfig::new("123:abc", "-1001");
        assert_eq!(config.collection_address, COLLECTION_ADDRESS);
        assert_eq!(config.marketplace_url, DEFAULT_MARKETPLACE_URL);
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        assert!(BotConfig::new("", "-1001").validate().is_err());
        assert!(BotConfig::new("123:abc", "  ").validate().is_err());

        let mut config = BotConfig::new("123:abc", "-1001");
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = BotConfig::new("123:abc", "-1001");
        config.marketplace_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_redacts_token() {
        let summary = BotConfig::new("123456:SECRET", "-1001").summary();
        assert!(summary.contains("123456:***"));
        assert!(!summary.contains("SECRET"));
        assert_eq!(redact("plain"), "***");
    }
}
