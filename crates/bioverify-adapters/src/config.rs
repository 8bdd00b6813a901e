//! Adapter settings read from the environment.

use std::time::Duration;

use bioverify_core::config::env_var;
use bioverify_core::BioVerifyError;

use crate::telegram::TelegramCredentials;
use crate::{gemini, tavily, telegram};

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// IPFS gateway base, also used for manifest links in notifications.
    pub gateway_url: String,
    pub search_url: String,
    pub search_api_key: String,
    pub model_base_url: String,
    pub model: String,
    pub model_api_key: String,
    pub telegram_api_base: String,
    pub telegram: Option<TelegramCredentials>,
    pub http_timeout: Duration,
}

impl AdapterConfig {
    /// Read `PINATA_IPFS_URL`, `TAVILY_*`, `GEMINI_*`, `TELEGRAM_*` and
    /// `BIOVERIFY_HTTP_TIMEOUT_SECS`.
    ///
    /// The gateway and both API keys are required; chat credentials are
    /// optional.
    pub fn from_env() -> Result<Self, BioVerifyError> {
        let timeout_secs = match env_var("BIOVERIFY_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                BioVerifyError::Configuration(format!("BIOVERIFY_HTTP_TIMEOUT_SECS: {e}"))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let telegram = match (env_var("TELEGRAM_BOT_TOKEN"), env_var("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramCredentials { bot_token, chat_id }),
            _ => None,
        };

        Ok(Self {
            gateway_url: required("PINATA_IPFS_URL")?,
            search_url: env_var("TAVILY_SEARCH_URL").unwrap_or_else(|| tavily::DEFAULT_SEARCH_URL.into()),
            search_api_key: required("TAVILY_API_KEY")?,
            model_base_url: env_var("GEMINI_BASE_URL").unwrap_or_else(|| gemini::DEFAULT_BASE_URL.into()),
            model: env_var("GEMINI_MODEL").unwrap_or_else(|| gemini::DEFAULT_MODEL.into()),
            model_api_key: required("GEMINI_API_KEY")?,
            telegram_api_base: env_var("TELEGRAM_API_BASE")
                .unwrap_or_else(|| telegram::DEFAULT_API_BASE.into()),
            telegram,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn required(name: &str) -> Result<String, BioVerifyError> {
    env_var(name).ok_or_else(|| BioVerifyError::Configuration(format!("{name} is not set")))
}
