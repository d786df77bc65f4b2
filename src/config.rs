use crate::utils::retry::RetryPolicy;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";

/// Everything the agent needs from the environment, read once at start
#[derive(Debug, Clone)]
pub struct Config {
    pub api_football_key: String,
    pub api_football_host: String,
    pub api_football_base_url: String,

    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,

    pub smtp_email: String,
    pub smtp_app_password: String,
    pub smtp_server: String,
    pub smtp_port: u16,

    /// Recipient used by the command-line run when none is given
    pub recipient_email: String,
    pub port: u16,

    pub http_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present)
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup. Used by `from_env` and tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} not set in environment or .env file", key))
        };

        let api_football_key = required("API_FOOTBALL_KEY")?;
        let api_football_host = required("API_FOOTBALL_HOST")?;
        let api_football_base_url = lookup("API_FOOTBALL_BASE_URL")
            .unwrap_or_else(|| format!("https://{}", api_football_host));

        let openai_api_key = required("OPENAI_API_KEY")?;
        let openai_base_url =
            lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        let openai_model =
            lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        let smtp_email = required("SMTP_EMAIL")?;
        let smtp_app_password = required("SMTP_APP_PASSWORD")?;
        let smtp_server =
            lookup("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string());
        let smtp_port = parse_or(&lookup, "SMTP_PORT", 465u16)?;

        let recipient_email = lookup("RECIPIENT_EMAIL").unwrap_or_else(|| smtp_email.clone());
        let port = parse_or(&lookup, "PORT", 5000u16)?;

        let http_timeout = Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30u64)?);
        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "RETRY_MAX_ATTEMPTS", 3u32)?.max(1),
            base_delay: Duration::from_millis(parse_or(&lookup, "RETRY_BASE_DELAY_MS", 500u64)?),
            ..RetryPolicy::default()
        };

        Ok(Self {
            api_football_key,
            api_football_host,
            api_football_base_url: api_football_base_url.trim_end_matches('/').to_string(),
            openai_api_key,
            openai_base_url: openai_base_url.trim_end_matches('/').to_string(),
            openai_model,
            smtp_email,
            smtp_app_password,
            smtp_server,
            smtp_port,
            recipient_email,
            port,
            http_timeout,
            retry,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", key, raw)),
        _ => Ok(default),
    }
}
