pub mod thresholds;

use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub app_mode: String,
    pub database_url: String,
    pub queue_endpoint: String,
    pub queue_region: String,
    pub queue_name: String,
    pub db_max_connections: u32,
    pub db_connect_timeout_seconds: u64,
    pub db_idle_timeout_seconds: u64,
    pub db_max_lifetime_seconds: u64,
    pub service_token: Option<String>,
    pub classifier_endpoint: String,
    pub classifier_api_key: String,
    pub classifier_model: String,
    pub classifier_timeout_seconds: u64,
    pub max_content_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let http_addr = env_or("HTTP_ADDR", "0.0.0.0:8080");
        let _parsed_http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;
        let app_mode = env_or("APP_MODE", "api");

        Ok(Self {
            http_addr,
            app_mode,
            database_url: env_or_err("DATABASE_URL")?,
            queue_endpoint: env_or_err("QUEUE_ENDPOINT")?,
            queue_region: env_or("QUEUE_REGION", "us-east-1"),
            queue_name: env_or_err("QUEUE_NAME")?,
            db_max_connections: env_or_parse("DB_MAX_CONNECTIONS", "25")?,
            db_connect_timeout_seconds: env_or_parse("DB_CONNECT_TIMEOUT_SECONDS", "5")?,
            db_idle_timeout_seconds: env_or_parse("DB_IDLE_TIMEOUT_SECONDS", "300")?,
            db_max_lifetime_seconds: env_or_parse("DB_MAX_LIFETIME_SECONDS", "1800")?,
            service_token: std::env::var("SERVICE_TOKEN").ok(),
            classifier_endpoint: env_or(
                "CLASSIFIER_ENDPOINT",
                "https://api.anthropic.com/v1/messages",
            ),
            classifier_api_key: env_or_err("CLASSIFIER_API_KEY")?,
            classifier_model: env_or("CLASSIFIER_MODEL", "claude-3-5-haiku-latest"),
            classifier_timeout_seconds: env_or_parse("CLASSIFIER_TIMEOUT_SECONDS", "30")?,
            max_content_bytes: env_or_parse("MAX_CONTENT_BYTES", "20000")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_err(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing required env var: {}", key))
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}
