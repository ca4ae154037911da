use std::env;

use tracing::info;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_SESSION_DB: &str = "sqlite://session.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub session_db: String,
}

impl Config {
    /// Reads settings from the process environment, after loading `.env` if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = try_load(&lookup, "API_URL", DEFAULT_API_URL);
        let api_url = Url::parse(&api_url).map_err(|source| ConfigError::InvalidUrl {
            key: "API_URL",
            value: api_url.clone(),
            source,
        })?;

        Ok(Self {
            api_url,
            session_db: try_load(&lookup, "SESSION_DB", DEFAULT_SESSION_DB),
        })
    }
}

fn try_load<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
}
