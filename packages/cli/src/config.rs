use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use prophecy::{CleanerConfig, GroupBy};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Host configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub rapidapi_key: Option<String>,
    pub data_path: PathBuf,
    pub cleaner: CleanerConfig,
    pub lookup_timeout: Duration,
    pub lookup_max_retries: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let group_by = parse_group_by(
            &env::var("PROPHECY_GROUP_BY").unwrap_or_else(|_| "city_state".to_string()),
        )?;
        let mut cleaner = match group_by {
            GroupBy::CityState => CleanerConfig::default(),
            GroupBy::City => CleanerConfig::city_only(),
        };
        if let Ok(min_support) = env::var("PROPHECY_MIN_SUPPORT") {
            cleaner = cleaner.with_min_support(
                min_support
                    .parse()
                    .context("PROPHECY_MIN_SUPPORT must be a non-negative integer")?,
            );
        }

        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| gemini_client::DEFAULT_MODEL.to_string()),
            rapidapi_key: env::var("RAPIDAPI_KEY").ok().filter(|k| !k.is_empty()),
            data_path: env::var("PROPHECY_DATA")
                .unwrap_or_else(|_| "realtor-data.csv".to_string())
                .into(),
            cleaner,
            lookup_timeout: Duration::from_secs(
                env::var("LOOKUP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("LOOKUP_TIMEOUT_SECS must be a number of seconds")?,
            ),
            lookup_max_retries: env::var("LOOKUP_MAX_RETRIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("LOOKUP_MAX_RETRIES must be a non-negative integer")?,
        })
    }

    /// Keys the estimation collaborators need; only `predict` asks for them.
    pub fn api_keys(&self) -> Result<(&str, &str)> {
        let gemini = self
            .gemini_api_key
            .as_deref()
            .context("GEMINI_API_KEY must be set")?;
        let rapidapi = self
            .rapidapi_key
            .as_deref()
            .context("RAPIDAPI_KEY must be set")?;
        Ok((gemini, rapidapi))
    }
}

fn parse_group_by(value: &str) -> Result<GroupBy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "city_state" | "city-state" => Ok(GroupBy::CityState),
        "city" => Ok(GroupBy::City),
        other => bail!("PROPHECY_GROUP_BY must be city_state or city, got '{}'", other),
    }
}
