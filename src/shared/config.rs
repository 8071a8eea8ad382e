use crate::shared::errors::{AppError, AppResult};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PLACES_API_URL: &str = "https://maps.googleapis.com/maps/api/place";
pub const DEFAULT_REGISTRY_API_URL: &str = "https://api-rspo.men.gov.pl/api";

/// Runtime settings for the scraping pipeline
#[derive(Clone)]
pub struct ScraperSettings {
    pub requests_per_minute: u32,
    pub proxies: Vec<String>,
    pub max_retries: u32,
    pub request_timeout: Duration,
    pub proxy_block_duration: Duration,
    pub places_api_key: Option<String>,
    pub places_base_url: String,
    pub registry_base_url: String,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            requests_per_minute: 24,
            proxies: Vec::new(),
            max_retries: 3,
            request_timeout: Duration::from_secs(30),
            proxy_block_duration: Duration::from_secs(5 * 60),
            places_api_key: None,
            places_base_url: DEFAULT_PLACES_API_URL.to_string(),
            registry_base_url: DEFAULT_REGISTRY_API_URL.to_string(),
        }
    }
}

// Keeps the API key out of debug output
impl std::fmt::Debug for ScraperSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperSettings")
            .field("requests_per_minute", &self.requests_per_minute)
            .field("proxies", &self.proxies.len())
            .field("max_retries", &self.max_retries)
            .field("request_timeout", &self.request_timeout)
            .field("proxy_block_duration", &self.proxy_block_duration)
            .field("places_api_key", &self.places_api_key.as_ref().map(|_| "***"))
            .field("places_base_url", &self.places_base_url)
            .field("registry_base_url", &self.registry_base_url)
            .finish()
    }
}

impl ScraperSettings {
    /// Load settings from the process environment (and `.env`, if present)
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let settings = Self {
            requests_per_minute: parse_or(
                get("SCRAPER_RATE_LIMIT"),
                "SCRAPER_RATE_LIMIT",
                defaults.requests_per_minute,
            )?,
            proxies: get("SCRAPER_PROXIES")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            max_retries: parse_or(
                get("SCRAPER_MAX_RETRIES"),
                "SCRAPER_MAX_RETRIES",
                defaults.max_retries,
            )?,
            request_timeout: Duration::from_secs(parse_or(
                get("SCRAPER_REQUEST_TIMEOUT_SECS"),
                "SCRAPER_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            proxy_block_duration: Duration::from_secs(parse_or(
                get("SCRAPER_PROXY_BLOCK_SECS"),
                "SCRAPER_PROXY_BLOCK_SECS",
                defaults.proxy_block_duration.as_secs(),
            )?),
            places_api_key: get("GOOGLE_PLACES_API_KEY"),
            places_base_url: get("GOOGLE_PLACES_API_URL").unwrap_or(defaults.places_base_url),
            registry_base_url: get("RSPO_API_URL").unwrap_or(defaults.registry_base_url),
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> AppResult<()> {
        if self.requests_per_minute == 0 {
            return Err(AppError::ConfigurationError(
                "SCRAPER_RATE_LIMIT must be greater than 0".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(AppError::ConfigurationError(
                "SCRAPER_MAX_RETRIES must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(AppError::ConfigurationError(
                "SCRAPER_REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> AppResult<T> {
    match value {
        Some(raw) => raw.parse::<T>().map_err(|_| {
            AppError::ConfigurationError(format!("{} has an invalid value: '{}'", key, raw))
        }),
        None => Ok(default),
    }
}
