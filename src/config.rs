//! Configuration module for the anime catalog scraper
//!
//! Handles loading environment variables and application configuration.

use std::env;
use std::time::Duration;

use crate::render::BrowserConfig;
use crate::scraper::ScraperConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the catalog site
    pub base_url: String,
    /// Base URL of the weekly schedule JSON API
    pub schedule_url: String,
    /// Per-request timeout for the document fetcher
    pub request_timeout: Duration,
    /// Whether to rotate user agents between requests
    pub rotate_user_agent: bool,
    /// Whether the rendering engine runs without a visible window
    pub browser_headless: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www1.gogoanime.ai".to_string(),
            schedule_url: "https://api.jikan.moe/v3/schedule/".to_string(),
            request_timeout: Duration::from_secs(30),
            rotate_user_agent: true,
            browser_headless: true,
        }
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment
    ///
    /// Every key is optional; unset or unparseable values fall back to
    /// [`Config::default`].
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            base_url: env::var("BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            schedule_url: env::var("SCHEDULE_URL").unwrap_or(defaults.schedule_url),
            request_timeout: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|secs| secs.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            rotate_user_agent: env_flag("ROTATE_USER_AGENT").unwrap_or(defaults.rotate_user_agent),
            browser_headless: env_flag("BROWSER_HEADLESS").unwrap_or(defaults.browser_headless),
        }
    }

    /// Fetcher settings derived from this configuration
    pub fn scraper_config(&self) -> ScraperConfig {
        ScraperConfig {
            timeout: self.request_timeout,
            rotate_user_agent: self.rotate_user_agent,
            ..ScraperConfig::default()
        }
    }

    /// Rendering engine settings derived from this configuration
    pub fn browser_config(&self) -> BrowserConfig {
        BrowserConfig {
            headless: self.browser_headless,
            ..BrowserConfig::default()
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
