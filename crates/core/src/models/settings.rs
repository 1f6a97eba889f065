use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use super::projection::PriceTarget;

pub const DEFAULT_BASE_URL: &str = "https://min-api.cryptocompare.com/data";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_KEY: &str = "WHATIF_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "CRYPTOCOMPARE_API_KEY";
pub const ENV_BASE_URL: &str = "WHATIF_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "WHATIF_TIMEOUT_SECS";
pub const ENV_ANCHOR_PRICE_USD: &str = "WHATIF_ANCHOR_PRICE_USD";
pub const ENV_ANCHOR_DATE: &str = "WHATIF_ANCHOR_DATE";

/// Runtime configuration for the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Price API key. Requests are sent without one when unset.
    pub api_key: Option<String>,

    /// Base URL of the price API (no trailing slash).
    pub base_url: String,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,

    /// Long-range target the projection is anchored to.
    pub anchor: PriceTarget,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            anchor: PriceTarget::default(),
        }
    }
}

impl Settings {
    /// Build settings from process environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (env, config map, tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        settings.api_key = get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK));

        if let Some(url) = get(ENV_BASE_URL) {
            settings.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            settings.timeout_secs = raw.parse().map_err(|e| {
                CoreError::Configuration(format!("{ENV_TIMEOUT_SECS}='{raw}' is not a valid integer: {e}"))
            })?;
        }

        if let Some(raw) = get(ENV_ANCHOR_PRICE_USD) {
            settings.anchor.price_usd = raw.replace(',', "").parse().map_err(|e| {
                CoreError::Configuration(format!("{ENV_ANCHOR_PRICE_USD}='{raw}' is not a valid number: {e}"))
            })?;
        }

        if let Some(raw) = get(ENV_ANCHOR_DATE) {
            settings.anchor.anchor_time = parse_anchor_time(&raw)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that can never produce a valid calculation.
    ///
    /// Whether the anchor lies in the future is checked per call, since that
    /// depends on the clock, not on the configuration.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.anchor.price_usd.is_finite() || self.anchor.price_usd <= 0.0 {
            return Err(CoreError::Configuration(format!(
                "Anchor price must be a positive number, got {}",
                self.anchor.price_usd
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::Configuration(
                "Timeout must be at least 1 second".into(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CoreError::Configuration(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Accepts either a plain date (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_anchor_time(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            CoreError::Configuration(format!(
                "Anchor date '{raw}' is neither YYYY-MM-DD nor RFC 3339: {e}"
            ))
        })
}
