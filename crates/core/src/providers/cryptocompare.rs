use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::{sanitize_message, CoreError};
use crate::models::currency::Currency;
use crate::models::price::PricePoint;
use crate::models::settings::{Settings, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use super::traits::PriceSource;

const PROVIDER: &str = "CryptoCompare";

/// CryptoCompare min-api provider for crypto prices and fiat FX rates.
///
/// - **Key**: optional. Anonymous requests work at a lower rate limit.
/// - **Endpoints**: `/price` (spot, also used for fiat FX) and
///   `/pricehistorical` (daily close at a unix timestamp).
/// - Prices are quoted directly in the requested currency, so no
///   intermediate USD conversion is needed for BTC→JPY.
pub struct CryptoCompareProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CryptoCompareProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, DEFAULT_TIMEOUT_SECS)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_base_url(&settings.base_url, settings.api_key.clone(), settings.timeout_secs)
    }

    pub fn with_base_url(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// `/price?fsym={from}&tsyms={to}[&api_key=...]`
    pub fn spot_url(&self, from: &str, to: &str) -> Result<Url, CoreError> {
        self.endpoint_url(
            "price",
            &[("fsym", from.to_uppercase()), ("tsyms", to.to_uppercase())],
        )
    }

    /// `/pricehistorical?fsym={from}&tsyms={to}&ts={unix secs at 00:00 UTC}[&api_key=...]`
    pub fn historical_url(&self, from: &str, to: &str, date: NaiveDate) -> Result<Url, CoreError> {
        let ts = start_of_day(date).timestamp();
        self.endpoint_url(
            "pricehistorical",
            &[
                ("fsym", from.to_uppercase()),
                ("tsyms", to.to_uppercase()),
                ("ts", ts.to_string()),
            ],
        )
    }

    fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, CoreError> {
        let mut pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        if let Some(key) = &self.api_key {
            pairs.push(("api_key", key.as_str()));
        }
        Url::parse_with_params(&format!("{}/{path}", self.base_url), &pairs).map_err(|e| {
            CoreError::Configuration(format!("Invalid price API URL '{}': {e}", self.base_url))
        })
    }

    async fn get_body(&self, url: Url) -> Result<String, CoreError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(CoreError::Upstream {
                provider: PROVIDER.into(),
                message: format!("HTTP {status}: {}", sanitize_message(truncate(&body, 200))),
            });
        }
        Ok(body)
    }
}

impl Default for CryptoCompareProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

// ── CryptoCompare API response types ────────────────────────────────

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Message", default)]
    message: String,
}

/// `/price` → `{"JPY": 9876543.2}` on success.
#[derive(Deserialize)]
#[serde(untagged)]
enum SpotResponse {
    Error(ApiErrorBody),
    Quotes(HashMap<String, f64>),
}

/// `/pricehistorical` → `{"BTC": {"USD": 12345.6}}` on success.
#[derive(Deserialize)]
#[serde(untagged)]
enum HistoricalResponse {
    Error(ApiErrorBody),
    Quotes(HashMap<String, HashMap<String, f64>>),
}

fn api_error(body: ApiErrorBody) -> CoreError {
    CoreError::Upstream {
        provider: PROVIDER.into(),
        message: format!("{}: {}", body.response, sanitize_message(&body.message)),
    }
}

fn parse_failure(what: &str, e: serde_json::Error) -> CoreError {
    CoreError::Upstream {
        provider: PROVIDER.into(),
        message: format!("Failed to parse {what} response: {e}"),
    }
}

/// Extract the `to` quote from a `/price` body. `Ok(None)` means the API
/// answered but had no usable quote.
pub fn parse_spot_body(body: &str, to: &str) -> Result<Option<f64>, CoreError> {
    match serde_json::from_str::<SpotResponse>(body).map_err(|e| parse_failure("spot", e))? {
        SpotResponse::Error(err) => Err(api_error(err)),
        SpotResponse::Quotes(quotes) => Ok(quotes
            .get(&to.to_uppercase())
            .copied()
            .filter(|p| usable(*p))),
    }
}

/// Extract the `from`→`to` quote from a `/pricehistorical` body.
pub fn parse_historical_body(body: &str, from: &str, to: &str) -> Result<Option<f64>, CoreError> {
    match serde_json::from_str::<HistoricalResponse>(body)
        .map_err(|e| parse_failure("historical", e))?
    {
        HistoricalResponse::Error(err) => Err(api_error(err)),
        HistoricalResponse::Quotes(quotes) => Ok(quotes
            .get(&from.to_uppercase())
            .and_then(|by_cur| by_cur.get(&to.to_uppercase()))
            .copied()
            .filter(|p| usable(*p))),
    }
}

fn usable(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PriceSource for CryptoCompareProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn spot_price(&self, asset: &str, currency: Currency) -> Result<PricePoint, CoreError> {
        tracing::debug!(provider = PROVIDER, asset, %currency, "fetching spot price");
        let body = self.get_body(self.spot_url(asset, currency.code())?).await?;
        let price = parse_spot_body(&body, currency.code())?.ok_or_else(|| {
            CoreError::PriceUnavailable {
                asset: asset.to_uppercase(),
                currency: currency.to_string(),
                date: "now".into(),
            }
        })?;
        Ok(PricePoint::new(price, currency, Utc::now()))
    }

    async fn historical_price(
        &self,
        asset: &str,
        currency: Currency,
        date: NaiveDate,
    ) -> Result<PricePoint, CoreError> {
        tracing::debug!(provider = PROVIDER, asset, %currency, %date, "fetching historical price");
        let body = self
            .get_body(self.historical_url(asset, currency.code(), date)?)
            .await?;
        let price = parse_historical_body(&body, asset, currency.code())?.ok_or_else(|| {
            CoreError::PriceUnavailable {
                asset: asset.to_uppercase(),
                currency: currency.to_string(),
                date: date.to_string(),
            }
        })?;
        Ok(PricePoint::new(price, currency, start_of_day(date)))
    }

    async fn fx_rate(&self, base: Currency, quote: Currency) -> Result<f64, CoreError> {
        if base == quote {
            return Ok(1.0);
        }
        tracing::debug!(provider = PROVIDER, %base, %quote, "fetching FX rate");
        let body = self.get_body(self.spot_url(base.code(), quote.code())?).await?;
        parse_spot_body(&body, quote.code())?.ok_or_else(|| CoreError::PriceUnavailable {
            asset: base.to_string(),
            currency: quote.to_string(),
            date: "now".into(),
        })
    }
}
