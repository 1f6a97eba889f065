use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::currency::Currency;

/// Long-range price forecast used to anchor projections.
///
/// `price_usd` is always in USD; conversion to other currencies happens
/// at projection time using a live FX rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTarget {
    pub price_usd: f64,
    pub anchor_time: DateTime<Utc>,
}

/// ARK Invest bull case: 2.4M USD per BTC by 2030-01-01.
pub const DEFAULT_TARGET_PRICE_USD: f64 = 2_400_000.0;

impl PriceTarget {
    pub fn new(price_usd: f64, anchor_time: DateTime<Utc>) -> Self {
        Self {
            price_usd,
            anchor_time,
        }
    }
}

impl Default for PriceTarget {
    fn default() -> Self {
        Self {
            price_usd: DEFAULT_TARGET_PRICE_USD,
            anchor_time: Utc
                .with_ymd_and_hms(2030, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// Everything the projection engine needs, already expressed in one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub current_price: f64,
    pub current_time: DateTime<Utc>,
    pub anchor_price: f64,
    pub anchor_time: DateTime<Utc>,
    pub target_time: DateTime<Utc>,
    pub currency: Currency,
}

/// Result of a projection, including the growth rate it implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub projected_price: f64,
    /// Implied compound annual growth rate, as a fraction (0.5 = 50%/yr).
    pub cagr: f64,
    pub years_to_anchor: f64,
    pub years_to_target: f64,
    pub currency: Currency,
}
