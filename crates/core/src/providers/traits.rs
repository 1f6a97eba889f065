use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::currency::Currency;
use crate::models::price::PricePoint;

/// Trait abstraction for remote price data.
///
/// The calculator only talks to this trait, so the concrete API can be
/// swapped (or mocked in tests) without touching the projection or
/// return logic.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Latest quote of `asset` (e.g. "BTC") in `currency`.
    async fn spot_price(&self, asset: &str, currency: Currency) -> Result<PricePoint, CoreError>;

    /// Quote of `asset` in `currency` at 00:00 UTC on `date`.
    async fn historical_price(
        &self,
        asset: &str,
        currency: Currency,
        date: NaiveDate,
    ) -> Result<PricePoint, CoreError>;

    /// Current spot rate: how many units of `quote` one unit of `base` buys.
    async fn fx_rate(&self, base: Currency, quote: Currency) -> Result<f64, CoreError>;
}
