use chrono::{DateTime, Utc};

use crate::errors::CoreError;
use crate::models::currency::Currency;
use crate::models::projection::{PriceTarget, Projection, ProjectionRequest};
use crate::providers::traits::PriceSource;

/// Fixed year length used for every elapsed-time fraction.
pub const DAYS_PER_YEAR: f64 = 365.25;
const SECONDS_PER_YEAR: f64 = DAYS_PER_YEAR * 24.0 * 60.0 * 60.0;

/// Asset symbol the engine fetches spot prices for.
pub const ASSET: &str = "BTC";

/// Projects a future price by assuming constant compound growth from the
/// current price to a single long-range target.
///
/// Given the current price `P0`, the anchor price `PA` at `tA` years from now,
/// and a target `tT` years from now:
///
/// ```text
/// cagr      = (PA / P0)^(1 / tA) - 1
/// projected = P0 * (1 + cagr)^tT
/// ```
///
/// The growth rate is re-derived from "now" on every call; nothing is cached.
pub struct ProjectionService {
    target: PriceTarget,
}

impl ProjectionService {
    pub fn new(target: PriceTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &PriceTarget {
        &self.target
    }

    /// Pure projection over a fully-resolved request.
    pub fn project(request: &ProjectionRequest) -> Result<Projection, CoreError> {
        require_positive("current price", request.current_price)?;
        require_positive("anchor price", request.anchor_price)?;

        if request.target_time <= request.current_time {
            return Err(CoreError::InvalidProjectionWindow(format!(
                "Projection target {} must be strictly after now ({})",
                request.target_time, request.current_time
            )));
        }

        let years_to_anchor = years_between(request.current_time, request.anchor_time);
        let years_to_target = years_between(request.current_time, request.target_time);

        let cagr = implied_cagr(request.current_price, request.anchor_price, years_to_anchor)?;
        let projected_price = request.current_price * (1.0 + cagr).powf(years_to_target);

        if !projected_price.is_finite() {
            return Err(CoreError::InvalidInput(format!(
                "Projection overflowed for {years_to_target:.3} years at CAGR {cagr}"
            )));
        }

        tracing::debug!(
            currency = %request.currency,
            cagr,
            years_to_anchor,
            years_to_target,
            projected_price,
            "projected price"
        );

        Ok(Projection {
            projected_price,
            cagr,
            years_to_anchor,
            years_to_target,
            currency: request.currency,
        })
    }

    /// Fetch the current price (and FX rate for non-USD), then project to `target_time`.
    ///
    /// The anchor is defined in USD; for any other currency it is converted with
    /// the spot USD→currency rate fetched now, so growth rate and projection stay
    /// in one currency.
    pub async fn projected_price(
        &self,
        source: &dyn PriceSource,
        currency: Currency,
        now: DateTime<Utc>,
        target_time: DateTime<Utc>,
    ) -> Result<Projection, CoreError> {
        // Fail before any network call if the window is already invalid.
        if target_time <= now {
            return Err(CoreError::InvalidProjectionWindow(format!(
                "Prediction only for future dates: {target_time} is not after {now}"
            )));
        }
        if self.target.anchor_time <= now {
            return Err(CoreError::InvalidProjectionWindow(format!(
                "Anchor date {} has already passed; configure a future anchor",
                self.target.anchor_time
            )));
        }

        let current = source.spot_price(ASSET, currency).await?;
        if !current.is_usable() {
            return Err(CoreError::PriceUnavailable {
                asset: ASSET.into(),
                currency: currency.to_string(),
                date: now.date_naive().to_string(),
            });
        }
        let anchor_price = self.anchor_price_in(source, currency).await?;

        Self::project(&ProjectionRequest {
            current_price: current.amount,
            current_time: now,
            anchor_price,
            anchor_time: self.target.anchor_time,
            target_time,
            currency,
        })
    }

    /// The anchor price expressed in `currency`, using a freshly fetched FX rate.
    pub async fn anchor_price_in(
        &self,
        source: &dyn PriceSource,
        currency: Currency,
    ) -> Result<f64, CoreError> {
        if currency == Currency::Usd {
            return Ok(self.target.price_usd);
        }
        let rate = source.fx_rate(Currency::Usd, currency).await?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(CoreError::PriceUnavailable {
                asset: Currency::Usd.to_string(),
                currency: currency.to_string(),
                date: "now".into(),
            });
        }
        Ok(self.target.price_usd * rate)
    }
}

/// Constant annual growth rate taking `from` to `to` over `years`.
pub fn implied_cagr(from: f64, to: f64, years: f64) -> Result<f64, CoreError> {
    require_positive("start price", from)?;
    require_positive("end price", to)?;
    if !years.is_finite() || years <= 0.0 {
        return Err(CoreError::InvalidProjectionWindow(format!(
            "Anchor must lie strictly in the future (got {years:.4} years)"
        )));
    }
    Ok((to / from).powf(1.0 / years) - 1.0)
}

/// Signed elapsed time from `from` to `to` in 365.25-day years.
pub fn years_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to.signed_duration_since(from);
    // Milliseconds keep sub-second precision without overflowing i64.
    delta.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_YEAR
}

fn require_positive(what: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::InvalidInput(format!(
            "{what} must be a positive number, got {value}"
        )));
    }
    Ok(())
}
