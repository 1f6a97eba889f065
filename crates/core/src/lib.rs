pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use models::{
    currency::Currency,
    investment::{InvestmentResult, SellMode},
    projection::{PriceTarget, Projection},
    settings::Settings,
};
use providers::{cryptocompare::CryptoCompareProvider, traits::PriceSource};
use services::{
    projection_service::{ProjectionService, ASSET},
    return_service::ReturnService,
};

use errors::CoreError;

/// Main entry point for the What-If calculator.
/// Holds the price source and the services that turn quotes into a result.
/// Stateless between calls: every submission is computed from scratch.
#[must_use]
pub struct WhatIfCalculator {
    source: Box<dyn PriceSource>,
    projection_service: ProjectionService,
    return_service: ReturnService,
}

impl std::fmt::Debug for WhatIfCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatIfCalculator")
            .field("source", &self.source.name())
            .field("anchor", self.projection_service.target())
            .finish()
    }
}

impl WhatIfCalculator {
    /// Build a calculator backed by the CryptoCompare API.
    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::with_source(
            Box::new(CryptoCompareProvider::from_settings(settings)),
            settings.anchor.clone(),
        ))
    }

    /// Build a calculator over any price source (used by tests and alternate backends).
    pub fn with_source(source: Box<dyn PriceSource>, anchor: PriceTarget) -> Self {
        Self {
            source,
            projection_service: ProjectionService::new(anchor),
            return_service: ReturnService::new(),
        }
    }

    #[must_use]
    pub fn anchor(&self) -> &PriceTarget {
        self.projection_service.target()
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    // ── Outcome ─────────────────────────────────────────────────────

    /// Compute the outcome of investing `invested_amount` on `buy_date` and
    /// selling per `mode`, using the system clock.
    pub async fn compute_outcome(
        &self,
        buy_date: NaiveDate,
        invested_amount: f64,
        currency: Currency,
        mode: SellMode,
    ) -> Result<InvestmentResult, CoreError> {
        self.compute_outcome_at(Utc::now(), buy_date, invested_amount, currency, mode)
            .await
    }

    /// Same as [`compute_outcome`](Self::compute_outcome) with an explicit "now".
    ///
    /// Upstream calls happen in order: historical buy price, then spot price,
    /// then (future mode, non-USD only) the USD FX rate.
    pub async fn compute_outcome_at(
        &self,
        now: DateTime<Utc>,
        buy_date: NaiveDate,
        invested_amount: f64,
        currency: Currency,
        mode: SellMode,
    ) -> Result<InvestmentResult, CoreError> {
        let today = now.date_naive();

        // Validate everything we can before touching the network.
        if !invested_amount.is_finite() || invested_amount <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "Investment amount must be positive, got {invested_amount}"
            )));
        }
        if buy_date > today {
            return Err(CoreError::InvalidInput(format!(
                "Buy date {buy_date} is in the future (today is {today})"
            )));
        }
        if let SellMode::Future(sell_date) = mode {
            if sell_date <= today {
                return Err(CoreError::InvalidProjectionWindow(format!(
                    "Future sell date {sell_date} must be after today ({today})"
                )));
            }
        }

        tracing::info!(%buy_date, invested_amount, %currency, ?mode, "computing outcome");

        let buy = self.source.historical_price(ASSET, currency, buy_date).await?;
        if !buy.is_usable() {
            return Err(CoreError::PriceUnavailable {
                asset: ASSET.into(),
                currency: currency.to_string(),
                date: buy_date.to_string(),
            });
        }
        let buy_price = buy.amount;

        let (sell_price, sell_date) = match mode {
            SellMode::Today => {
                let spot = self.source.spot_price(ASSET, currency).await?;
                if !spot.is_usable() {
                    return Err(CoreError::PriceUnavailable {
                        asset: ASSET.into(),
                        currency: currency.to_string(),
                        date: today.to_string(),
                    });
                }
                (spot.amount, today)
            }
            SellMode::Future(sell_date) => {
                let projection = self
                    .projection_service
                    .projected_price(self.source.as_ref(), currency, now, start_of_day(sell_date))
                    .await?;
                (projection.projected_price, sell_date)
            }
        };

        let figures = self
            .return_service
            .calculate(buy_price, sell_price, invested_amount)?;

        tracing::debug!(
            buy_price,
            sell_price,
            roi_percent = figures.roi_percent,
            "outcome computed"
        );

        Ok(InvestmentResult::from_figures(
            figures,
            buy_price,
            sell_price,
            currency,
            mode.is_prediction(),
            buy_date,
            sell_date,
        ))
    }

    // ── Projection ──────────────────────────────────────────────────

    /// Project the price on `date` (00:00 UTC) without computing a return.
    pub async fn project_price(
        &self,
        date: NaiveDate,
        currency: Currency,
    ) -> Result<Projection, CoreError> {
        self.project_price_at(Utc::now(), date, currency).await
    }

    pub async fn project_price_at(
        &self,
        now: DateTime<Utc>,
        date: NaiveDate,
        currency: Currency,
    ) -> Result<Projection, CoreError> {
        if date <= now.date_naive() {
            return Err(CoreError::InvalidProjectionWindow(format!(
                "Projection date {date} must be after today ({})",
                now.date_naive()
            )));
        }
        self.projection_service
            .projected_price(self.source.as_ref(), currency, now, start_of_day(date))
            .await
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
