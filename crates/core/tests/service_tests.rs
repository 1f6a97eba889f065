// ═══════════════════════════════════════════════════════════════════
// Service & Integration Tests — ReturnService, ProjectionService with
// a price source, WhatIfCalculator facade
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use btc_whatif_core::errors::{CoreError, ErrorKind};
use btc_whatif_core::models::currency::Currency;
use btc_whatif_core::models::investment::SellMode;
use btc_whatif_core::models::price::PricePoint;
use btc_whatif_core::models::projection::PriceTarget;
use btc_whatif_core::providers::traits::PriceSource;
use btc_whatif_core::services::projection_service::ProjectionService;
use btc_whatif_core::services::return_service::ReturnService;
use btc_whatif_core::WhatIfCalculator;

// ═══════════════════════════════════════════════════════════════════
// Mock Price Source
// ═══════════════════════════════════════════════════════════════════

#[derive(Default)]
struct MockState {
    /// (currency, date) → historical BTC price
    historical: HashMap<(Currency, NaiveDate), f64>,
    /// currency → spot BTC price
    spot: HashMap<Currency, f64>,
    usd_jpy: Option<f64>,
    /// Log of upstream calls in order, e.g. "historical:USD:2020-03-12"
    calls: Vec<String>,
    fail_with_network: bool,
}

#[derive(Clone, Default)]
struct MockSource {
    state: Arc<Mutex<MockState>>,
}

impl MockSource {
    fn new() -> Self {
        let source = Self::default();
        {
            let mut s = source.state.lock().unwrap();
            s.historical.insert((Currency::Usd, make_date(2020, 3, 12)), 20000.0);
            s.historical.insert((Currency::Jpy, make_date(2020, 3, 12)), 2_100_000.0);
            s.historical.insert((Currency::Usd, make_date(2021, 11, 10)), 68000.0);
            s.spot.insert(Currency::Usd, 60000.0);
            s.spot.insert(Currency::Jpy, 9_000_000.0);
            s.usd_jpy = Some(150.0);
        }
        source
    }

    fn set_usd_jpy(&self, rate: f64) {
        self.state.lock().unwrap().usd_jpy = Some(rate);
    }

    fn set_spot(&self, currency: Currency, price: f64) {
        self.state.lock().unwrap().spot.insert(currency, price);
    }

    fn fail_all(&self) {
        self.state.lock().unwrap().fail_with_network = true;
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn boxed(&self) -> Box<dyn PriceSource> {
        Box::new(self.clone())
    }
}

#[async_trait]
impl PriceSource for MockSource {
    fn name(&self) -> &str {
        "MockSource"
    }

    async fn spot_price(&self, asset: &str, currency: Currency) -> Result<PricePoint, CoreError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("spot:{currency}"));
        if s.fail_with_network {
            return Err(CoreError::Network("connection refused".into()));
        }
        s.spot
            .get(&currency)
            .map(|p| PricePoint::new(*p, currency, fixed_now()))
            .ok_or(CoreError::PriceUnavailable {
                asset: asset.into(),
                currency: currency.to_string(),
                date: "now".into(),
            })
    }

    async fn historical_price(
        &self,
        asset: &str,
        currency: Currency,
        date: NaiveDate,
    ) -> Result<PricePoint, CoreError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("historical:{currency}:{date}"));
        if s.fail_with_network {
            return Err(CoreError::Network("connection refused".into()));
        }
        s.historical
            .get(&(currency, date))
            .map(|p| PricePoint::new(*p, currency, date.and_hms_opt(0, 0, 0).unwrap().and_utc()))
            .ok_or(CoreError::PriceUnavailable {
                asset: asset.into(),
                currency: currency.to_string(),
                date: date.to_string(),
            })
    }

    async fn fx_rate(&self, base: Currency, quote: Currency) -> Result<f64, CoreError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("fx:{base}:{quote}"));
        if s.fail_with_network {
            return Err(CoreError::Network("connection refused".into()));
        }
        match (base, quote) {
            (Currency::Usd, Currency::Jpy) => s.usd_jpy.ok_or(CoreError::PriceUnavailable {
                asset: "USD".into(),
                currency: "JPY".into(),
                date: "now".into(),
            }),
            (b, q) if b == q => Ok(1.0),
            _ => Err(CoreError::Upstream {
                provider: "MockSource".into(),
                message: format!("Unsupported pair {base}/{quote}"),
            }),
        }
    }
}

fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2025-06-15 12:00 UTC — the clock every test runs at.
fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

fn anchor() -> PriceTarget {
    PriceTarget::new(2_400_000.0, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
}

fn calculator(source: &MockSource) -> WhatIfCalculator {
    WhatIfCalculator::with_source(source.boxed(), anchor())
}

fn assert_close(actual: f64, expected: f64) {
    let tolerance = expected.abs().max(1.0) * 1e-9;
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {expected}, got {actual}"
    );
}

// ═══════════════════════════════════════════════════════════════════
// ReturnService
// ═══════════════════════════════════════════════════════════════════

mod return_service {
    use super::*;

    #[test]
    fn computes_quantity_value_and_roi() {
        let figures = ReturnService::new().calculate(20000.0, 60000.0, 1000.0).unwrap();
        assert_close(figures.btc_amount, 0.05);
        assert_close(figures.value_at_sell, 3000.0);
        assert_close(figures.roi_absolute, 2000.0);
        assert_close(figures.roi_percent, 200.0);
    }

    #[test]
    fn loss_gives_negative_roi() {
        let figures = ReturnService::new().calculate(68000.0, 34000.0, 500.0).unwrap();
        assert_close(figures.value_at_sell, 250.0);
        assert_close(figures.roi_absolute, -250.0);
        assert_close(figures.roi_percent, -50.0);
    }

    #[test]
    fn zero_sell_price_is_total_loss() {
        let figures = ReturnService::new().calculate(100.0, 0.0, 10.0).unwrap();
        assert_eq!(figures.value_at_sell, 0.0);
        assert_close(figures.roi_percent, -100.0);
    }

    #[test]
    fn no_rounding_applied() {
        let figures = ReturnService::new().calculate(3.0, 7.0, 1.0).unwrap();
        assert_eq!(figures.btc_amount, 1.0 / 3.0);
    }

    #[test]
    fn zero_buy_price_is_invalid_input() {
        let err = ReturnService::new().calculate(0.0, 60000.0, 1000.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn negative_buy_price_is_invalid_input() {
        let err = ReturnService::new().calculate(-1.0, 60000.0, 1000.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn negative_sell_price_is_invalid_input() {
        let err = ReturnService::new().calculate(1.0, -1.0, 1000.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn non_positive_amount_is_invalid_input() {
        let svc = ReturnService::new();
        assert!(matches!(svc.calculate(1.0, 1.0, 0.0), Err(CoreError::InvalidInput(_))));
        assert!(matches!(svc.calculate(1.0, 1.0, -5.0), Err(CoreError::InvalidInput(_))));
        assert!(matches!(svc.calculate(1.0, 1.0, f64::NAN), Err(CoreError::InvalidInput(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
// ProjectionService — with a price source
// ═══════════════════════════════════════════════════════════════════

mod projection_service {
    use super::*;

    #[tokio::test]
    async fn usd_projection_skips_fx_lookup() {
        let source = MockSource::new();
        let svc = ProjectionService::new(anchor());
        let target = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();

        let projection = svc
            .projected_price(&source, Currency::Usd, fixed_now(), target)
            .await
            .unwrap();

        assert!(projection.projected_price > 60000.0);
        assert!(projection.projected_price < 2_400_000.0);
        assert_eq!(source.calls(), vec!["spot:USD"]);
    }

    #[tokio::test]
    async fn jpy_projection_converts_anchor_with_live_rate() {
        let source = MockSource::new();
        let svc = ProjectionService::new(anchor());
        let anchor_time = anchor().anchor_time;

        let projection = svc
            .projected_price(&source, Currency::Jpy, fixed_now(), anchor_time)
            .await
            .unwrap();

        // At the anchor date the projection lands on the converted target.
        assert_close(projection.projected_price, 2_400_000.0 * 150.0);
        assert_eq!(projection.currency, Currency::Jpy);
        assert_eq!(source.calls(), vec!["spot:JPY", "fx:USD:JPY"]);
    }

    #[tokio::test]
    async fn changing_fx_rate_changes_jpy_projection() {
        let source = MockSource::new();
        let svc = ProjectionService::new(anchor());
        let target = Utc.with_ymd_and_hms(2028, 6, 1, 0, 0, 0).unwrap();

        source.set_usd_jpy(150.0);
        let first = svc
            .projected_price(&source, Currency::Jpy, fixed_now(), target)
            .await
            .unwrap();

        source.set_usd_jpy(100.0);
        let second = svc
            .projected_price(&source, Currency::Jpy, fixed_now(), target)
            .await
            .unwrap();

        assert!(first.projected_price > second.projected_price);
        // The rate is fetched on every call, never reused.
        let fx_calls = source.calls().iter().filter(|c| c.starts_with("fx:")).count();
        assert_eq!(fx_calls, 2);
    }

    #[tokio::test]
    async fn proportional_when_spot_and_anchor_scale_together() {
        // Doubling both the JPY spot and the USD/JPY rate doubles the projection.
        let source = MockSource::new();
        let svc = ProjectionService::new(anchor());
        let target = Utc.with_ymd_and_hms(2028, 6, 1, 0, 0, 0).unwrap();

        let base = svc
            .projected_price(&source, Currency::Jpy, fixed_now(), target)
            .await
            .unwrap();

        source.set_usd_jpy(300.0);
        source.set_spot(Currency::Jpy, 18_000_000.0);
        let doubled = svc
            .projected_price(&source, Currency::Jpy, fixed_now(), target)
            .await
            .unwrap();

        assert_close(doubled.projected_price, base.projected_price * 2.0);
        assert_close(doubled.cagr, base.cagr);
    }

    #[tokio::test]
    async fn past_target_rejected_before_any_fetch() {
        let source = MockSource::new();
        let svc = ProjectionService::new(anchor());
        let past = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let err = svc
            .projected_price(&source, Currency::Usd, fixed_now(), past)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidProjectionWindow);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn expired_anchor_is_projection_window_error() {
        let source = MockSource::new();
        let stale = PriceTarget::new(100_000.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let svc = ProjectionService::new(stale);
        let target = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();

        let err = svc
            .projected_price(&source, Currency::Usd, fixed_now(), target)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidProjectionWindow(_)));
    }

    #[tokio::test]
    async fn missing_fx_rate_propagates() {
        let source = MockSource::new();
        source.state.lock().unwrap().usd_jpy = None;
        let svc = ProjectionService::new(anchor());
        let target = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();

        let err = svc
            .projected_price(&source, Currency::Jpy, fixed_now(), target)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PriceUnavailable);
    }

    #[tokio::test]
    async fn non_positive_fx_rate_is_unavailable() {
        let source = MockSource::new();
        source.set_usd_jpy(0.0);
        let svc = ProjectionService::new(anchor());

        let err = svc.anchor_price_in(&source, Currency::Jpy).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PriceUnavailable);
    }
}

// ═══════════════════════════════════════════════════════════════════
// WhatIfCalculator — compute_outcome
// ═══════════════════════════════════════════════════════════════════

mod compute_outcome {
    use super::*;

    #[tokio::test]
    async fn today_mode_uses_spot_price() {
        let source = MockSource::new();
        let calc = calculator(&source);

        let result = calc
            .compute_outcome_at(fixed_now(), make_date(2020, 3, 12), 1000.0, Currency::Usd, SellMode::Today)
            .await
            .unwrap();

        assert_close(result.btc_amount, 0.05);
        assert_close(result.value_at_sell, 3000.0);
        assert_close(result.roi_absolute, 2000.0);
        assert_close(result.roi_percent, 200.0);
        assert_eq!(result.buy_price, 20000.0);
        assert_eq!(result.sell_price, 60000.0);
        assert!(!result.is_prediction);
        assert_eq!(result.sell_date, make_date(2025, 6, 15));
        assert_eq!(result.buy_date, make_date(2020, 3, 12));
        assert_eq!(result.currency, Currency::Usd);
        assert!(result.is_gain());
    }

    #[tokio::test]
    async fn today_mode_calls_historical_then_spot() {
        let source = MockSource::new();
        let calc = calculator(&source);

        calc.compute_outcome_at(fixed_now(), make_date(2020, 3, 12), 1000.0, Currency::Jpy, SellMode::Today)
            .await
            .unwrap();

        assert_eq!(source.calls(), vec!["historical:JPY:2020-03-12", "spot:JPY"]);
    }

    #[tokio::test]
    async fn future_mode_uses_projection() {
        let source = MockSource::new();
        let calc = calculator(&source);
        let sell = make_date(2030, 1, 1);

        let result = calc
            .compute_outcome_at(fixed_now(), make_date(2020, 3, 12), 1000.0, Currency::Usd, SellMode::Future(sell))
            .await
            .unwrap();

        assert!(result.is_prediction);
        assert_eq!(result.sell_date, sell);
        // Selling exactly at the anchor yields the anchor price.
        assert_close(result.sell_price, 2_400_000.0);
        assert_close(result.value_at_sell, 0.05 * 2_400_000.0);
    }

    #[tokio::test]
    async fn future_mode_jpy_makes_three_calls_in_order() {
        let source = MockSource::new();
        let calc = calculator(&source);

        calc.compute_outcome_at(
            fixed_now(),
            make_date(2020, 3, 12),
            100_000.0,
            Currency::Jpy,
            SellMode::Future(make_date(2027, 1, 1)),
        )
        .await
        .unwrap();

        assert_eq!(
            source.calls(),
            vec!["historical:JPY:2020-03-12", "spot:JPY", "fx:USD:JPY"]
        );
    }

    #[tokio::test]
    async fn future_date_today_is_rejected() {
        let source = MockSource::new();
        let calc = calculator(&source);

        let err = calc
            .compute_outcome_at(
                fixed_now(),
                make_date(2020, 3, 12),
                1000.0,
                Currency::Usd,
                SellMode::Future(make_date(2025, 6, 15)),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidProjectionWindow);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn future_date_in_past_is_rejected() {
        let source = MockSource::new();
        let calc = calculator(&source);

        let err = calc
            .compute_outcome_at(
                fixed_now(),
                make_date(2020, 3, 12),
                1000.0,
                Currency::Usd,
                SellMode::Future(make_date(2024, 1, 1)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidProjectionWindow(_)));
    }

    #[tokio::test]
    async fn buy_date_in_future_is_invalid_input() {
        let source = MockSource::new();
        let calc = calculator(&source);

        let err = calc
            .compute_outcome_at(fixed_now(), make_date(2026, 1, 1), 1000.0, Currency::Usd, SellMode::Today)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn zero_amount_is_invalid_input() {
        let source = MockSource::new();
        let calc = calculator(&source);

        let err = calc
            .compute_outcome_at(fixed_now(), make_date(2020, 3, 12), 0.0, Currency::Usd, SellMode::Today)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_historical_price_is_unavailable() {
        let source = MockSource::new();
        let calc = calculator(&source);

        let err = calc
            .compute_outcome_at(fixed_now(), make_date(2010, 5, 22), 1000.0, Currency::Usd, SellMode::Today)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PriceUnavailable);
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Price not available for BTC in USD on 2010-05-22"
        );
    }

    #[tokio::test]
    async fn zero_spot_in_today_mode_is_unavailable() {
        let source = MockSource::new();
        source.set_spot(Currency::Usd, 0.0);
        let calc = calculator(&source);

        let err = calc
            .compute_outcome_at(fixed_now(), make_date(2020, 3, 12), 1000.0, Currency::Usd, SellMode::Today)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PriceUnavailable);
        assert_eq!(
            err.to_string(),
            "Price not available for BTC in USD on 2025-06-15"
        );
    }

    #[tokio::test]
    async fn nan_spot_in_today_mode_is_unavailable() {
        let source = MockSource::new();
        source.set_spot(Currency::Jpy, f64::NAN);
        let calc = calculator(&source);

        let err = calc
            .compute_outcome_at(fixed_now(), make_date(2020, 3, 12), 100_000.0, Currency::Jpy, SellMode::Today)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PriceUnavailable);
    }

    #[tokio::test]
    async fn network_failure_is_retryable_upstream_error() {
        let source = MockSource::new();
        source.fail_all();
        let calc = calculator(&source);

        let err = calc
            .compute_outcome_at(fixed_now(), make_date(2020, 3, 12), 1000.0, Currency::Usd, SellMode::Today)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert!(err.is_retryable());
        // Failure stops the chain; nothing is retried.
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn loss_scenario_from_all_time_high() {
        let source = MockSource::new();
        source.set_spot(Currency::Usd, 34000.0);
        let calc = calculator(&source);

        let result = calc
            .compute_outcome_at(fixed_now(), make_date(2021, 11, 10), 1000.0, Currency::Usd, SellMode::Today)
            .await
            .unwrap();

        assert_close(result.roi_percent, -50.0);
        assert!(!result.is_gain());
    }

    #[tokio::test]
    async fn project_price_at_reports_cagr() {
        let source = MockSource::new();
        let calc = calculator(&source);

        let projection = calc
            .project_price_at(fixed_now(), make_date(2027, 1, 1), Currency::Usd)
            .await
            .unwrap();

        assert!(projection.cagr > 0.0);
        assert!(projection.years_to_target < projection.years_to_anchor);
    }

    #[tokio::test]
    async fn project_price_at_rejects_today() {
        let source = MockSource::new();
        let calc = calculator(&source);

        let err = calc
            .project_price_at(fixed_now(), make_date(2025, 6, 15), Currency::Usd)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidProjectionWindow);
    }

    #[test]
    fn debug_shows_source_and_anchor() {
        let source = MockSource::new();
        let calc = calculator(&source);
        let dbg = format!("{calc:?}");
        assert!(dbg.contains("MockSource"));
        assert!(dbg.contains("2400000"));
        assert_eq!(calc.source_name(), "MockSource");
        assert_eq!(calc.anchor(), &anchor());
    }
}
