use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::currency::Currency;

/// When the hypothetical position is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "date")]
pub enum SellMode {
    /// Sell at the current spot price.
    Today,
    /// Sell at a projected price on a future date.
    Future(NaiveDate),
}

impl SellMode {
    pub fn is_prediction(&self) -> bool {
        matches!(self, SellMode::Future(_))
    }
}

/// Raw output of the return calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnFigures {
    pub btc_amount: f64,
    pub value_at_sell: f64,
    pub roi_absolute: f64,
    pub roi_percent: f64,
}

/// Full outcome of one submission, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentResult {
    pub btc_amount: f64,
    pub value_at_sell: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub roi_absolute: f64,
    pub roi_percent: f64,
    pub currency: Currency,
    pub is_prediction: bool,
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
}

impl InvestmentResult {
    pub fn from_figures(
        figures: ReturnFigures,
        buy_price: f64,
        sell_price: f64,
        currency: Currency,
        is_prediction: bool,
        buy_date: NaiveDate,
        sell_date: NaiveDate,
    ) -> Self {
        Self {
            btc_amount: figures.btc_amount,
            value_at_sell: figures.value_at_sell,
            buy_price,
            sell_price,
            roi_absolute: figures.roi_absolute,
            roi_percent: figures.roi_percent,
            currency,
            is_prediction,
            buy_date,
            sell_date,
        }
    }

    pub fn is_gain(&self) -> bool {
        self.roi_absolute >= 0.0
    }
}
