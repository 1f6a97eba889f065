use crate::errors::CoreError;
use crate::models::investment::ReturnFigures;

/// Turns a buy price, a sell price and an invested amount into return figures.
///
/// All three inputs must be in the same currency. No rounding is applied;
/// formatting is left to the presentation layer.
pub struct ReturnService;

impl ReturnService {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(
        &self,
        buy_price: f64,
        sell_price: f64,
        invested_amount: f64,
    ) -> Result<ReturnFigures, CoreError> {
        if !buy_price.is_finite() || buy_price <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "Buy price must be positive, got {buy_price}"
            )));
        }
        if !sell_price.is_finite() || sell_price < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "Sell price must be non-negative, got {sell_price}"
            )));
        }
        if !invested_amount.is_finite() || invested_amount <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "Invested amount must be positive, got {invested_amount}"
            )));
        }

        let btc_amount = invested_amount / buy_price;
        let value_at_sell = btc_amount * sell_price;
        let roi_absolute = value_at_sell - invested_amount;
        let roi_percent = roi_absolute / invested_amount * 100.0;

        Ok(ReturnFigures {
            btc_amount,
            value_at_sell,
            roi_absolute,
            roi_percent,
        })
    }
}

impl Default for ReturnService {
    fn default() -> Self {
        Self::new()
    }
}
