use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::currency::Currency;

/// A single quote returned by a price source (amount in `currency` at `as_of`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub amount: f64,
    pub currency: Currency,
    pub as_of: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(amount: f64, currency: Currency, as_of: DateTime<Utc>) -> Self {
        Self {
            amount,
            currency,
            as_of,
        }
    }

    /// A quote is usable only when it is a finite, strictly positive number.
    /// Price APIs report "no data" as a zero price, so zero is rejected too.
    pub fn is_usable(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }
}
