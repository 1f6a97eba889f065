use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// The fiat units a calculation can be expressed in.
///
/// Anchor targets are published in USD; JPY values are derived from them
/// with a live USD→JPY rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Jpy,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Usd, Currency::Jpy];

    /// ISO 4217 code, as used in price API query strings.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
        }
    }

    /// Number of fraction digits shown when displaying an amount.
    pub fn display_decimals(&self) -> usize {
        match self {
            Currency::Usd => 2,
            Currency::Jpy => 0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Jpy => "¥",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "JPY" => Ok(Currency::Jpy),
            other => Err(CoreError::InvalidInput(format!(
                "Unsupported currency '{other}': expected USD or JPY"
            ))),
        }
    }
}
