//! CLI argument definitions for `whatif`.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `calc` | Compute the return of a past BTC purchase |
//! | `project` | Show the projected BTC price on a future date |
//! | `presets` | List named buy dates |
//!
//! ```bash
//! whatif calc --buy-date pizza-day --amount 1,000
//! whatif calc --buy-date 2020-03-12 --amount 100000 --currency JPY --sell-date 2028-01-01
//! whatif project --date 2027-06-30
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

use btc_whatif_core::models::currency::Currency;

/// What if I had bought Bitcoin back then?
#[derive(Debug, Parser)]
#[command(name = "whatif", author, version, about = "Hypothetical BTC return calculator")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Price API key (overrides WHATIF_API_KEY).
    #[arg(long, global = true, env = "WHATIF_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// HTTP timeout in seconds (overrides WHATIF_TIMEOUT_SECS).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Anchor price target in USD (overrides WHATIF_ANCHOR_PRICE_USD).
    #[arg(long, global = true)]
    pub anchor_price: Option<f64>,

    /// Anchor date, YYYY-MM-DD or RFC 3339 (overrides WHATIF_ANCHOR_DATE).
    #[arg(long, global = true)]
    pub anchor_date: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the outcome of buying BTC on a past date.
    Calc(CalcArgs),
    /// Project the BTC price on a future date.
    Project(ProjectArgs),
    /// List preset buy dates.
    Presets,
}

#[derive(Debug, Args)]
pub struct CalcArgs {
    /// Buy date (YYYY-MM-DD) or preset key (see `whatif presets`).
    #[arg(long)]
    pub buy_date: String,

    /// Invested amount; thousands separators are allowed ("1,000.50").
    #[arg(long)]
    pub amount: String,

    #[arg(long, value_enum, ignore_case = true, default_value_t = CurrencyArg::Usd)]
    pub currency: CurrencyArg,

    /// Sell on this future date using a projected price. Sells today when omitted.
    #[arg(long)]
    pub sell_date: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Future date (YYYY-MM-DD).
    #[arg(long)]
    pub date: String,

    #[arg(long, value_enum, ignore_case = true, default_value_t = CurrencyArg::Usd)]
    pub currency: CurrencyArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum CurrencyArg {
    Usd,
    Jpy,
}

impl From<CurrencyArg> for Currency {
    fn from(value: CurrencyArg) -> Self {
        match value {
            CurrencyArg::Usd => Currency::Usd,
            CurrencyArg::Jpy => Currency::Jpy,
        }
    }
}
