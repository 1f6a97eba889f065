use std::fmt::Write as _;

use btc_whatif_core::models::currency::Currency;
use btc_whatif_core::models::investment::InvestmentResult;
use btc_whatif_core::models::preset::PresetDate;
use btc_whatif_core::models::projection::Projection;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Format `value` with the currency symbol, thousands separators and the
/// currency's usual number of decimals (`$1,234.57`, `¥123,457`, `-$5.00`).
pub fn format_money(value: f64, currency: Currency) -> String {
    let decimals = currency.display_decimals();
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // Avoid printing "-$0.00" for values that round to zero.
    let is_negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if is_negative { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{}{grouped}.{frac}", currency.symbol()),
        None => format!("{sign}{}{grouped}", currency.symbol()),
    }
}

pub fn render_outcome(result: &InvestmentResult, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(outcome_text(result)),
    }
}

fn outcome_text(r: &InvestmentResult) -> String {
    let mut out = String::new();
    let heading = if r.is_prediction { "Estimated Value" } else { "Your Investment" };
    let when = if r.is_prediction {
        format!("on {}", r.sell_date)
    } else {
        "today".to_string()
    };
    let sell_label = if r.is_prediction {
        format!("Predicted ({})", r.sell_date)
    } else {
        "Now".to_string()
    };
    let arrow = if r.is_gain() { '▲' } else { '▼' };

    let _ = writeln!(out, "{heading}: {} {when}", format_money(r.value_at_sell, r.currency));
    let _ = writeln!(out, "You could have bought {:.6} BTC on {}", r.btc_amount, r.buy_date);
    let _ = writeln!(
        out,
        "Buy price: {} -> {sell_label}: {}",
        format_money(r.buy_price, r.currency),
        format_money(r.sell_price, r.currency)
    );
    let _ = writeln!(
        out,
        "{arrow} {} ({:.2}%)",
        format_money(r.roi_absolute, r.currency),
        r.roi_percent
    );
    if r.is_prediction {
        let _ = writeln!(out, "This result uses a prediction for the future BTC price.");
    }
    out
}

pub fn render_projection(projection: &Projection, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(projection)?),
        OutputFormat::Text => Ok(format!(
            "Projected BTC price: {}\nImplied CAGR: {:.2}% over {:.2} years to anchor\n",
            format_money(projection.projected_price, projection.currency),
            projection.cagr * 100.0,
            projection.years_to_anchor
        )),
    }
}

pub fn render_presets(presets: &[PresetDate], format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(presets)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for p in presets {
                let date = p.date().map(|d| d.to_string()).unwrap_or_default();
                let _ = writeln!(out, "{:<15} {date}  {}", p.key, p.label);
            }
            Ok(out)
        }
    }
}
