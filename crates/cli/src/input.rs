use chrono::NaiveDate;

use btc_whatif_core::errors::CoreError;
use btc_whatif_core::models::preset::find_preset;

/// Parse a user-typed amount such as `"1,000.50"`.
///
/// Thousands separators are stripped; what remains must be digits with at
/// most one decimal point.
pub fn parse_amount(raw: &str) -> Result<f64, CoreError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let well_formed = !cleaned.is_empty()
        && cleaned.chars().all(|c| c.is_ascii_digit() || c == '.')
        && cleaned.matches('.').count() <= 1
        && cleaned.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(CoreError::InvalidInput(format!(
            "'{raw}' is not a valid amount (digits, ',' separators and one '.')"
        )));
    }
    let amount: f64 = cleaned
        .parse()
        .map_err(|e| CoreError::InvalidInput(format!("'{raw}' is not a valid amount: {e}")))?;
    if amount <= 0.0 {
        return Err(CoreError::InvalidInput(format!("Amount must be positive, got '{raw}'")));
    }
    Ok(amount)
}

/// Parse `YYYY-MM-DD`, or a preset key like `pizza-day`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    if let Some(preset) = find_preset(raw) {
        return preset.date().ok_or_else(|| {
            CoreError::InvalidInput(format!("Preset '{}' has an invalid date", preset.key))
        });
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        CoreError::InvalidInput(format!("'{raw}' is not a date (YYYY-MM-DD) or preset: {e}"))
    })
}
