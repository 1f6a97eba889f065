use chrono::NaiveDate;
use serde::Serialize;

/// A well-known buy date offered as a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetDate {
    /// Short key accepted wherever a date is expected (e.g. `pizza-day`).
    pub key: &'static str,
    pub label: &'static str,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl PresetDate {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

pub const PRESET_DATES: [PresetDate; 3] = [
    PresetDate {
        key: "pizza-day",
        label: "Pizza Day (May 22, 2010)",
        year: 2010,
        month: 5,
        day: 22,
    },
    PresetDate {
        key: "covid-crash",
        label: "COVID Crash (Mar 12, 2020)",
        year: 2020,
        month: 3,
        day: 12,
    },
    PresetDate {
        key: "all-time-high",
        label: "All-Time High (Nov 10, 2021)",
        year: 2021,
        month: 11,
        day: 10,
    },
];

/// Look up a preset by key (case-insensitive, `_` and `-` interchangeable).
pub fn find_preset(key: &str) -> Option<&'static PresetDate> {
    let normalized = key.trim().to_lowercase().replace('_', "-");
    PRESET_DATES.iter().find(|p| p.key == normalized)
}
