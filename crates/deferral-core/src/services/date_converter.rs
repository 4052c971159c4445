//! Conversion from upstream ISO-8601 timestamps to storage dates

use chrono::NaiveDate;

use deferral_shared::constants::STORAGE_DATE_FORMAT;

/// Converts membership timestamps into the `YYYY-MM-DD` storage format.
///
/// Malformed input yields `None`. Logging is left to the caller.
pub struct DateConverter;

impl DateConverter {
    /// Date portion (first 10 characters) of an ISO-8601 timestamp, validated strictly.
    pub fn from_upstream_timestamp(value: &str) -> Option<NaiveDate> {
        let candidate: String = value.chars().take(10).collect();
        Self::parse_storage_date(&candidate)
    }

    /// Parse a storage date. Rejects anything that does not re-format identically,
    /// so `2024-2-01` and `2024-02-30` both fail.
    pub fn parse_storage_date(value: &str) -> Option<NaiveDate> {
        let date = NaiveDate::parse_from_str(value, STORAGE_DATE_FORMAT).ok()?;
        (Self::to_storage(&date) == value).then_some(date)
    }

    pub fn to_storage(date: &NaiveDate) -> String {
        date.format(STORAGE_DATE_FORMAT).to_string()
    }
}
