//! Calendar-date parsing and display helpers.
//!
//! Dates are plain calendar dates: no time of day, no timezone. Input accepts
//! either `dd/mm/yyyy` or `yyyy-mm-dd`; display is always `dd/mm/yyyy`.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer};

use crate::error::{AppError, AppResult};

const DISPLAY_FORMAT: &str = "%d/%m/%Y";
const ISO_FORMAT: &str = "%Y-%m-%d";

/// Placeholder rendered for an absent date
pub const ABSENT: &str = "-";

/// Today's date on the server's local calendar
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Earliest date every store can hold (1 January of year 1)
pub fn earliest() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Parse `dd/mm/yyyy` or `yyyy-mm-dd`
pub fn parse_date(input: &str) -> AppResult<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DISPLAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(input, ISO_FORMAT))
        .map_err(|_| {
            AppError::Validation(format!(
                "Invalid date '{}': use dd/mm/yyyy or yyyy-mm-dd",
                input
            ))
        })
}

pub fn display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format(DISPLAY_FORMAT).to_string(),
        None => ABSENT.to_string(),
    }
}

/// Serde adapter for optional dates in either accepted input format.
/// Blank strings deserialize as `None`.
pub mod flexible {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_date(s)
                .map(Some)
                .map_err(|e| serde::de::Error::custom(e.to_string())),
        }
    }
}
