//! Deferral horizons derived from first-dividend years

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Reason recorded for companies deferred by a first-dividend file.
pub const DEFERRAL_REASON: &str = "UNKNOWN";

/// Reason recorded for companies listed in the disqualified source.
pub const DISQUALIFIED_REASON: &str = "unknown";

/// A company that first paid a dividend in `year` is not considered before
/// January 1st of the following year.
pub fn deferral_horizon(year: i32) -> Result<NaiveDateTime> {
  year
    .checked_add(1)
    .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .ok_or_else(|| Error::InvalidDate(format!("no deferral horizon for year {}", year)))
}
