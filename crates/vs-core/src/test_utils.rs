//! Helpers shared by tests across the workspace

use chrono::{NaiveDate, NaiveDateTime};

/// Default tolerance for floating-point comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Assert that two floating-point numbers are approximately equal
pub fn assert_approx_eq(actual: f64, expected: f64, tolerance: f64) {
  assert!(
    (actual - expected).abs() < tolerance,
    "Values not approximately equal:\n  actual:   {}\n  expected: {}\n  diff:     {}\n  tolerance: {}",
    actual,
    expected,
    (actual - expected).abs(),
    tolerance
  );
}

/// Midnight of the given calendar day
pub fn instant(year: i32, month: u32, day: u32) -> NaiveDateTime {
  NaiveDate::from_ymd_opt(year, month, day)
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .unwrap_or_else(|| panic!("invalid test date {}-{}-{}", year, month, day))
}
