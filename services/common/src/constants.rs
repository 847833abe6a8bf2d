//! Common constants used across all services
//!
//! Single source of truth for time conversion and annualization factors.

// Time constants
/// Milliseconds in one second
pub const MILLIS_PER_SEC: u64 = 1000;
pub const SECS_PER_MIN: u64 = 60;
pub const MINS_PER_HOUR: u64 = 60;
pub const HOURS_PER_DAY: u64 = 24;
pub const MILLIS_PER_MIN: u64 = MILLIS_PER_SEC * SECS_PER_MIN;
pub const MILLIS_PER_HOUR: u64 = MILLIS_PER_MIN * MINS_PER_HOUR;
pub const MILLIS_PER_DAY: u64 = MILLIS_PER_HOUR * HOURS_PER_DAY;

// Annualization constants
/// Calendar days per year, used for theta scaling and expiry conversion
pub const DAYS_PER_YEAR: f64 = 365.0;
/// Trading hours per year for venues that never close
pub const TRADING_HOURS_PER_YEAR: f64 = DAYS_PER_YEAR * 24.0;
