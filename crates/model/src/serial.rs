//! Spreadsheet serial dates.
//!
//! A serial date counts days from 1899-12-30, so serial 1 is 1899-12-31 and
//! serial 25569 is the unix epoch. The fractional part is the time of day.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone as _};

const SECONDS_IN_DAY: f64 = 86_400.0;
// Keeps 0.9999999-style float noise from losing a second.
const ROUNDING_GUARD: f64 = 0.000_000_1;

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Wall-clock time the serial encodes, at second resolution.
pub fn serial_to_naive(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    if days.abs() > 3_000_000.0 {
        return None;
    }
    let fraction = serial - days + ROUNDING_GUARD;
    let seconds = (SECONDS_IN_DAY * fraction).floor() as i64;

    epoch()
        .checked_add_signed(Duration::try_days(days as i64)?)?
        .checked_add_signed(Duration::try_seconds(seconds)?)
}

/// Decodes a serial as wall-clock time in the sheet's fixed offset.
pub fn serial_to_datetime(serial: f64, tz: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let naive = serial_to_naive(serial)?;
    tz.from_local_datetime(&naive).single()
}
