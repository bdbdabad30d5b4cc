use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

use super::Units;

const MPS_TO_KPH: f32 = 3.6;

#[must_use]
pub fn convert_temp(celsius: f32, units: Units) -> f32 {
    match units {
        Units::Celsius => celsius,
        Units::Fahrenheit => celsius * 1.8 + 32.0,
    }
}

#[must_use]
pub fn round_temp(value: f32) -> i32 {
    value.round() as i32
}

#[must_use]
pub fn mps_to_kph(mps: f32) -> f32 {
    mps * MPS_TO_KPH
}

#[must_use]
pub fn round_wind_speed(kph: f32) -> i32 {
    kph.round() as i32
}

/// Eight-point compass label for a meteorological wind direction.
#[must_use]
pub fn compass_point(degrees: f32) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized + 22.5) / 45.0).floor() as usize % POINTS.len();
    POINTS[index]
}

#[must_use]
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").ok()
}

#[must_use]
pub fn parse_spaced_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").ok()
}

#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[must_use]
pub fn from_unix(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

fn offset(offset_seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_seconds).unwrap_or_else(|| Utc.fix())
}

/// Wall-clock time at a location with the given UTC offset.
#[must_use]
pub fn to_local(timestamp: DateTime<Utc>, offset_seconds: i32) -> NaiveDateTime {
    timestamp.with_timezone(&offset(offset_seconds)).naive_local()
}

#[must_use]
pub fn local_date(timestamp: DateTime<Utc>, offset_seconds: i32) -> NaiveDate {
    to_local(timestamp, offset_seconds).date()
}

/// Inverse of [`to_local`] for providers that report local wall-clock times.
#[must_use]
pub fn local_to_utc(local: NaiveDateTime, offset_seconds: i32) -> DateTime<Utc> {
    local.and_utc() - Duration::seconds(i64::from(offset_seconds))
}

/// Offset implied by a local wall-clock reading and the matching epoch,
/// snapped to the nearest quarter hour.
#[must_use]
pub fn infer_offset_seconds(local: NaiveDateTime, epoch_seconds: i64) -> i32 {
    let raw = local.and_utc().timestamp() - epoch_seconds;
    let snapped = (raw as f64 / 900.0).round() as i64 * 900;
    i32::try_from(snapped).unwrap_or(0)
}
