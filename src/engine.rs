//! Weather normalization and aggregation.
//!
//! Pure functions only: a [`ProviderSnapshot`] goes in, a display-ready
//! [`ForecastReport`] comes out. Nothing here does I/O or reads the clock.

pub mod aggregate;
pub mod precipitation;
pub mod severity;
pub mod table;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::weather::{
    CurrentConditions, ForecastReport, HourlySlot, ProviderSnapshot, RawSample, derive_label,
    derive_theme, to_local,
};
use aggregate::aggregate_days;
use precipitation::{
    HOURLY_POP_THRESHOLD, OverrideReason, apply_precipitation_override,
    apply_precipitation_override_with,
};
use severity::resolve_primary_code;
use table::ConditionTable;

/// The hourly strip covers this many hours from its first slot.
pub const HOURLY_WINDOW_HOURS: i64 = 24;

/// Resolves "now": multi-condition severity, then normalization, then the
/// precipitation override, then label and theme.
#[must_use]
pub fn resolve_current(
    table: &dyn ConditionTable,
    sample: &RawSample,
    provider_text: Option<&str>,
) -> CurrentConditions {
    let code = resolve_primary_code(
        table,
        sample.condition_code,
        &sample.secondary_condition_codes,
    );
    let base = table.normalize(code);
    let resolution = apply_precipitation_override(sample, base);

    if resolution.reason != OverrideReason::None {
        debug!(
            table = table.name(),
            code,
            from = ?base,
            to = ?resolution.condition,
            reason = ?resolution.reason,
            "current condition overridden"
        );
    }

    let intensity = match resolution.reason {
        OverrideReason::None => table.rain_intensity(code),
        OverrideReason::Measured | OverrideReason::Predicted => None,
    };
    let text = if table.recognizes(code) {
        None
    } else {
        provider_text
    };

    CurrentConditions {
        sample: sample.clone(),
        condition: resolution.condition,
        override_reason: resolution.reason,
        label: derive_label(resolution.condition, resolution.forced(), intensity, text),
        theme: derive_theme(resolution.condition, sample.is_daytime),
    }
}

#[must_use]
pub fn resolve_hourly(
    table: &dyn ConditionTable,
    sample: &RawSample,
    utc_offset_seconds: i32,
) -> HourlySlot {
    let code = resolve_primary_code(
        table,
        sample.condition_code,
        &sample.secondary_condition_codes,
    );
    let resolution =
        apply_precipitation_override_with(sample, table.normalize(code), HOURLY_POP_THRESHOLD);

    HourlySlot {
        timestamp_utc: sample.timestamp_utc,
        local_time: to_local(sample.timestamp_utc, utc_offset_seconds),
        temperature_c: sample.temperature_c,
        condition: resolution.condition,
        forced: resolution.forced(),
        precipitation_probability: sample.precipitation_probability,
        wind_speed_kph: sample.wind_speed_kph,
        wind_direction_deg: sample.wind_direction_deg,
        is_daytime: sample.is_daytime,
    }
}

/// Slots from the hour containing `now` through [`HOURLY_WINDOW_HOURS`] later.
#[must_use]
pub fn hourly_strip(
    table: &dyn ConditionTable,
    samples: &[RawSample],
    utc_offset_seconds: i32,
    now: DateTime<Utc>,
) -> Vec<HourlySlot> {
    let mut upcoming = samples
        .iter()
        .filter(|sample| sample.timestamp_utc + Duration::hours(1) > now)
        .peekable();
    let Some(first) = upcoming.peek().map(|sample| sample.timestamp_utc) else {
        return Vec::new();
    };
    let end = first + Duration::hours(HOURLY_WINDOW_HOURS);

    upcoming
        .take_while(|sample| sample.timestamp_utc < end)
        .map(|sample| resolve_hourly(table, sample, utc_offset_seconds))
        .collect()
}

/// Full pipeline for one provider fetch.
#[must_use]
pub fn build_report(
    table: &dyn ConditionTable,
    snapshot: &ProviderSnapshot,
    now: DateTime<Utc>,
) -> ForecastReport {
    let current = resolve_current(table, &snapshot.current, snapshot.current_text.as_deref());
    let hourly = hourly_strip(table, &snapshot.hourly, snapshot.utc_offset_seconds, now);
    let daily = aggregate_days(
        table,
        &snapshot.hourly,
        &snapshot.daily_hints,
        snapshot.utc_offset_seconds,
        snapshot.forecast_days,
    );

    debug!(
        table = table.name(),
        condition = ?current.condition,
        hourly = hourly.len(),
        daily = daily.len(),
        "report built"
    );

    ForecastReport {
        place_name: snapshot.place_name.clone(),
        utc_offset_seconds: snapshot.utc_offset_seconds,
        current,
        hourly,
        daily,
        air_quality: snapshot.air_quality,
        generated_at: now,
    }
}
