#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use std::fmt::Write as _;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::{
    app::state::AppState,
    domain::weather::{
        DailySummary, ForecastReport, HourlySlot, RefreshMetadata, Units, compass_point,
        convert_temp, derive_label, round_temp, round_wind_speed,
    },
};

/// Cells in a full-height trend bar.
pub const CHART_WIDTH: usize = 20;
const TREND_DAYS: usize = 7;
const MIN_BAR_PERCENT: f32 = 10.0;
const BAR_HEADROOM: f32 = 2.0;
const LABEL_WIDTH: usize = 14;

/// Full text snapshot of the app state, as printed by one-shot and watch mode.
#[must_use]
pub fn render_snapshot(state: &AppState, now: DateTime<Utc>) -> String {
    let Some(report) = state.report.as_ref() else {
        return format!(
            "{}\nNo weather data yet\n{}",
            state.display_name(),
            footer(&state.refresh_meta, now, state.last_error.as_deref())
        );
    };

    let units = state.units;
    let mut out = String::new();
    let _ = writeln!(out, "{}", hero_line(state.display_name(), report, units));

    if !report.hourly.is_empty() {
        let _ = writeln!(out, "\nNext hours");
        for slot in &report.hourly {
            let _ = writeln!(out, "  {}", hourly_row(slot, units));
        }
    }

    if !report.daily.is_empty() {
        let _ = writeln!(out, "\n{}-day forecast", report.daily.len());
        for day in &report.daily {
            let _ = writeln!(out, "  {}", daily_row(day, units));
        }

        let chart = trend_chart(&report.daily, units);
        let _ = writeln!(out, "\nTemperature trend ({} days)", chart.len());
        for row in chart {
            let _ = writeln!(out, "  {row}");
        }
    }

    let _ = write!(
        out,
        "\n{}",
        footer(&state.refresh_meta, now, state.last_error.as_deref())
    );
    out
}

#[must_use]
pub fn hero_line(place: &str, report: &ForecastReport, units: Units) -> String {
    let current = &report.current;
    let sample = &current.sample;
    let mut parts = vec![
        place.to_string(),
        format!("{}°{}", report.current_temp(units), units.suffix()),
        format!("{} {}", current.condition.style().glyph, current.label),
    ];

    if let Some((high, low)) = report.high_low(units) {
        parts.push(format!("H {high}° L {low}°"));
    }
    if let Some(feels) = sample.apparent_temperature_c {
        parts.push(format!("feels {}", degrees(feels, units)));
    }
    if let Some(humidity) = sample.relative_humidity {
        parts.push(format!("humidity {}%", humidity.round() as i32));
    }
    parts.push(format!("wind {}", wind(sample.wind_speed_kph, sample.wind_direction_deg)));
    if let Some(aqi) = report.air_quality {
        parts.push(format!("AQI {} {}", aqi.value, aqi.category.label()));
    }

    parts.join("  |  ")
}

#[must_use]
pub fn hourly_row(slot: &HourlySlot, units: Units) -> String {
    let label = derive_label(slot.condition, slot.forced, None, None);
    format!(
        "{}  {} {:<LABEL_WIDTH$} {:>5}  {:>4}  {}",
        slot.local_time.format("%H:%M"),
        slot.condition.style().glyph,
        label,
        degrees(slot.temperature_c, units),
        percent(slot.precipitation_probability),
        wind(slot.wind_speed_kph, slot.wind_direction_deg),
    )
}

#[must_use]
pub fn daily_row(day: &DailySummary, units: Units) -> String {
    let label = derive_label(day.representative_condition, false, None, None);
    format!(
        "{}  {} {:<LABEL_WIDTH$} {:>5} / {:<5} rain {:>3}%  wind {}",
        day.date.format("%a %d %b"),
        day.representative_condition.style().glyph,
        label,
        degrees(day.max_temp_c, units),
        degrees(day.min_temp_c, units),
        day.chance_of_rain,
        wind(day.max_wind_speed_kph, day.dominant_wind_direction_deg),
    )
}

/// Bar height for `value` on a scale from `lowest - 2` to `highest + 2`,
/// never below 10 percent so cold days stay visible.
#[must_use]
pub fn bar_height_percent(value: f32, lowest: f32, highest: f32) -> f32 {
    let floor = lowest - BAR_HEADROOM;
    let ceiling = highest + BAR_HEADROOM;
    let percent = (value - floor) / (ceiling - floor) * 100.0;
    percent.clamp(MIN_BAR_PERCENT, 100.0)
}

/// One horizontal bar per day for the daily maxima, at most a week.
#[must_use]
pub fn trend_chart(daily: &[DailySummary], units: Units) -> Vec<String> {
    let days = &daily[..daily.len().min(TREND_DAYS)];
    let maxima: Vec<f32> = days
        .iter()
        .map(|day| convert_temp(day.max_temp_c, units))
        .collect();
    let lowest = maxima.iter().copied().fold(f32::INFINITY, f32::min);
    let highest = maxima.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    days.iter()
        .zip(&maxima)
        .map(|(day, &max)| {
            let cells = bar_cells(bar_height_percent(max, lowest, highest));
            format!(
                "{} {:<CHART_WIDTH$} {:>4}°",
                day.date.format("%a"),
                "█".repeat(cells),
                round_temp(max)
            )
        })
        .collect()
}

fn bar_cells(percent: f32) -> usize {
    let cells = (percent / 100.0 * CHART_WIDTH as f32).round() as usize;
    cells.clamp(1, CHART_WIDTH)
}

#[must_use]
pub fn footer(meta: &RefreshMetadata, now: DateTime<Utc>, last_error: Option<&str>) -> String {
    let age = match meta.age_minutes(now) {
        Some(minutes) if minutes <= 0 => "updated just now".to_string(),
        Some(minutes) => format!("updated {minutes} min ago"),
        None => "not updated yet".to_string(),
    };
    let mut line = format!("{age} ({})", meta.state.label());
    if let Some(error) = last_error {
        let _ = write!(line, "  |  last error: {error}");
    }
    line
}

pub fn render_json(report: &ForecastReport) -> anyhow::Result<String> {
    serde_json::to_string_pretty(report).context("serializing forecast report failed")
}

fn degrees(celsius: f32, units: Units) -> String {
    format!("{}°", round_temp(convert_temp(celsius, units)))
}

fn percent(probability: Option<f32>) -> String {
    probability.map_or_else(
        || "-".to_string(),
        |p| format!("{}%", (p * 100.0).round() as i32),
    )
}

fn wind(kph: f32, direction_deg: f32) -> String {
    format!("{} km/h {}", round_wind_speed(kph), compass_point(direction_deg))
}
