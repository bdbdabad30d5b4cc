//! Daily "worst case wins" aggregation.

use std::{borrow::Borrow, collections::BTreeMap};

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    domain::weather::{DailyHint, DailySummary, RawSample, SkyCondition, local_date},
    engine::{
        precipitation::precipitation_kind,
        severity::{daily_severity, resolve_primary_code},
        table::ConditionTable,
    },
};

/// A day whose worst bucket is milder than rain gets re-checked against this.
pub const DAILY_POP_THRESHOLD: f32 = 0.40;
/// Daily severity from which a day already counts as wet.
pub const DAILY_PRECIPITATION_SEVERITY: u8 = 70;

/// Collapses one local day of samples into a summary.
///
/// # Panics
///
/// When `samples` is empty. Every grouped day holds at least one sample, so
/// an empty slice is a caller bug.
#[must_use]
pub fn aggregate_day<S: Borrow<RawSample>>(
    table: &dyn ConditionTable,
    date: NaiveDate,
    samples: &[S],
    hint: Option<&DailyHint>,
) -> DailySummary {
    assert!(!samples.is_empty(), "aggregate_day needs at least one sample for {date}");

    let first = samples[0].borrow();
    let mut max_temp = first.temperature_c;
    let mut min_temp = first.temperature_c;
    let mut max_feels_like: Option<f32> = None;
    let mut max_wind = first.wind_speed_kph;
    let mut wind_direction = first.wind_direction_deg;
    let mut max_pop: Option<f32> = None;
    let mut worst: Option<(SkyCondition, u8)> = None;

    for sample in samples.iter().map(Borrow::borrow) {
        max_temp = max_temp.max(sample.temperature_c);
        min_temp = min_temp.min(sample.temperature_c);

        if let Some(feels) = sample.apparent_temperature_c {
            max_feels_like = Some(max_feels_like.map_or(feels, |current| current.max(feels)));
        }

        if sample.wind_speed_kph > max_wind {
            max_wind = sample.wind_speed_kph;
            wind_direction = sample.wind_direction_deg;
        }

        if let Some(pop) = sample.precipitation_probability {
            max_pop = Some(max_pop.map_or(pop, |current| current.max(pop)));
        }

        let code = resolve_primary_code(
            table,
            sample.condition_code,
            &sample.secondary_condition_codes,
        );
        let condition = table.normalize(code);
        let weight = daily_severity(condition);
        if worst.is_none_or(|(best_condition, best)| {
            (weight, condition) > (best, best_condition)
        }) {
            worst = Some((condition, weight));
        }
    }

    let (mut condition, severity) = worst.unwrap_or((table.normalize(first.condition_code), 0));

    if severity < DAILY_PRECIPITATION_SEVERITY {
        let forced = match hint.and_then(|hint| hint.will_rain) {
            Some(true) => Some(precipitation_kind(max_temp)),
            Some(false) => None,
            None => samples
                .iter()
                .map(Borrow::borrow)
                .find(|sample| {
                    sample
                        .precipitation_probability
                        .is_some_and(|pop| pop > DAILY_POP_THRESHOLD)
                })
                .map(|sample| precipitation_kind(sample.temperature_c)),
        };
        if let Some(forced) = forced {
            debug!(%date, from = ?condition, to = ?forced, "daily precipitation re-check");
            condition = forced;
        }
    }

    let chance_of_rain = hint
        .and_then(|hint| hint.chance_of_rain)
        .or_else(|| max_pop.map(probability_percent))
        .unwrap_or(0);

    DailySummary {
        date,
        max_temp_c: max_temp,
        min_temp_c: min_temp,
        representative_condition: condition,
        max_feels_like_c: max_feels_like.unwrap_or(max_temp),
        max_wind_speed_kph: max_wind,
        dominant_wind_direction_deg: wind_direction,
        chance_of_rain,
    }
}

fn probability_percent(pop: f32) -> u8 {
    (pop.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Buckets samples by local calendar date, keeping each day's input order.
#[must_use]
pub fn group_by_local_date(
    samples: &[RawSample],
    utc_offset_seconds: i32,
) -> BTreeMap<NaiveDate, Vec<&RawSample>> {
    let mut days: BTreeMap<NaiveDate, Vec<&RawSample>> = BTreeMap::new();
    for sample in samples {
        days.entry(local_date(sample.timestamp_utc, utc_offset_seconds))
            .or_default()
            .push(sample);
    }
    days
}

/// Chronological daily summaries, first = earliest local date, at most `limit`.
#[must_use]
pub fn aggregate_days(
    table: &dyn ConditionTable,
    samples: &[RawSample],
    hints: &[DailyHint],
    utc_offset_seconds: i32,
    limit: usize,
) -> Vec<DailySummary> {
    group_by_local_date(samples, utc_offset_seconds)
        .into_iter()
        .take(limit)
        .map(|(date, day)| {
            let hint = hints.iter().find(|hint| hint.date == date);
            aggregate_day(table, date, &day, hint)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::engine::table::{OPEN_METEO, OPEN_WEATHER_MAP};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 12, 0, 0, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 12).unwrap()
    }

    fn bucket(hour: i64, temp: f32, code: i32) -> RawSample {
        RawSample::new(start() + Duration::hours(hour), temp, code)
    }

    #[test]
    fn one_stormy_bucket_decides_the_day() {
        let samples = [
            bucket(0, 18.0, 800),
            bucket(3, 19.0, 800),
            bucket(6, 20.0, 211),
            bucket(9, 17.0, 800),
        ];
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &samples, None);
        assert_eq!(summary.max_temp_c, 20.0);
        assert_eq!(summary.min_temp_c, 17.0);
        assert_eq!(summary.representative_condition, SkyCondition::Thunderstorm);
        assert_eq!(summary.chance_of_rain, 0);
    }

    #[test]
    fn drizzle_outranks_fog_across_a_day() {
        let samples = [bucket(0, 8.0, 701), bucket(3, 9.0, 300)];
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &samples, None);
        assert_eq!(summary.representative_condition, SkyCondition::Drizzle);
    }

    #[test]
    fn overcast_outranks_partly_cloudy_at_equal_weight() {
        let samples = [bucket(0, 8.0, 801), bucket(3, 9.0, 804), bucket(6, 9.0, 804)];
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &samples, None);
        assert_eq!(summary.representative_condition, SkyCondition::Cloudy);

        let reversed = [bucket(0, 8.0, 804), bucket(3, 9.0, 801)];
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &reversed, None);
        assert_eq!(summary.representative_condition, SkyCondition::Cloudy);
    }

    #[test]
    fn probable_rain_upgrades_a_dry_day() {
        let mut wet = bucket(3, 14.0, 803);
        wet.precipitation_probability = Some(0.5);
        let samples = [bucket(0, 12.0, 800), wet];
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &samples, None);
        assert_eq!(summary.representative_condition, SkyCondition::Rain);
        assert_eq!(summary.chance_of_rain, 50);
    }

    #[test]
    fn probable_precipitation_below_freezing_is_snow() {
        let mut cold = bucket(3, -4.0, 803);
        cold.precipitation_probability = Some(0.5);
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &[cold], None);
        assert_eq!(summary.representative_condition, SkyCondition::Snow);
    }

    #[test]
    fn daily_threshold_is_stricter_than_hourly() {
        let mut maybe = bucket(0, 14.0, 804);
        maybe.precipitation_probability = Some(0.40);
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &[maybe], None);
        assert_eq!(summary.representative_condition, SkyCondition::Cloudy);
        assert_eq!(summary.chance_of_rain, 40);
    }

    #[test]
    fn drizzle_days_are_not_rechecked() {
        let mut damp = bucket(0, 10.0, 300);
        damp.precipitation_probability = Some(0.9);
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &[damp], None);
        assert_eq!(summary.representative_condition, SkyCondition::Drizzle);
    }

    #[test]
    fn provider_daily_hint_is_preferred() {
        let mut likely = bucket(0, 15.0, 3);
        likely.precipitation_probability = Some(0.9);
        let hint = DailyHint {
            date: date(),
            chance_of_rain: Some(12),
            will_rain: Some(false),
        };
        let summary = aggregate_day(&OPEN_METEO, date(), &[likely.clone()], Some(&hint));
        assert_eq!(summary.chance_of_rain, 12);
        assert_eq!(summary.representative_condition, SkyCondition::Cloudy);

        let wet_hint = DailyHint {
            will_rain: Some(true),
            ..hint
        };
        let summary = aggregate_day(&OPEN_METEO, date(), &[bucket(0, 15.0, 0)], Some(&wet_hint));
        assert_eq!(summary.representative_condition, SkyCondition::Rain);
    }

    #[test]
    fn wind_direction_follows_first_strongest_bucket() {
        let mut calm = bucket(0, 10.0, 800);
        calm.wind_speed_kph = 5.0;
        calm.wind_direction_deg = 90.0;
        let mut gusty = bucket(3, 10.0, 800);
        gusty.wind_speed_kph = 30.0;
        gusty.wind_direction_deg = 270.0;
        let mut equal = bucket(6, 10.0, 800);
        equal.wind_speed_kph = 30.0;
        equal.wind_direction_deg = 180.0;

        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &[calm, gusty, equal], None);
        assert_eq!(summary.max_wind_speed_kph, 30.0);
        assert_eq!(summary.dominant_wind_direction_deg, 270.0);
    }

    #[test]
    fn feels_like_falls_back_to_max_temp() {
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &[bucket(0, 21.0, 800)], None);
        assert_eq!(summary.max_feels_like_c, 21.0);

        let mut humid = bucket(0, 21.0, 800);
        humid.apparent_temperature_c = Some(24.5);
        let summary = aggregate_day(&OPEN_WEATHER_MAP, date(), &[humid], None);
        assert_eq!(summary.max_feels_like_c, 24.5);
    }

    #[test]
    #[should_panic(expected = "at least one sample")]
    fn empty_day_is_a_contract_violation() {
        let empty: [RawSample; 0] = [];
        let _ = aggregate_day(&OPEN_WEATHER_MAP, date(), &empty, None);
    }

    #[test]
    fn days_split_on_local_midnight() {
        let samples: Vec<RawSample> = (0..16).map(|i| bucket(i * 3, 10.0, 800)).collect();
        let days = aggregate_days(&OPEN_WEATHER_MAP, &samples, &[], -5 * 3600, 7);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 2, 11).unwrap());
        assert!(days.windows(2).all(|pair| pair[0].date < pair[1].date));

        let capped = aggregate_days(&OPEN_WEATHER_MAP, &samples, &[], -5 * 3600, 2);
        assert_eq!(capped.len(), 2);
    }
}
