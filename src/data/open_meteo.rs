use anyhow::{Context, Result};
use chrono::{DateTime, Timelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{column, http_client};
use crate::domain::{
    air_quality::{AirQualityIndex, AirQualityScale},
    weather::{
        DailyHint, Location, ProviderSnapshot, RawSample, local_to_utc, parse_date, parse_datetime,
    },
};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";
const FORECAST_DAYS: usize = 7;

/// Open-Meteo adapter: WMO codes, hourly columns in local time, probability in percent.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    air_quality_url: String,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_base_url(FORECAST_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(10),
            base_url: base_url.into(),
            air_quality_url: AIR_QUALITY_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_air_quality_url(mut self, url: impl Into<String>) -> Self {
        self.air_quality_url = url.into();
        self
    }

    pub async fn fetch(&self, location: &Location) -> Result<ProviderSnapshot> {
        let (forecast, air_quality) =
            futures::join!(self.fetch_forecast(location), self.fetch_air_quality(location));

        let payload = forecast?;
        let air_quality = match air_quality {
            Ok(aqi) => aqi,
            Err(err) => {
                warn!(error = %err, "air quality unavailable");
                None
            }
        };

        let snapshot = to_snapshot(payload, air_quality)?;
        debug!(
            hourly = snapshot.hourly.len(),
            offset = snapshot.utc_offset_seconds,
            "open-meteo forecast parsed"
        );
        Ok(snapshot)
    }

    async fn fetch_forecast(&self, location: &Location) -> Result<ForecastResponse> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,precipitation,wind_speed_10m,wind_direction_10m,is_day"
                        .to_string(),
                ),
                (
                    "hourly",
                    "temperature_2m,apparent_temperature,relative_humidity_2m,weather_code,precipitation_probability,precipitation,wind_speed_10m,wind_direction_10m,is_day"
                        .to_string(),
                ),
                ("daily", "precipitation_probability_max".to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ])
            .send()
            .await
            .context("forecast request failed")?
            .error_for_status()
            .context("forecast request returned non-success status")?;

        response
            .json()
            .await
            .context("failed to parse forecast payload")
    }

    async fn fetch_air_quality(&self, location: &Location) -> Result<Option<AirQualityIndex>> {
        let response = self
            .client
            .get(&self.air_quality_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current", "us_aqi".to_string()),
            ])
            .send()
            .await
            .context("air quality request failed")?
            .error_for_status()
            .context("air quality request returned non-success status")?;

        let payload: AirQualityResponse = response
            .json()
            .await
            .context("failed to parse air quality payload")?;

        Ok(payload
            .current
            .us_aqi
            .and_then(|value| AirQualityIndex::from_reading(value, AirQualityScale::UsAqi)))
    }
}

fn to_snapshot(
    payload: ForecastResponse,
    air_quality: Option<AirQualityIndex>,
) -> Result<ProviderSnapshot> {
    let offset = payload.utc_offset_seconds;
    let hourly = parse_hourly(&payload.hourly, offset);
    let current_time = parse_datetime(&payload.current.time)
        .map(|local| local_to_utc(local, offset))
        .context("forecast payload has an unreadable current time")?;

    let mut current = RawSample::new(
        current_time,
        payload.current.temperature_2m,
        payload.current.weather_code,
    );
    current.apparent_temperature_c = payload.current.apparent_temperature;
    current.relative_humidity = payload.current.relative_humidity_2m;
    current.precipitation_volume_mm = payload.current.precipitation;
    current.precipitation_probability = probability_for_hour(&hourly, current_time);
    current.wind_speed_kph = payload.current.wind_speed_10m.unwrap_or_default();
    current.wind_direction_deg = payload.current.wind_direction_10m.unwrap_or_default();
    current.is_daytime = payload.current.is_day == 1;

    Ok(ProviderSnapshot {
        place_name: None,
        utc_offset_seconds: offset,
        current,
        current_text: None,
        hourly,
        daily_hints: parse_daily(&payload.daily),
        forecast_days: FORECAST_DAYS,
        air_quality,
    })
}

/// Current readings carry no probability; borrow it from the hourly slot
/// covering the same hour.
fn probability_for_hour(hourly: &[RawSample], at: DateTime<Utc>) -> Option<f32> {
    let hour = at
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))?;
    hourly
        .iter()
        .find(|sample| sample.timestamp_utc == hour)
        .and_then(|sample| sample.precipitation_probability)
}

fn parse_hourly(hourly: &HourlyBlock, offset: i32) -> Vec<RawSample> {
    let mut out = Vec::with_capacity(hourly.time.len());
    for (idx, raw_time) in hourly.time.iter().enumerate() {
        let Some(time) = parse_datetime(raw_time) else {
            continue;
        };
        let (Some(temperature), Some(code)) = (
            column(&hourly.temperature_2m, idx),
            column(&hourly.weather_code, idx),
        ) else {
            continue;
        };

        let mut sample = RawSample::new(local_to_utc(time, offset), temperature, code);
        sample.apparent_temperature_c = column(&hourly.apparent_temperature, idx);
        sample.relative_humidity = column(&hourly.relative_humidity_2m, idx);
        sample.precipitation_probability =
            column(&hourly.precipitation_probability, idx).map(|percent| percent / 100.0);
        sample.precipitation_volume_mm = column(&hourly.precipitation, idx);
        sample.wind_speed_kph = column(&hourly.wind_speed_10m, idx).unwrap_or_default();
        sample.wind_direction_deg = column(&hourly.wind_direction_10m, idx).unwrap_or_default();
        sample.is_daytime = column(&hourly.is_day, idx).is_none_or(|flag| flag == 1);
        out.push(sample);
    }
    out
}

fn parse_daily(daily: &DailyBlock) -> Vec<DailyHint> {
    daily
        .time
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let date = parse_date(raw)?;
            Some(DailyHint {
                date,
                chance_of_rain: column(&daily.precipitation_probability_max, idx)
                    .map(|percent| percent.clamp(0.0, 100.0).round() as u8),
                will_rain: None,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    current: CurrentBlock,
    hourly: HourlyBlock,
    #[serde(default)]
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f32,
    relative_humidity_2m: Option<f32>,
    apparent_temperature: Option<f32>,
    weather_code: i32,
    precipitation: Option<f32>,
    wind_speed_10m: Option<f32>,
    wind_direction_10m: Option<f32>,
    #[serde(default)]
    is_day: u8,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<Option<f32>>,
    #[serde(default)]
    apparent_temperature: Vec<Option<f32>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f32>>,
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f32>>,
    #[serde(default)]
    precipitation: Vec<Option<f32>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f32>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f32>>,
    #[serde(default)]
    is_day: Vec<Option<u8>>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f32>>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: AirQualityBlock,
}

#[derive(Debug, Deserialize)]
struct AirQualityBlock {
    us_aqi: Option<f32>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn hourly_block() -> HourlyBlock {
        HourlyBlock {
            time: vec![
                "bad".to_string(),
                "2026-02-12T10:00".to_string(),
                "2026-02-12T11:00".to_string(),
            ],
            temperature_2m: vec![Some(1.0), Some(2.0), None],
            apparent_temperature: vec![],
            relative_humidity_2m: vec![Some(50.0), Some(60.0), Some(70.0)],
            weather_code: vec![Some(0), Some(3), Some(61)],
            precipitation_probability: vec![Some(10.0), Some(35.0), Some(80.0)],
            precipitation: vec![],
            wind_speed_10m: vec![Some(4.0), Some(9.0), Some(12.0)],
            wind_direction_10m: vec![Some(90.0), Some(180.0), Some(270.0)],
            is_day: vec![Some(1), Some(0), Some(1)],
        }
    }

    #[test]
    fn parse_hourly_skips_bad_rows_and_converts_units() {
        let parsed = parse_hourly(&hourly_block(), 3600);
        assert_eq!(parsed.len(), 1);

        let sample = &parsed[0];
        assert_eq!(
            sample.timestamp_utc,
            Utc.with_ymd_and_hms(2026, 2, 12, 9, 0, 0).unwrap()
        );
        assert_eq!(sample.precipitation_probability, Some(0.35));
        assert_eq!(sample.apparent_temperature_c, None);
        assert!(!sample.is_daytime);
    }

    #[test]
    fn current_probability_comes_from_matching_hour() {
        let hourly = parse_hourly(&hourly_block(), 0);
        let at = Utc.with_ymd_and_hms(2026, 2, 12, 10, 45, 0).unwrap();
        assert_eq!(probability_for_hour(&hourly, at), Some(0.35));
        let later = Utc.with_ymd_and_hms(2026, 2, 12, 14, 0, 0).unwrap();
        assert_eq!(probability_for_hour(&hourly, later), None);
    }

    #[test]
    fn daily_hints_round_percentages() {
        let block = DailyBlock {
            time: vec!["2026-02-12".to_string(), "nope".to_string()],
            precipitation_probability_max: vec![Some(41.6), Some(10.0)],
        };
        let hints = parse_daily(&block);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].chance_of_rain, Some(42));
        assert_eq!(hints[0].will_rain, None);
    }
}
