use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::http_client;
use crate::domain::{
    air_quality::{AirQualityIndex, AirQualityScale},
    weather::{
        DailyHint, Location, ProviderSnapshot, RawSample, from_unix, infer_offset_seconds,
        parse_date, parse_spaced_datetime,
    },
};

pub const FORECAST_URL: &str = "https://api.weatherapi.com/v1/forecast.json";
const FORECAST_DAYS: usize = 7;
const EPA_INDEX_KEY: &str = "us-epa-index";

/// WeatherAPI.com adapter. Hours carry the provider's own `will_it_rain` verdicts and
/// days carry `daily_chance_of_rain`; both win over local heuristics.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(FORECAST_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(10),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn fetch(&self, location: &Location) -> Result<ProviderSnapshot> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.clone()),
                (
                    "q",
                    format!("{},{}", location.latitude, location.longitude),
                ),
                ("days", FORECAST_DAYS.to_string()),
                ("aqi", "yes".to_string()),
                ("alerts", "no".to_string()),
            ])
            .send()
            .await
            .context("forecast request failed")?
            .error_for_status()
            .context("forecast request returned non-success status")?;

        let payload: ForecastResponse = response
            .json()
            .await
            .context("failed to parse forecast payload")?;

        let snapshot = to_snapshot(payload)?;
        debug!(
            hourly = snapshot.hourly.len(),
            offset = snapshot.utc_offset_seconds,
            "weatherapi forecast parsed"
        );
        Ok(snapshot)
    }
}

fn to_snapshot(payload: ForecastResponse) -> Result<ProviderSnapshot> {
    let offset = parse_spaced_datetime(&payload.location.localtime)
        .map(|local| infer_offset_seconds(local, payload.location.localtime_epoch))
        .unwrap_or(0);
    let updated = from_unix(payload.current.last_updated_epoch)
        .context("forecast payload has an invalid update time")?;

    let hourly: Vec<RawSample> = payload
        .forecast
        .forecastday
        .iter()
        .flat_map(|day| day.hour.iter())
        .filter_map(parse_hour)
        .collect();

    let current = parse_current(&payload.current, updated, &hourly);
    let place_name = if payload.location.country.is_empty() {
        payload.location.name.clone()
    } else {
        format!("{}, {}", payload.location.name, payload.location.country)
    };

    Ok(ProviderSnapshot {
        place_name: Some(place_name).filter(|name| !name.is_empty()),
        utc_offset_seconds: offset,
        current,
        current_text: Some(payload.current.condition.text.clone()),
        hourly,
        daily_hints: payload.forecast.forecastday.iter().filter_map(parse_day).collect(),
        forecast_days: FORECAST_DAYS,
        air_quality: payload
            .current
            .air_quality
            .as_ref()
            .and_then(|readings| readings.get(EPA_INDEX_KEY).copied().flatten())
            .and_then(|index| AirQualityIndex::from_reading(index, AirQualityScale::Categorical)),
    })
}

fn parse_current(block: &CurrentBlock, updated: DateTime<Utc>, hourly: &[RawSample]) -> RawSample {
    let mut sample = RawSample::new(updated, block.temp_c, block.condition.code);
    sample.apparent_temperature_c = block.feelslike_c;
    sample.relative_humidity = block.humidity;
    sample.precipitation_volume_mm = block.precip_mm;
    sample.wind_speed_kph = block.wind_kph;
    sample.wind_direction_deg = block.wind_degree;
    sample.is_daytime = block.is_day == 1;

    // The hour containing the update carries the provider's verdict for "now".
    if let Some(hour) = hourly.iter().find(|hour| {
        hour.timestamp_utc <= updated && updated < hour.timestamp_utc + chrono::Duration::hours(1)
    }) {
        sample.precipitation_probability = hour.precipitation_probability;
        sample.will_precipitate = hour.will_precipitate;
    }
    sample
}

fn parse_hour(hour: &HourBlock) -> Option<RawSample> {
    let timestamp = from_unix(hour.time_epoch)?;
    let mut sample = RawSample::new(timestamp, hour.temp_c, hour.condition.code);
    sample.apparent_temperature_c = hour.feelslike_c;
    sample.relative_humidity = hour.humidity;
    sample.precipitation_volume_mm = hour.precip_mm;
    sample.precipitation_probability = match (hour.chance_of_rain, hour.chance_of_snow) {
        (None, None) => None,
        (rain, snow) => Some(rain.unwrap_or_default().max(snow.unwrap_or_default()) / 100.0),
    };
    sample.will_precipitate = match (hour.will_it_rain, hour.will_it_snow) {
        (None, None) => None,
        (rain, snow) => Some(rain == Some(1) || snow == Some(1)),
    };
    sample.wind_speed_kph = hour.wind_kph;
    sample.wind_direction_deg = hour.wind_degree;
    sample.is_daytime = hour.is_day == 1;
    Some(sample)
}

fn parse_day(day: &ForecastDay) -> Option<DailyHint> {
    let date = parse_date(&day.date)?;
    let will_rain = match (day.day.daily_will_it_rain, day.day.daily_will_it_snow) {
        (None, None) => None,
        (rain, snow) => Some(rain == Some(1) || snow == Some(1)),
    };
    Some(DailyHint {
        date,
        chance_of_rain: day
            .day
            .daily_chance_of_rain
            .map(|percent| percent.clamp(0.0, 100.0).round() as u8),
        will_rain,
    })
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: LocationBlock,
    current: CurrentBlock,
    forecast: ForecastBlock,
}

#[derive(Debug, Deserialize)]
struct LocationBlock {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    localtime: String,
    localtime_epoch: i64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    #[serde(default)]
    text: String,
    code: i32,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    last_updated_epoch: i64,
    temp_c: f32,
    feelslike_c: Option<f32>,
    humidity: Option<f32>,
    condition: ConditionBlock,
    #[serde(default)]
    wind_kph: f32,
    #[serde(default)]
    wind_degree: f32,
    precip_mm: Option<f32>,
    #[serde(default)]
    is_day: u8,
    air_quality: Option<HashMap<String, Option<f32>>>,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    day: DayBlock,
    #[serde(default)]
    hour: Vec<HourBlock>,
}

#[derive(Debug, Deserialize)]
struct DayBlock {
    daily_will_it_rain: Option<u8>,
    daily_chance_of_rain: Option<f32>,
    daily_will_it_snow: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct HourBlock {
    time_epoch: i64,
    temp_c: f32,
    feelslike_c: Option<f32>,
    humidity: Option<f32>,
    condition: ConditionBlock,
    #[serde(default)]
    wind_kph: f32,
    #[serde(default)]
    wind_degree: f32,
    precip_mm: Option<f32>,
    will_it_rain: Option<u8>,
    will_it_snow: Option<u8>,
    chance_of_rain: Option<f32>,
    chance_of_snow: Option<f32>,
    #[serde(default)]
    is_day: u8,
}
