use std::collections::HashMap;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::http_client;
use crate::domain::{
    air_quality::{AirQualityIndex, AirQualityScale},
    weather::{Location, ProviderSnapshot, RawSample, from_unix, mps_to_kph},
};

pub const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
/// The free 3-hourly forecast only reaches five days out.
const FORECAST_DAYS: usize = 5;

/// OpenWeatherMap adapter: current reading, 3-hourly forecast and 1-5 air pollution index.
#[derive(Debug, Clone)]
pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMapClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(10),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub async fn fetch(&self, location: &Location) -> Result<ProviderSnapshot> {
        let (current, forecast, pollution) = futures::join!(
            self.get::<CurrentResponse>("weather", location, true),
            self.get::<ForecastResponse>("forecast", location, true),
            self.get::<PollutionResponse>("air_pollution", location, false),
        );

        let current = current?;
        let forecast = forecast?;
        let air_quality = match pollution {
            Ok(payload) => payload.index(),
            Err(err) => {
                warn!(error = %err, "air quality unavailable");
                None
            }
        };

        let snapshot = to_snapshot(current, forecast, air_quality)?;
        debug!(
            buckets = snapshot.hourly.len(),
            offset = snapshot.utc_offset_seconds,
            "openweathermap forecast parsed"
        );
        Ok(snapshot)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &Location,
        metric: bool,
    ) -> Result<T> {
        let mut request = self
            .client
            .get(format!("{}/{endpoint}", self.base_url))
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("appid", self.api_key.clone()),
            ]);
        if metric {
            request = request.query(&[("units", "metric")]);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{endpoint} request failed"))?
            .error_for_status()
            .with_context(|| format!("{endpoint} request returned non-success status"))?;

        response
            .json()
            .await
            .with_context(|| format!("failed to parse {endpoint} payload"))
    }
}

fn to_snapshot(
    current: CurrentResponse,
    forecast: ForecastResponse,
    air_quality: Option<AirQualityIndex>,
) -> Result<ProviderSnapshot> {
    let timestamp = from_unix(current.dt).context("weather payload has an invalid timestamp")?;
    let (primary, secondary) = split_conditions(&current.weather)
        .context("weather payload has no condition entries")?;

    let mut sample = RawSample::new(timestamp, current.main.temp, primary);
    sample.secondary_condition_codes = secondary;
    sample.apparent_temperature_c = current.main.feels_like;
    sample.relative_humidity = current.main.humidity;
    sample.precipitation_volume_mm = window_volume(&[&current.rain, &current.snow]);
    // Current readings have no probability; the first forecast bucket stands in.
    sample.precipitation_probability = forecast.list.first().and_then(|bucket| bucket.pop);
    sample.wind_speed_kph = mps_to_kph(current.wind.speed);
    sample.wind_direction_deg = current.wind.deg.unwrap_or_default();
    sample.is_daytime = current
        .weather
        .first()
        .and_then(|entry| entry.icon.as_deref())
        .is_none_or(|icon| !icon.ends_with('n'));

    let place_name = match current.sys.as_ref().and_then(|sys| sys.country.as_deref()) {
        Some(country) if !current.name.is_empty() => Some(format!("{}, {country}", current.name)),
        _ => Some(current.name.clone()).filter(|name| !name.is_empty()),
    };

    Ok(ProviderSnapshot {
        place_name,
        utc_offset_seconds: current.timezone,
        current_text: current
            .weather
            .first()
            .and_then(|entry| entry.description.clone()),
        current: sample,
        hourly: forecast.list.iter().filter_map(parse_bucket).collect(),
        daily_hints: Vec::new(),
        forecast_days: FORECAST_DAYS,
        air_quality,
    })
}

fn parse_bucket(bucket: &ForecastBucket) -> Option<RawSample> {
    let timestamp = from_unix(bucket.dt)?;
    let (primary, secondary) = split_conditions(&bucket.weather)?;

    let mut sample = RawSample::new(timestamp, bucket.main.temp, primary);
    sample.secondary_condition_codes = secondary;
    sample.apparent_temperature_c = bucket.main.feels_like;
    sample.relative_humidity = bucket.main.humidity;
    sample.precipitation_probability = bucket.pop;
    sample.precipitation_volume_mm = window_volume(&[&bucket.rain, &bucket.snow]);
    sample.wind_speed_kph = mps_to_kph(bucket.wind.speed);
    sample.wind_direction_deg = bucket.wind.deg.unwrap_or_default();
    sample.is_daytime = bucket
        .sys
        .as_ref()
        .and_then(|sys| sys.pod.as_deref())
        .is_none_or(|pod| pod != "n");
    Some(sample)
}

fn split_conditions(entries: &[ConditionEntry]) -> Option<(i32, Vec<i32>)> {
    let (first, rest) = entries.split_first()?;
    Some((first.id, rest.iter().map(|entry| entry.id).collect()))
}

/// Rain plus snow for the reported window, preferring the 1h figure.
/// `None` when neither block was present.
fn window_volume(blocks: &[&Option<HashMap<String, f32>>]) -> Option<f32> {
    let mut total: Option<f32> = None;
    for block in blocks.iter().filter_map(|&block| block.as_ref()) {
        if let Some(mm) = block.get("1h").or_else(|| block.get("3h")) {
            total = Some(total.unwrap_or_default() + mm);
        }
    }
    total
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    id: i32,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f32,
    feels_like: Option<f32>,
    humidity: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f32,
    deg: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CurrentSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    dt: i64,
    #[serde(default)]
    timezone: i32,
    #[serde(default)]
    name: String,
    weather: Vec<ConditionEntry>,
    main: MainBlock,
    wind: WindBlock,
    rain: Option<HashMap<String, f32>>,
    snow: Option<HashMap<String, f32>>,
    sys: Option<CurrentSys>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastBucket>,
}

#[derive(Debug, Deserialize)]
struct BucketSys {
    pod: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastBucket {
    dt: i64,
    main: MainBlock,
    weather: Vec<ConditionEntry>,
    wind: WindBlock,
    pop: Option<f32>,
    rain: Option<HashMap<String, f32>>,
    snow: Option<HashMap<String, f32>>,
    sys: Option<BucketSys>,
}

#[derive(Debug, Deserialize)]
struct PollutionResponse {
    list: Vec<PollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct PollutionEntry {
    main: PollutionMain,
}

#[derive(Debug, Deserialize)]
struct PollutionMain {
    aqi: f32,
}

impl PollutionResponse {
    fn index(&self) -> Option<AirQualityIndex> {
        let entry = self.list.first()?;
        AirQualityIndex::from_reading(entry.main.aqi, AirQualityScale::Categorical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volumes(pairs: &[(&str, f32)]) -> Option<HashMap<String, f32>> {
        Some(
            pairs
                .iter()
                .map(|(window, mm)| ((*window).to_string(), *mm))
                .collect(),
        )
    }

    #[test]
    fn window_volume_prefers_one_hour_and_sums_rain_with_snow() {
        let rain = volumes(&[("1h", 0.5), ("3h", 1.25)]);
        let snow = volumes(&[("3h", 0.25)]);
        assert_eq!(window_volume(&[&rain, &snow]), Some(0.75));
        assert_eq!(window_volume(&[&None, &None]), None);
        assert_eq!(window_volume(&[&volumes(&[]), &None]), None);
    }

    #[test]
    fn split_conditions_keeps_order() {
        let entries = vec![
            ConditionEntry {
                id: 701,
                description: Some("mist".to_string()),
                icon: None,
            },
            ConditionEntry {
                id: 500,
                description: None,
                icon: None,
            },
        ];
        assert_eq!(split_conditions(&entries), Some((701, vec![500])));
        assert_eq!(split_conditions(&[]), None);
    }

    #[test]
    fn pollution_index_is_stretched() {
        let payload = PollutionResponse {
            list: vec![PollutionEntry {
                main: PollutionMain { aqi: 3.0 },
            }],
        };
        assert_eq!(payload.index().map(|aqi| aqi.value), Some(150));
    }
}
