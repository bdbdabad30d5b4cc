#![allow(dead_code)]

use serde_json::{Value, json};
use weather_lens::domain::weather::Location;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// 2026-02-12 10:00 UTC.
pub const BASE_EPOCH: i64 = 1_770_890_400;

pub fn london() -> Location {
    Location::new(51.5072, -0.1276, "London, United Kingdom")
}

pub async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Two local days at UTC+1, overcast throughout. Day one peaks at 30 %
/// precipitation probability at 11:00, day two at 60 % at 15:00.
pub fn open_meteo_forecast() -> Value {
    let mut time = Vec::new();
    let mut probability = Vec::new();
    for day in 12..=13 {
        for hour in 0..24 {
            time.push(format!("2026-02-{day}T{hour:02}:00"));
            probability.push(match (day, hour) {
                (12, 11) => 30,
                (13, 15) => 60,
                _ => 10,
            });
        }
    }
    let hours = time.len();
    let temperature: Vec<f32> = (0..hours).map(|idx| 4.0 + (idx % 24) as f32 * 0.25).collect();

    json!({
        "latitude": 51.5,
        "longitude": -0.125,
        "utc_offset_seconds": 3600,
        "timezone": "Europe/Paris",
        "current": {
            "time": "2026-02-12T11:30",
            "temperature_2m": 8.0,
            "relative_humidity_2m": 81.0,
            "apparent_temperature": 5.5,
            "weather_code": 3,
            "precipitation": 0.0,
            "wind_speed_10m": 14.4,
            "wind_direction_10m": 250.0,
            "is_day": 1
        },
        "hourly": {
            "time": time,
            "temperature_2m": temperature,
            "apparent_temperature": vec![3.0; hours],
            "relative_humidity_2m": vec![80.0; hours],
            "weather_code": vec![3; hours],
            "precipitation_probability": probability,
            "precipitation": vec![0.0; hours],
            "wind_speed_10m": vec![10.0; hours],
            "wind_direction_10m": vec![250.0; hours],
            "is_day": vec![1; hours]
        },
        "daily": {
            "time": ["2026-02-12", "2026-02-13"],
            "precipitation_probability_max": [30, 80]
        }
    })
}

pub fn open_meteo_air_quality(us_aqi: u32) -> Value {
    json!({ "current": { "time": "2026-02-12T11:00", "us_aqi": us_aqi } })
}

pub fn owm_current() -> Value {
    json!({
        "dt": BASE_EPOCH,
        "timezone": 0,
        "name": "London",
        "weather": [
            { "id": 701, "main": "Mist", "description": "mist", "icon": "50n" },
            { "id": 502, "main": "Rain", "description": "heavy intensity rain", "icon": "10n" }
        ],
        "main": { "temp": 9.5, "feels_like": 7.0, "humidity": 93 },
        "wind": { "speed": 5.0, "deg": 200 },
        "rain": { "1h": 4.2 },
        "sys": { "country": "GB" }
    })
}

/// Eight three-hour buckets starting at [`BASE_EPOCH`].
pub fn owm_forecast() -> Value {
    let list: Vec<Value> = (0..8)
        .map(|idx: i64| {
            let pop = if idx == 2 { 0.3 } else { 0.1 };
            let pod = if idx < 3 { "d" } else { "n" };
            json!({
                "dt": BASE_EPOCH + idx * 3 * 3600,
                "main": { "temp": 10.0 - idx as f32 * 0.5, "feels_like": 8.0, "humidity": 85 },
                "weather": [{ "id": 803, "description": "broken clouds", "icon": "04d" }],
                "wind": { "speed": 4.0, "deg": 220 },
                "pop": pop,
                "sys": { "pod": pod }
            })
        })
        .collect();
    json!({ "cnt": list.len(), "list": list })
}

pub fn owm_pollution(aqi: u8) -> Value {
    json!({ "list": [{ "main": { "aqi": aqi }, "components": {} }] })
}

fn weatherapi_hour(epoch: i64, will_it_rain: u8, chance_of_rain: u8) -> Value {
    json!({
        "time_epoch": epoch,
        "temp_c": 6.0,
        "feelslike_c": 3.0,
        "humidity": 88,
        "condition": { "text": "Overcast", "code": 1009 },
        "wind_kph": 12.0,
        "wind_degree": 190,
        "precip_mm": 0.0,
        "will_it_rain": will_it_rain,
        "will_it_snow": 0,
        "chance_of_rain": chance_of_rain,
        "chance_of_snow": 0,
        "is_day": 1
    })
}

/// One day of overcast hours at UTC+1. The provider's rain verdict and its
/// probability deliberately disagree.
pub fn weatherapi_forecast(will_it_rain: u8, chance_of_rain: u8) -> Value {
    let hours: Vec<Value> = (0..24)
        .map(|idx| weatherapi_hour(BASE_EPOCH + idx * 3600, will_it_rain, chance_of_rain))
        .collect();
    json!({
        "location": {
            "name": "London",
            "region": "City of London, Greater London",
            "country": "United Kingdom",
            "localtime_epoch": BASE_EPOCH,
            "localtime": "2026-02-12 11:00"
        },
        "current": {
            "last_updated_epoch": BASE_EPOCH + 900,
            "temp_c": 6.0,
            "feelslike_c": 3.0,
            "humidity": 88,
            "condition": { "text": "Overcast", "code": 1009 },
            "wind_kph": 12.0,
            "wind_degree": 190,
            "precip_mm": 0.0,
            "is_day": 1,
            "air_quality": { "pm2_5": 8.1, "us-epa-index": 2 }
        },
        "forecast": {
            "forecastday": [{
                "date": "2026-02-12",
                "day": {
                    "daily_will_it_rain": will_it_rain,
                    "daily_chance_of_rain": chance_of_rain,
                    "daily_will_it_snow": 0
                },
                "hour": hours
            }]
        }
    })
}

pub fn geocode_results(entries: &[(&str, &str, &str, u64)]) -> Value {
    let results: Vec<Value> = entries
        .iter()
        .enumerate()
        .map(|(idx, (name, admin1, country_code, population))| {
            json!({
                "name": name,
                "latitude": 40.0 + idx as f64,
                "longitude": -90.0 - idx as f64,
                "country": "United States",
                "country_code": country_code,
                "admin1": admin1,
                "population": population
            })
        })
        .collect();
    json!({ "results": results })
}
