use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::air_quality::AirQualityIndex, engine::precipitation::OverrideReason,
    resilience::freshness::FreshnessState,
};

mod conditions;
mod conversions;

pub use conditions::{
    BackgroundTheme, ConditionStyle, RainIntensity, SkyCondition, derive_label, derive_theme,
    temperature_color,
};
pub use conversions::{
    compass_point, convert_temp, from_unix, infer_offset_seconds, local_date, local_to_utc,
    mps_to_kph, parse_date, parse_datetime, parse_spaced_datetime, round_temp, round_wind_speed,
    to_local,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    Celsius,
    Fahrenheit,
}

impl Units {
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Units::Celsius => "C",
            Units::Fahrenheit => "F",
        }
    }
}

/// One provider observation, either an instant or a forecast bucket.
///
/// Everything is already in Celsius and km/h. Optional fields stay `None`
/// when the provider did not report them; absence is not the same as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub timestamp_utc: DateTime<Utc>,
    pub temperature_c: f32,
    pub apparent_temperature_c: Option<f32>,
    pub relative_humidity: Option<f32>,
    pub condition_code: i32,
    pub secondary_condition_codes: Vec<i32>,
    /// 0.0 to 1.0.
    pub precipitation_probability: Option<f32>,
    /// Measured or forecast volume for the sample's window (1h or 3h).
    pub precipitation_volume_mm: Option<f32>,
    /// Provider's own pre-aggregated "will it rain/snow" verdict.
    pub will_precipitate: Option<bool>,
    pub wind_speed_kph: f32,
    pub wind_direction_deg: f32,
    pub is_daytime: bool,
}

impl RawSample {
    #[must_use]
    pub fn new(timestamp_utc: DateTime<Utc>, temperature_c: f32, condition_code: i32) -> Self {
        Self {
            timestamp_utc,
            temperature_c,
            apparent_temperature_c: None,
            relative_humidity: None,
            condition_code,
            secondary_condition_codes: Vec::new(),
            precipitation_probability: None,
            precipitation_volume_mm: None,
            will_precipitate: None,
            wind_speed_kph: 0.0,
            wind_direction_deg: 0.0,
            is_daytime: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, display_name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, format!("{lat:.4}, {lon:.4}"))
    }
}

/// One geocoding search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub admin1: Option<String>,
    pub population: Option<u64>,
}

impl GeocodeCandidate {
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name.clone(),
        }
    }

    #[must_use]
    pub fn detail_line(&self) -> String {
        match (&self.admin1, &self.country) {
            (Some(admin), Some(country)) => format!("{}, {}, {}", self.name, admin, country),
            _ => self.display_name(),
        }
    }

    #[must_use]
    pub fn to_location(&self) -> Location {
        Location::new(self.latitude, self.longitude, self.display_name())
    }
}

#[derive(Debug, Clone)]
pub enum GeocodeResolution {
    Selected(GeocodeCandidate),
    NeedsDisambiguation(Vec<GeocodeCandidate>),
    NotFound(String),
}

/// Provider's own daily aggregates, preferred over sample heuristics when present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyHint {
    pub date: NaiveDate,
    /// 0 to 100.
    pub chance_of_rain: Option<u8>,
    pub will_rain: Option<bool>,
}

/// Everything one provider fetch produced, translated into provider-agnostic shapes.
#[derive(Debug, Clone)]
pub struct ProviderSnapshot {
    /// Reverse-geocoded place from the weather response, if the provider has one.
    pub place_name: Option<String>,
    pub utc_offset_seconds: i32,
    pub current: RawSample,
    /// Provider's headline wording for the current condition.
    pub current_text: Option<String>,
    pub hourly: Vec<RawSample>,
    pub daily_hints: Vec<DailyHint>,
    pub forecast_days: usize,
    pub air_quality: Option<AirQualityIndex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub sample: RawSample,
    pub condition: SkyCondition,
    pub override_reason: OverrideReason,
    pub label: String,
    pub theme: BackgroundTheme,
}

impl CurrentConditions {
    #[must_use]
    pub fn forced(&self) -> bool {
        self.override_reason == OverrideReason::Predicted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySlot {
    pub timestamp_utc: DateTime<Utc>,
    pub local_time: NaiveDateTime,
    pub temperature_c: f32,
    pub condition: SkyCondition,
    pub forced: bool,
    pub precipitation_probability: Option<f32>,
    pub wind_speed_kph: f32,
    pub wind_direction_deg: f32,
    pub is_daytime: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub max_temp_c: f32,
    pub min_temp_c: f32,
    pub representative_condition: SkyCondition,
    pub max_feels_like_c: f32,
    pub max_wind_speed_kph: f32,
    pub dominant_wind_direction_deg: f32,
    /// 0 to 100.
    pub chance_of_rain: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub place_name: Option<String>,
    pub utc_offset_seconds: i32,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlySlot>,
    pub daily: Vec<DailySummary>,
    pub air_quality: Option<AirQualityIndex>,
    pub generated_at: DateTime<Utc>,
}

impl ForecastReport {
    #[must_use]
    pub fn current_temp(&self, units: Units) -> i32 {
        round_temp(convert_temp(self.current.sample.temperature_c, units))
    }

    #[must_use]
    pub fn high_low(&self, units: Units) -> Option<(i32, i32)> {
        let today = self.daily.first()?;
        Some((
            round_temp(convert_temp(today.max_temp_c, units)),
            round_temp(convert_temp(today.min_temp_c, units)),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct RefreshMetadata {
    pub last_success: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub state: FreshnessState,
    pub consecutive_failures: u32,
}

impl Default for RefreshMetadata {
    fn default() -> Self {
        Self {
            last_success: None,
            last_attempt: None,
            state: FreshnessState::Stale,
            consecutive_failures: 0,
        }
    }
}

impl RefreshMetadata {
    pub fn mark_success(&mut self, now: DateTime<Utc>) {
        self.last_attempt = Some(now);
        self.last_success = Some(now);
        self.consecutive_failures = 0;
        self.state = FreshnessState::Fresh;
    }

    pub fn mark_failure(&mut self, now: DateTime<Utc>) {
        self.last_attempt = Some(now);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.state = crate::resilience::freshness::evaluate_freshness(
            self.last_success,
            self.consecutive_failures,
            now,
        );
    }

    #[must_use]
    pub fn age_minutes(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_success.map(|ts| (now - ts).num_minutes())
    }
}
