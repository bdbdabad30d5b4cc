#![allow(clippy::missing_errors_doc)]

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{data::provider::ProviderKind, domain::weather::Units};

pub const DEFAULT_REFRESH_SECS: u64 = 600;
pub const MIN_REFRESH_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitsArg {
    Celsius,
    Fahrenheit,
}

impl From<UnitsArg> for Units {
    fn from(value: UnitsArg) -> Self {
        match value {
            UnitsArg::Celsius => Units::Celsius,
            UnitsArg::Fahrenheit => Units::Fahrenheit,
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser, Clone)]
#[command(
    name = "weather-lens",
    version,
    about = "Normalized weather snapshot from Open-Meteo, OpenWeatherMap or WeatherAPI"
)]
pub struct Cli {
    /// City to search for (default: device location)
    pub city: Option<String>,

    /// Weather provider (saved between runs)
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Display units (saved between runs)
    #[arg(long, value_enum)]
    pub units: Option<UnitsArg>,

    /// Geocode bias (ISO2)
    #[arg(long)]
    pub country_code: Option<String>,

    /// Pick the Nth geocoding candidate (1-based) instead of auto-resolving
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub pick: Option<u8>,

    /// Direct latitude (requires --lon)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Direct longitude (requires --lat)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Skip IP-based positioning when no city or coordinates are given
    #[arg(long)]
    pub no_locate: bool,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHERMAP_API_KEY", hide_env_values = true)]
    pub owm_api_key: Option<String>,

    /// WeatherAPI.com API key
    #[arg(long, env = "WEATHERAPI_KEY", hide_env_values = true)]
    pub weatherapi_key: Option<String>,

    /// Forecast endpoint override
    #[arg(long)]
    pub forecast_url: Option<String>,

    /// Air quality endpoint override (Open-Meteo only)
    #[arg(long)]
    pub air_quality_url: Option<String>,

    /// Geocoding endpoint override
    #[arg(long)]
    pub geocode_url: Option<String>,

    /// IP positioning endpoint override
    #[arg(long)]
    pub locate_url: Option<String>,

    /// Refresh interval in seconds for --watch (saved between runs)
    #[arg(long)]
    pub refresh_interval: Option<u64>,

    /// Keep refreshing silently and reprint on every update
    #[arg(long, conflicts_with = "one_shot")]
    pub watch: bool,

    /// Print one snapshot and exit (default)
    #[arg(long)]
    pub one_shot: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Do not read or write the settings file
    #[arg(long)]
    pub no_save: bool,

    /// Log filter when RUST_LOG is unset (e.g. debug, weather_lens=trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        match (self.lat, self.lon) {
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("--lat and --lon must be provided together")
            }
            (Some(lat), Some(lon))
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) =>
            {
                anyhow::bail!("--lat must be within ±90 and --lon within ±180")
            }
            _ => {}
        }
        if self.pick.is_some() && self.city.is_none() {
            anyhow::bail!("--pick needs a city to search for");
        }
        Ok(())
    }

    /// API key for a provider, if one was configured.
    #[must_use]
    pub fn api_key_for(&self, provider: ProviderKind) -> Option<String> {
        match provider {
            ProviderKind::OpenMeteo => None,
            ProviderKind::OpenWeatherMap => self.owm_api_key.clone(),
            ProviderKind::WeatherApi => self.weatherapi_key.clone(),
        }
    }
}
