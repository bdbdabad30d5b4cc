use anyhow::{Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{
    open_meteo::OpenMeteoClient, openweathermap::OpenWeatherMapClient,
    weatherapi::WeatherApiClient,
};
use crate::{
    domain::weather::{Location, ProviderSnapshot},
    engine::table::{ConditionTable, OPEN_METEO, OPEN_WEATHER_MAP, WEATHER_API},
};

/// Which weather service feeds the engine. Picked once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    #[value(name = "open-meteo")]
    OpenMeteo,
    #[value(name = "openweathermap")]
    #[serde(rename = "openweathermap")]
    OpenWeatherMap,
    #[value(name = "weatherapi")]
    #[serde(rename = "weatherapi")]
    WeatherApi,
}

impl ProviderKind {
    #[must_use]
    pub fn table(self) -> &'static dyn ConditionTable {
        match self {
            ProviderKind::OpenMeteo => &OPEN_METEO,
            ProviderKind::OpenWeatherMap => &OPEN_WEATHER_MAP,
            ProviderKind::WeatherApi => &WEATHER_API,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::OpenMeteo => "Open-Meteo",
            ProviderKind::OpenWeatherMap => "OpenWeatherMap",
            ProviderKind::WeatherApi => "WeatherAPI",
        }
    }

    #[must_use]
    pub fn requires_api_key(self) -> bool {
        !matches!(self, ProviderKind::OpenMeteo)
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub air_quality_url: Option<String>,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            base_url: None,
            air_quality_url: None,
        }
    }
}

/// One adapter per provider schema; all of them produce a [`ProviderSnapshot`].
#[derive(Debug, Clone)]
pub enum WeatherClient {
    OpenMeteo(OpenMeteoClient),
    OpenWeatherMap(OpenWeatherMapClient),
    WeatherApi(WeatherApiClient),
}

impl WeatherClient {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.api_key.as_deref().filter(|key| !key.trim().is_empty());
        if config.kind.requires_api_key() && api_key.is_none() {
            bail!("{} requires an API key", config.kind.label());
        }
        let api_key = api_key.unwrap_or_default();

        Ok(match config.kind {
            ProviderKind::OpenMeteo => {
                let client = match &config.base_url {
                    Some(url) => OpenMeteoClient::with_base_url(url.clone()),
                    None => OpenMeteoClient::new(),
                };
                match &config.air_quality_url {
                    Some(url) => WeatherClient::OpenMeteo(client.with_air_quality_url(url.clone())),
                    None => WeatherClient::OpenMeteo(client),
                }
            }
            ProviderKind::OpenWeatherMap => WeatherClient::OpenWeatherMap(match &config.base_url {
                Some(url) => OpenWeatherMapClient::with_base_url(url.clone(), api_key),
                None => OpenWeatherMapClient::new(api_key),
            }),
            ProviderKind::WeatherApi => WeatherClient::WeatherApi(match &config.base_url {
                Some(url) => WeatherApiClient::with_base_url(url.clone(), api_key),
                None => WeatherApiClient::new(api_key),
            }),
        })
    }

    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            WeatherClient::OpenMeteo(_) => ProviderKind::OpenMeteo,
            WeatherClient::OpenWeatherMap(_) => ProviderKind::OpenWeatherMap,
            WeatherClient::WeatherApi(_) => ProviderKind::WeatherApi,
        }
    }

    #[must_use]
    pub fn table(&self) -> &'static dyn ConditionTable {
        self.kind().table()
    }

    pub async fn fetch(&self, location: &Location) -> Result<ProviderSnapshot> {
        match self {
            WeatherClient::OpenMeteo(client) => client.fetch(location).await,
            WeatherClient::OpenWeatherMap(client) => client.fetch(location).await,
            WeatherClient::WeatherApi(client) => client.fetch(location).await,
        }
    }
}
