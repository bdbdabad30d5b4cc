//! Device position for the GPS location source.

use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::http_client;
use crate::domain::weather::Location;

pub const IP_LOOKUP_URL: &str = "https://ipapi.co/json/";

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
    #[error("location lookup failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub trait LocationProvider: Send + Sync {
    /// Best current position. The display name is a placeholder until a
    /// weather response supplies the real place.
    fn current_fix(&self) -> impl Future<Output = Result<Location, LocationError>> + Send;
}

/// Coordinates supplied up front, e.g. from the command line.
#[derive(Debug, Clone)]
pub struct FixedLocator {
    location: Location,
}

impl FixedLocator {
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

impl LocationProvider for FixedLocator {
    async fn current_fix(&self) -> Result<Location, LocationError> {
        Ok(self.location.clone())
    }
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    url: String,
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_url(IP_LOOKUP_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: http_client(5),
            url: url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    city: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    country_name: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl LocationProvider for IpLocator {
    async fn current_fix(&self) -> Result<Location, LocationError> {
        let response: IpApiResponse = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.error {
            return Err(LocationError::Unavailable(
                response.reason.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }

        let (Some(latitude), Some(longitude)) = (response.latitude, response.longitude) else {
            return Err(LocationError::Unavailable(
                "response carried no coordinates".to_string(),
            ));
        };

        let name = match (response.city.filter(|c| !c.is_empty()), response.country_name) {
            (Some(city), Some(country)) => format!("{city}, {country}"),
            (Some(city), None) => city,
            _ => Location::from_coords(latitude, longitude).display_name,
        };
        debug!(latitude, longitude, "ip location resolved");
        Ok(Location::new(latitude, longitude, name))
    }
}

/// Static dispatch over the available position sources.
#[derive(Debug, Clone)]
pub enum DeviceLocator {
    Fixed(FixedLocator),
    Ip(IpLocator),
    /// Positioning switched off by the user.
    Disabled,
}

impl LocationProvider for DeviceLocator {
    async fn current_fix(&self) -> Result<Location, LocationError> {
        match self {
            DeviceLocator::Fixed(locator) => locator.current_fix().await,
            DeviceLocator::Ip(locator) => locator.current_fix().await,
            DeviceLocator::Disabled => Err(LocationError::PermissionDenied),
        }
    }
}
