use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    app::events::{AppEvent, start_refresh_task},
    data::{
        locate::{DeviceLocator, LocationProvider},
        provider::WeatherClient,
    },
    domain::weather::{ForecastReport, Location, RefreshMetadata, Units},
    engine::build_report,
    resilience::freshness::evaluate_freshness,
};

/// Where the next refresh gets its coordinates from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    /// Ask the location provider again on every refresh.
    Gps,
    /// Coordinates and name chosen from a geocoding search.
    ManualSearch(Location),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Periodic refresh; failures keep the previous report on screen.
    Silent,
    /// First load or user request; failures are surfaced.
    Interactive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshTarget {
    DeviceFix,
    Fixed(Location),
}

#[must_use]
pub fn refresh_target(source: &LocationSource) -> RefreshTarget {
    match source {
        LocationSource::Gps => RefreshTarget::DeviceFix,
        LocationSource::ManualSearch(location) => RefreshTarget::Fixed(location.clone()),
    }
}

/// What a refresh needs besides the app state.
#[derive(Debug, Clone)]
pub struct Services {
    pub weather: WeatherClient,
    pub locator: DeviceLocator,
}

#[derive(Debug)]
pub struct AppState {
    pub source: LocationSource,
    pub location: Option<Location>,
    pub report: Option<ForecastReport>,
    pub refresh_meta: RefreshMetadata,
    pub units: Units,
    pub refresh_interval_secs: u64,
    pub fetch_in_flight: bool,
    pub last_error: Option<String>,
    pub running: bool,
}

impl AppState {
    #[must_use]
    pub fn new(source: LocationSource, units: Units, refresh_interval_secs: u64) -> Self {
        Self {
            source,
            location: None,
            report: None,
            refresh_meta: RefreshMetadata::default(),
            units,
            refresh_interval_secs,
            fetch_in_flight: false,
            last_error: None,
            running: true,
        }
    }

    /// Claims the fetch slot. `None` while another refresh is still running.
    pub fn begin_refresh(&mut self, mode: RefreshMode) -> Option<RefreshTarget> {
        if self.fetch_in_flight {
            debug!(?mode, "refresh skipped, fetch already in flight");
            return None;
        }
        self.fetch_in_flight = true;
        Some(refresh_target(&self.source))
    }

    pub fn apply_success(&mut self, location: Location, report: ForecastReport, now: DateTime<Utc>) {
        let display_name = match (&self.source, &report.place_name) {
            (LocationSource::Gps, Some(place)) => place.clone(),
            _ => location.display_name.clone(),
        };
        self.location = Some(Location {
            display_name,
            ..location
        });
        self.report = Some(report);
        self.fetch_in_flight = false;
        self.last_error = None;
        self.refresh_meta.mark_success(now);
    }

    /// Silent failures are logged and keep the last report; interactive ones
    /// come back as an error.
    pub fn apply_failure(&mut self, mode: RefreshMode, error: String, now: DateTime<Utc>) -> Result<()> {
        self.fetch_in_flight = false;
        self.refresh_meta.mark_failure(now);
        self.last_error = Some(error.clone());

        match mode {
            RefreshMode::Silent => {
                warn!(
                    error = %error,
                    failures = self.refresh_meta.consecutive_failures,
                    state = self.refresh_meta.state.label(),
                    "silent refresh failed, keeping previous report"
                );
                Ok(())
            }
            RefreshMode::Interactive => Err(anyhow!(error)),
        }
    }

    pub fn select_location(&mut self, location: Location) {
        info!(name = %location.display_name, "switching to searched location");
        self.location = Some(location.clone());
        self.source = LocationSource::ManualSearch(location);
    }

    pub fn return_to_gps(&mut self) {
        info!("switching back to device location");
        self.source = LocationSource::Gps;
    }

    pub fn update_freshness(&mut self, now: DateTime<Utc>) {
        self.refresh_meta.state = evaluate_freshness(
            self.refresh_meta.last_success,
            self.refresh_meta.consecutive_failures,
            now,
        );
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.location
            .as_ref()
            .map_or("Locating...", |location| location.display_name.as_str())
    }

    /// Drives the watch loop. Returns whether the screen should be redrawn.
    pub async fn handle_event(
        &mut self,
        event: AppEvent,
        tx: &mpsc::Sender<AppEvent>,
        services: &Arc<Services>,
    ) -> Result<bool> {
        match event {
            AppEvent::Bootstrap => {
                start_refresh_task(tx.clone(), self.refresh_interval_secs);
                self.start_fetch(RefreshMode::Interactive, tx, services);
                Ok(false)
            }
            AppEvent::TickRefresh => {
                self.start_fetch(RefreshMode::Silent, tx, services);
                Ok(false)
            }
            AppEvent::FetchSucceeded {
                mode,
                location,
                report,
            } => {
                debug!(?mode, "refresh succeeded");
                self.apply_success(location, *report, Utc::now());
                Ok(true)
            }
            AppEvent::FetchFailed { mode, error } => {
                self.apply_failure(mode, error, Utc::now())?;
                Ok(true)
            }
            AppEvent::Quit => {
                self.running = false;
                Ok(false)
            }
        }
    }

    fn start_fetch(
        &mut self,
        mode: RefreshMode,
        tx: &mpsc::Sender<AppEvent>,
        services: &Arc<Services>,
    ) {
        let Some(target) = self.begin_refresh(mode) else {
            return;
        };
        let services = Arc::clone(services);
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = match fetch_report(&services.weather, &services.locator, target).await {
                Ok((location, report)) => AppEvent::FetchSucceeded {
                    mode,
                    location,
                    report: Box::new(report),
                },
                Err(err) => AppEvent::FetchFailed {
                    mode,
                    error: format!("{err:#}"),
                },
            };
            let _ = tx.send(event).await;
        });
    }
}

/// One full refresh: position, provider fetch, engine.
pub async fn fetch_report<L: LocationProvider>(
    weather: &WeatherClient,
    locator: &L,
    target: RefreshTarget,
) -> Result<(Location, ForecastReport)> {
    let location = match target {
        RefreshTarget::DeviceFix => locator
            .current_fix()
            .await
            .context("could not determine the device location")?,
        RefreshTarget::Fixed(location) => location,
    };

    let snapshot = weather
        .fetch(&location)
        .await
        .with_context(|| format!("{} fetch failed", weather.kind().label()))?;
    let report = build_report(weather.table(), &snapshot, Utc::now());
    Ok((location, report))
}
