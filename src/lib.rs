pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod render;
pub mod resilience;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use app::events::{AppEvent, start_shutdown_task};
use app::settings::{RuntimeSettings, load_runtime_settings, save_runtime_settings};
use app::state::{AppState, LocationSource, RefreshMode, Services, fetch_report};
use chrono::Utc;
use cli::Cli;
use data::{
    geocode::GeocodeClient,
    locate::{DeviceLocator, FixedLocator, IpLocator},
    provider::{ProviderConfig, WeatherClient},
};
use domain::weather::{GeocodeCandidate, GeocodeResolution, Location};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` wins over `--log-level`.
pub fn init_logging(cli: &Cli) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;

    let (settings, settings_path) = load_runtime_settings(&cli, !cli.no_save);
    if let Some(path) = settings_path.as_deref()
        && let Err(err) = save_runtime_settings(path, &settings)
    {
        warn!(error = %err, "could not save settings");
    }

    let services = Arc::new(Services {
        weather: WeatherClient::from_config(&provider_config(&cli, &settings))?,
        locator: device_locator(&cli),
    });
    info!(
        provider = services.weather.kind().label(),
        units = ?settings.units,
        "starting"
    );

    let mut app = AppState::new(
        LocationSource::Gps,
        settings.units,
        settings.refresh_interval_secs,
    );
    if let Some(city) = cli.city.as_deref() {
        app.select_location(search_location(&cli, city).await?);
    }

    if cli.watch {
        run_watch(app, services, cli.json).await
    } else {
        run_once(app, &services, cli.json).await
    }
}

fn provider_config(cli: &Cli, settings: &RuntimeSettings) -> ProviderConfig {
    ProviderConfig {
        kind: settings.provider,
        api_key: cli.api_key_for(settings.provider),
        base_url: cli.forecast_url.clone(),
        air_quality_url: cli.air_quality_url.clone(),
    }
}

fn device_locator(cli: &Cli) -> DeviceLocator {
    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        return DeviceLocator::Fixed(FixedLocator::new(Location::from_coords(lat, lon)));
    }
    if cli.no_locate {
        return DeviceLocator::Disabled;
    }
    DeviceLocator::Ip(match &cli.locate_url {
        Some(url) => IpLocator::with_url(url.clone()),
        None => IpLocator::new(),
    })
}

async fn search_location(cli: &Cli, city: &str) -> Result<Location> {
    let geocoder = match &cli.geocode_url {
        Some(url) => GeocodeClient::with_base_url(url.clone()),
        None => GeocodeClient::new(),
    };
    let country_code = cli.country_code.as_deref();

    if let Some(pick) = cli.pick {
        let candidates = geocoder.search(city, country_code).await?;
        let Some(candidate) = candidates.get(usize::from(pick) - 1) else {
            bail!(
                "--pick {pick} is out of range, '{city}' has {} candidate(s)",
                candidates.len()
            );
        };
        return Ok(candidate.to_location());
    }

    match geocoder.resolve(city, country_code).await? {
        GeocodeResolution::Selected(candidate) => Ok(candidate.to_location()),
        GeocodeResolution::NeedsDisambiguation(candidates) => {
            bail!(
                "'{city}' is ambiguous, rerun with --pick N:\n{}",
                candidate_list(&candidates)
            )
        }
        GeocodeResolution::NotFound(query) => bail!("no location found for '{query}'"),
    }
}

fn candidate_list(candidates: &[GeocodeCandidate]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(idx, candidate)| format!("  {}. {}", idx + 1, candidate.detail_line()))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn run_once(mut app: AppState, services: &Services, json: bool) -> Result<()> {
    let Some(target) = app.begin_refresh(RefreshMode::Interactive) else {
        return Ok(());
    };
    match fetch_report(&services.weather, &services.locator, target).await {
        Ok((location, report)) => app.apply_success(location, report, Utc::now()),
        Err(err) => app.apply_failure(RefreshMode::Interactive, format!("{err:#}"), Utc::now())?,
    }
    print_state(&app, json)
}

async fn run_watch(mut app: AppState, services: Arc<Services>, json: bool) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<AppEvent>(64);
    start_shutdown_task(tx.clone());
    tx.send(AppEvent::Bootstrap)
        .await
        .context("event channel closed")?;

    while app.running {
        let Some(event) = rx.recv().await else {
            break;
        };
        if app.handle_event(event, &tx, &services).await? {
            app.update_freshness(Utc::now());
            print_state(&app, json)?;
        }
    }

    Ok(())
}

fn print_state(app: &AppState, json: bool) -> Result<()> {
    if json {
        if let Some(report) = app.report.as_ref() {
            println!("{}", render::render_json(report)?);
        }
    } else {
        println!("{}", render::render_snapshot(app, Utc::now()));
    }
    Ok(())
}
