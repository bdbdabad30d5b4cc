use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    cli::{Cli, DEFAULT_REFRESH_SECS, MIN_REFRESH_SECS},
    data::provider::ProviderKind,
    domain::weather::Units,
};

pub const CONFIG_DIR_ENV: &str = "WEATHER_LENS_CONFIG_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub provider: ProviderKind,
    pub units: Units,
    pub refresh_interval_secs: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenMeteo,
            units: Units::Celsius,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
        }
    }
}

impl RuntimeSettings {
    /// Explicit flags win over whatever was saved.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(provider) = cli.provider {
            self.provider = provider;
        }
        if let Some(units) = cli.units {
            self.units = units.into();
        }
        if let Some(secs) = cli.refresh_interval {
            self.refresh_interval_secs = secs;
        }
        self.refresh_interval_secs = self.refresh_interval_secs.max(MIN_REFRESH_SECS);
    }
}

/// Saved settings merged with the command line, plus the file to save back to.
pub fn load_runtime_settings(cli: &Cli, enable_disk: bool) -> (RuntimeSettings, Option<PathBuf>) {
    let path = if enable_disk { settings_path() } else { None };
    let settings = load_runtime_settings_from(cli, path.as_deref());
    (settings, path)
}

pub fn load_runtime_settings_from(cli: &Cli, path: Option<&Path>) -> RuntimeSettings {
    let mut settings = path.and_then(read_saved).unwrap_or_default();
    settings.apply_cli(cli);
    settings
}

fn read_saved(path: &Path) -> Option<RuntimeSettings> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<RuntimeSettings>(&content) {
        Ok(saved) => {
            debug!(path = %path.display(), "loaded saved settings");
            Some(saved)
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            None
        }
    }
}

pub fn save_runtime_settings(path: &Path, settings: &RuntimeSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("creating settings directory failed")?;
    }
    let payload =
        serde_json::to_string_pretty(settings).context("serializing settings payload failed")?;
    fs::write(path, payload).context("writing settings file failed")
}

fn settings_path() -> Option<PathBuf> {
    if let Some(base) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(base).join("settings.json"));
    }

    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("weather-lens")
            .join("settings.json"),
    )
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["weather-lens"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn defaults_without_disk() {
        let settings = load_runtime_settings_from(&cli(&[]), None);
        assert_eq!(settings, RuntimeSettings::default());
    }

    #[test]
    fn saved_values_survive_when_flags_are_absent() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("settings.json");
        let saved = RuntimeSettings {
            provider: ProviderKind::WeatherApi,
            units: Units::Fahrenheit,
            refresh_interval_secs: 120,
        };
        save_runtime_settings(&path, &saved).expect("save settings");

        let loaded = load_runtime_settings_from(&cli(&[]), Some(&path));
        assert_eq!(loaded, saved);
    }

    #[test]
    fn flags_override_saved_values() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("settings.json");
        save_runtime_settings(
            &path,
            &RuntimeSettings {
                provider: ProviderKind::WeatherApi,
                ..RuntimeSettings::default()
            },
        )
        .expect("save settings");

        let loaded = load_runtime_settings_from(
            &cli(&["--provider", "open-meteo", "--units", "fahrenheit"]),
            Some(&path),
        );
        assert_eq!(loaded.provider, ProviderKind::OpenMeteo);
        assert_eq!(loaded.units, Units::Fahrenheit);
    }

    #[test]
    fn refresh_interval_is_clamped() {
        let loaded = load_runtime_settings_from(&cli(&["--refresh-interval", "3"]), None);
        assert_eq!(loaded.refresh_interval_secs, MIN_REFRESH_SECS);
    }

    #[test]
    fn corrupt_or_partial_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("settings.json");

        fs::write(&path, "{not json").expect("write");
        assert_eq!(
            load_runtime_settings_from(&cli(&[]), Some(&path)),
            RuntimeSettings::default()
        );

        fs::write(&path, r#"{"units":"Fahrenheit"}"#).expect("write");
        let partial = load_runtime_settings_from(&cli(&[]), Some(&path));
        assert_eq!(partial.units, Units::Fahrenheit);
        assert_eq!(partial.provider, ProviderKind::OpenMeteo);
    }
}
