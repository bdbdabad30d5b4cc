use serde::{Deserialize, Serialize};

/// Provider-independent sky/precipitation classification.
///
/// Variants are declared from least to most severe, so the derived `Ord`
/// gives `Thunderstorm > Snow > Rain > Drizzle > Fog > Cloudy > PartlyCloudy > Clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkyCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl SkyCondition {
    pub const ALL: [SkyCondition; 8] = [
        SkyCondition::Clear,
        SkyCondition::PartlyCloudy,
        SkyCondition::Cloudy,
        SkyCondition::Fog,
        SkyCondition::Drizzle,
        SkyCondition::Rain,
        SkyCondition::Snow,
        SkyCondition::Thunderstorm,
    ];

    /// Drizzle, rain, snow or thunder: precipitation is already part of the reading.
    #[must_use]
    pub fn is_precipitation(self) -> bool {
        matches!(
            self,
            SkyCondition::Drizzle
                | SkyCondition::Rain
                | SkyCondition::Snow
                | SkyCondition::Thunderstorm
        )
    }

    /// Clear or cloud cover only, no atmosphere or precipitation.
    #[must_use]
    pub fn is_sky_only(self) -> bool {
        matches!(
            self,
            SkyCondition::Clear | SkyCondition::PartlyCloudy | SkyCondition::Cloudy
        )
    }

    #[must_use]
    pub fn style(self) -> ConditionStyle {
        match self {
            SkyCondition::Clear => ConditionStyle {
                icon: "weather-sunny",
                glyph: "☀",
                color: "#FFD700",
                theme: BackgroundTheme::ClearDay,
            },
            SkyCondition::PartlyCloudy => ConditionStyle {
                icon: "weather-partly-cloudy",
                glyph: "⛅",
                color: "#00E0FF",
                theme: BackgroundTheme::Cloudy,
            },
            SkyCondition::Cloudy => ConditionStyle {
                icon: "weather-cloudy",
                glyph: "☁",
                color: "#B0C4DE",
                theme: BackgroundTheme::Cloudy,
            },
            SkyCondition::Fog => ConditionStyle {
                icon: "weather-fog",
                glyph: "░",
                color: "#E0E0E0",
                theme: BackgroundTheme::Cloudy,
            },
            SkyCondition::Drizzle => ConditionStyle {
                icon: "weather-partly-rainy",
                glyph: "☂",
                color: "#7FBFFF",
                theme: BackgroundTheme::Rain,
            },
            SkyCondition::Rain => ConditionStyle {
                icon: "weather-rainy",
                glyph: "☂",
                color: "#4DA6FF",
                theme: BackgroundTheme::Rain,
            },
            SkyCondition::Snow => ConditionStyle {
                icon: "weather-snowy",
                glyph: "❄",
                color: "#FFFFFF",
                theme: BackgroundTheme::Snow,
            },
            SkyCondition::Thunderstorm => ConditionStyle {
                icon: "weather-lightning",
                glyph: "⚡",
                color: "#FFCC00",
                theme: BackgroundTheme::Thunder,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundTheme {
    ClearDay,
    ClearNight,
    Cloudy,
    Rain,
    Snow,
    Thunder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionStyle {
    pub icon: &'static str,
    pub glyph: &'static str,
    pub color: &'static str,
    pub theme: BackgroundTheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RainIntensity {
    Light,
    Moderate,
    Heavy,
}

/// Human-readable label for a resolved condition.
///
/// `forced` marks a condition substituted from predicted precipitation; it
/// renders as a chance rather than a flat statement. `provider_text` is the
/// provider's own wording and is used only when the engine could not place
/// the code in its table.
#[must_use]
pub fn derive_label(
    condition: SkyCondition,
    forced: bool,
    intensity: Option<RainIntensity>,
    provider_text: Option<&str>,
) -> String {
    if forced {
        let label = if condition == SkyCondition::Snow {
            "Chance of Snow"
        } else {
            "Chance of Rain"
        };
        return label.to_string();
    }

    if let Some(text) = provider_text.map(str::trim).filter(|t| !t.is_empty()) {
        return text.to_string();
    }

    canonical_label(condition, intensity).to_string()
}

fn canonical_label(condition: SkyCondition, intensity: Option<RainIntensity>) -> &'static str {
    match condition {
        SkyCondition::Thunderstorm => "Thunderstorm",
        SkyCondition::Drizzle => "Drizzle",
        SkyCondition::Rain => match intensity {
            Some(RainIntensity::Light) => "Light Rain",
            Some(RainIntensity::Moderate) => "Moderate Rain",
            Some(RainIntensity::Heavy) => "Heavy Rain",
            None => "Rain",
        },
        SkyCondition::Snow => "Snow",
        SkyCondition::Fog => "Fog / Mist",
        SkyCondition::Clear => "Clear Sky",
        SkyCondition::PartlyCloudy => "Partly Cloudy",
        SkyCondition::Cloudy => "Cloudy",
    }
}

#[must_use]
pub fn derive_theme(condition: SkyCondition, is_daytime: bool) -> BackgroundTheme {
    match condition {
        SkyCondition::Clear if !is_daytime => BackgroundTheme::ClearNight,
        other => other.style().theme,
    }
}

/// Display colour for a temperature in Celsius.
#[must_use]
pub fn temperature_color(celsius: f32) -> &'static str {
    match celsius {
        t if t < 10.0 => "#2196F3",
        t if t < 18.0 => "#4CAF50",
        t if t < 25.0 => "#CDDC39",
        t if t < 32.0 => "#FF9800",
        t if t < 40.0 => "#F44336",
        _ => "#B71C1C",
    }
}
