use serde::{Deserialize, Serialize};

const CATEGORICAL_STEP: f32 = 50.0;
const MAX_INDEX: f32 = 500.0;

/// How a provider reports air quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirQualityScale {
    /// Already on the US AQI 0-500 scale.
    UsAqi,
    /// Small categorical band (1-5 or 1-6) that is stretched by 50 per step.
    Categorical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirQualityCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
}

impl AirQualityCategory {
    #[must_use]
    pub fn from_index(value: u16) -> Self {
        match value {
            0..=50 => AirQualityCategory::Good,
            51..=100 => AirQualityCategory::Moderate,
            101..=150 => AirQualityCategory::UnhealthyForSensitive,
            _ => AirQualityCategory::Unhealthy,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AirQualityCategory::Good => "Good",
            AirQualityCategory::Moderate => "Moderate",
            AirQualityCategory::UnhealthyForSensitive => "Unhealthy for sensitive groups",
            AirQualityCategory::Unhealthy => "Unhealthy",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            AirQualityCategory::Good => "#00E400",
            AirQualityCategory::Moderate => "#FFFF00",
            AirQualityCategory::UnhealthyForSensitive => "#FF7E00",
            AirQualityCategory::Unhealthy => "#FF0000",
        }
    }
}

/// Air quality on a single 0-500 display scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirQualityIndex {
    pub value: u16,
    pub category: AirQualityCategory,
}

impl AirQualityIndex {
    /// Normalizes a provider reading. Non-finite or negative readings yield `None`.
    #[must_use]
    pub fn from_reading(raw: f32, scale: AirQualityScale) -> Option<Self> {
        if !raw.is_finite() || raw < 0.0 {
            return None;
        }
        let scaled = match scale {
            AirQualityScale::UsAqi => raw,
            AirQualityScale::Categorical => raw * CATEGORICAL_STEP,
        };
        let value = scaled.round().min(MAX_INDEX) as u16;
        Some(Self {
            value,
            category: AirQualityCategory::from_index(value),
        })
    }
}
