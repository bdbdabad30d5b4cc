use serde::{Deserialize, Serialize};

use crate::domain::weather::{RawSample, SkyCondition};

/// Probability above which "now" is shown as a chance of rain.
pub const CURRENT_POP_THRESHOLD: f32 = 0.20;
/// Same rule applied to each slot of the hourly strip.
pub const HOURLY_POP_THRESHOLD: f32 = 0.25;
/// At or above this temperature precipitation is rain, below it snow.
pub const FREEZING_POINT_C: f32 = 0.0;

/// Why a condition was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideReason {
    /// Provider condition kept.
    None,
    /// Precipitation volume was reported for the sample window.
    Measured,
    /// Probability (or the provider's own verdict) predicted precipitation.
    Predicted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub condition: SkyCondition,
    pub reason: OverrideReason,
}

impl Resolution {
    #[must_use]
    pub fn kept(condition: SkyCondition) -> Self {
        Self {
            condition,
            reason: OverrideReason::None,
        }
    }

    /// Predicted overrides are labelled as a chance rather than a statement.
    #[must_use]
    pub fn forced(&self) -> bool {
        self.reason == OverrideReason::Predicted
    }
}

#[must_use]
pub fn precipitation_kind(temperature_c: f32) -> SkyCondition {
    if temperature_c >= FREEZING_POINT_C {
        SkyCondition::Rain
    } else {
        SkyCondition::Snow
    }
}

/// Reconciles the provider's condition with precipitation evidence, using
/// [`CURRENT_POP_THRESHOLD`].
#[must_use]
pub fn apply_precipitation_override(sample: &RawSample, base: SkyCondition) -> Resolution {
    apply_precipitation_override_with(sample, base, CURRENT_POP_THRESHOLD)
}

/// First matching rule wins:
/// 1. precipitation already in the reading: keep it;
/// 2. measured volume above zero: rain or snow by temperature;
/// 3. predicted precipitation on a clear/cloudy reading: rain or snow, forced.
///    The provider's own `will_precipitate` verdict replaces the probability
///    check when present.
#[must_use]
pub fn apply_precipitation_override_with(
    sample: &RawSample,
    base: SkyCondition,
    probability_threshold: f32,
) -> Resolution {
    if base.is_precipitation() {
        return Resolution::kept(base);
    }

    if sample.precipitation_volume_mm.is_some_and(|mm| mm > 0.0) {
        return Resolution {
            condition: precipitation_kind(sample.temperature_c),
            reason: OverrideReason::Measured,
        };
    }

    if !base.is_sky_only() {
        return Resolution::kept(base);
    }

    let predicted = match sample.will_precipitate {
        Some(verdict) => verdict,
        None => sample
            .precipitation_probability
            .is_some_and(|pop| pop > probability_threshold),
    };

    if predicted {
        Resolution {
            condition: precipitation_kind(sample.temperature_c),
            reason: OverrideReason::Predicted,
        }
    } else {
        Resolution::kept(base)
    }
}
