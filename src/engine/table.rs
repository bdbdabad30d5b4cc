//! Per-provider condition code tables.
//!
//! Every provider numbers its conditions differently. A table maps those
//! codes onto [`SkyCondition`]; the rest of the engine only ever talks to the
//! [`ConditionTable`] trait, so a provider swap is a new table and nothing else.

use crate::domain::weather::{RainIntensity, SkyCondition};

/// Condition used for any code a table does not recognize.
pub const FALLBACK_CONDITION: SkyCondition = SkyCondition::Cloudy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRange {
    pub first: i32,
    pub last: i32,
    pub condition: SkyCondition,
    pub intensity: Option<RainIntensity>,
}

impl CodeRange {
    #[must_use]
    pub fn contains(&self, code: i32) -> bool {
        (self.first..=self.last).contains(&code)
    }
}

const fn band(first: i32, last: i32, condition: SkyCondition) -> CodeRange {
    CodeRange {
        first,
        last,
        condition,
        intensity: None,
    }
}

const fn code(code: i32, condition: SkyCondition) -> CodeRange {
    band(code, code, condition)
}

const fn rain(first: i32, last: i32, intensity: RainIntensity) -> CodeRange {
    CodeRange {
        first,
        last,
        condition: SkyCondition::Rain,
        intensity: Some(intensity),
    }
}

pub trait ConditionTable: Send + Sync {
    fn name(&self) -> &'static str;

    /// Entry for a code, `None` when the provider never documented it.
    fn lookup(&self, code: i32) -> Option<CodeRange>;

    /// Total mapping: unknown codes fall back to [`FALLBACK_CONDITION`].
    fn normalize(&self, code: i32) -> SkyCondition {
        self.lookup(code)
            .map_or(FALLBACK_CONDITION, |entry| entry.condition)
    }

    fn rain_intensity(&self, code: i32) -> Option<RainIntensity> {
        self.lookup(code).and_then(|entry| entry.intensity)
    }

    fn recognizes(&self, code: i32) -> bool {
        self.lookup(code).is_some()
    }
}

/// Static table of inclusive code ranges, first match wins.
#[derive(Debug, Clone, Copy)]
pub struct RangeTable {
    name: &'static str,
    ranges: &'static [CodeRange],
}

impl RangeTable {
    #[must_use]
    pub const fn new(name: &'static str, ranges: &'static [CodeRange]) -> Self {
        Self { name, ranges }
    }
}

impl ConditionTable for RangeTable {
    fn name(&self) -> &'static str {
        self.name
    }

    fn lookup(&self, code: i32) -> Option<CodeRange> {
        self.ranges.iter().copied().find(|range| range.contains(code))
    }
}

/// Free-function form of [`ConditionTable::normalize`].
#[must_use]
pub fn normalize(table: &dyn ConditionTable, code: i32) -> SkyCondition {
    table.normalize(code)
}

/// WMO weather interpretation codes (Open-Meteo).
pub static OPEN_METEO: RangeTable = RangeTable::new("open-meteo", OPEN_METEO_RANGES);

const OPEN_METEO_RANGES: &[CodeRange] = &[
    code(0, SkyCondition::Clear),
    band(1, 2, SkyCondition::PartlyCloudy),
    code(3, SkyCondition::Cloudy),
    band(45, 48, SkyCondition::Fog),
    band(51, 57, SkyCondition::Drizzle),
    rain(61, 61, RainIntensity::Light),
    rain(63, 63, RainIntensity::Moderate),
    rain(65, 65, RainIntensity::Heavy),
    band(66, 67, SkyCondition::Rain),
    band(71, 77, SkyCondition::Snow),
    rain(80, 80, RainIntensity::Light),
    rain(81, 81, RainIntensity::Moderate),
    rain(82, 82, RainIntensity::Heavy),
    band(85, 86, SkyCondition::Snow),
    band(95, i32::MAX, SkyCondition::Thunderstorm),
];

/// OpenWeatherMap condition ids.
pub static OPEN_WEATHER_MAP: RangeTable = RangeTable::new("openweathermap", OPEN_WEATHER_MAP_RANGES);

const OPEN_WEATHER_MAP_RANGES: &[CodeRange] = &[
    band(200, 299, SkyCondition::Thunderstorm),
    band(300, 399, SkyCondition::Drizzle),
    rain(500, 500, RainIntensity::Light),
    rain(501, 501, RainIntensity::Moderate),
    rain(502, 504, RainIntensity::Heavy),
    band(505, 599, SkyCondition::Rain),
    band(600, 699, SkyCondition::Snow),
    band(700, 799, SkyCondition::Fog),
    code(800, SkyCondition::Clear),
    band(801, 802, SkyCondition::PartlyCloudy),
    band(803, 804, SkyCondition::Cloudy),
];

/// WeatherAPI.com condition codes.
pub static WEATHER_API: RangeTable = RangeTable::new("weatherapi", WEATHER_API_RANGES);

const WEATHER_API_RANGES: &[CodeRange] = &[
    code(1000, SkyCondition::Clear),
    code(1003, SkyCondition::PartlyCloudy),
    code(1006, SkyCondition::Cloudy),
    code(1009, SkyCondition::Cloudy),
    code(1030, SkyCondition::Fog),
    code(1063, SkyCondition::Rain),
    code(1066, SkyCondition::Snow),
    code(1069, SkyCondition::Snow),
    code(1072, SkyCondition::Drizzle),
    code(1087, SkyCondition::Thunderstorm),
    code(1114, SkyCondition::Snow),
    code(1117, SkyCondition::Snow),
    code(1135, SkyCondition::Fog),
    code(1147, SkyCondition::Fog),
    band(1150, 1153, SkyCondition::Drizzle),
    band(1168, 1171, SkyCondition::Drizzle),
    rain(1180, 1183, RainIntensity::Light),
    rain(1186, 1189, RainIntensity::Moderate),
    rain(1192, 1195, RainIntensity::Heavy),
    band(1198, 1201, SkyCondition::Rain),
    band(1204, 1237, SkyCondition::Snow),
    rain(1240, 1240, RainIntensity::Light),
    rain(1243, 1243, RainIntensity::Moderate),
    rain(1246, 1246, RainIntensity::Heavy),
    band(1249, 1264, SkyCondition::Snow),
    band(1273, 1282, SkyCondition::Thunderstorm),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_meteo_bands() {
        assert_eq!(OPEN_METEO.normalize(0), SkyCondition::Clear);
        assert_eq!(OPEN_METEO.normalize(2), SkyCondition::PartlyCloudy);
        assert_eq!(OPEN_METEO.normalize(3), SkyCondition::Cloudy);
        assert_eq!(OPEN_METEO.normalize(48), SkyCondition::Fog);
        assert_eq!(OPEN_METEO.normalize(55), SkyCondition::Drizzle);
        assert_eq!(OPEN_METEO.normalize(67), SkyCondition::Rain);
        assert_eq!(OPEN_METEO.normalize(86), SkyCondition::Snow);
        assert_eq!(OPEN_METEO.normalize(96), SkyCondition::Thunderstorm);
        assert_eq!(OPEN_METEO.normalize(99), SkyCondition::Thunderstorm);
        assert_eq!(OPEN_METEO.normalize(100), SkyCondition::Thunderstorm);
        assert_eq!(OPEN_METEO.rain_intensity(63), Some(RainIntensity::Moderate));
    }

    #[test]
    fn open_weather_map_bands() {
        assert_eq!(OPEN_WEATHER_MAP.normalize(211), SkyCondition::Thunderstorm);
        assert_eq!(OPEN_WEATHER_MAP.normalize(310), SkyCondition::Drizzle);
        assert_eq!(OPEN_WEATHER_MAP.normalize(521), SkyCondition::Rain);
        assert_eq!(OPEN_WEATHER_MAP.normalize(601), SkyCondition::Snow);
        assert_eq!(OPEN_WEATHER_MAP.normalize(741), SkyCondition::Fog);
        assert_eq!(OPEN_WEATHER_MAP.normalize(800), SkyCondition::Clear);
        assert_eq!(OPEN_WEATHER_MAP.normalize(801), SkyCondition::PartlyCloudy);
        assert_eq!(OPEN_WEATHER_MAP.normalize(803), SkyCondition::Cloudy);
        assert_eq!(OPEN_WEATHER_MAP.rain_intensity(500), Some(RainIntensity::Light));
        assert_eq!(OPEN_WEATHER_MAP.rain_intensity(503), Some(RainIntensity::Heavy));
        assert_eq!(OPEN_WEATHER_MAP.rain_intensity(521), None);
    }

    #[test]
    fn weather_api_codes() {
        assert_eq!(WEATHER_API.normalize(1000), SkyCondition::Clear);
        assert_eq!(WEATHER_API.normalize(1009), SkyCondition::Cloudy);
        assert_eq!(WEATHER_API.normalize(1135), SkyCondition::Fog);
        assert_eq!(WEATHER_API.normalize(1153), SkyCondition::Drizzle);
        assert_eq!(WEATHER_API.normalize(1195), SkyCondition::Rain);
        assert_eq!(WEATHER_API.normalize(1225), SkyCondition::Snow);
        assert_eq!(WEATHER_API.normalize(1276), SkyCondition::Thunderstorm);
        assert_eq!(WEATHER_API.rain_intensity(1189), Some(RainIntensity::Moderate));
    }

    #[test]
    fn undocumented_codes_fall_back_to_cloudy() {
        for table in [&OPEN_METEO, &OPEN_WEATHER_MAP, &WEATHER_API] {
            for code in [-1, 4, 58, 94, 400, 805, 1001, 9999, i32::MIN, i32::MAX] {
                if !table.recognizes(code) {
                    assert_eq!(table.normalize(code), SkyCondition::Cloudy);
                }
            }
        }
        assert!(!OPEN_METEO.recognizes(94));
        assert!(!OPEN_WEATHER_MAP.recognizes(400));
        assert!(!WEATHER_API.recognizes(1001));
    }

    #[test]
    fn tables_have_no_overlapping_ranges() {
        for table in [&OPEN_METEO, &OPEN_WEATHER_MAP, &WEATHER_API] {
            let ranges = table.ranges;
            for (i, a) in ranges.iter().enumerate() {
                assert!(a.first <= a.last, "{} has an inverted range", table.name());
                for b in &ranges[i + 1..] {
                    assert!(
                        a.last < b.first || b.last < a.first,
                        "{} overlaps at {}..={}",
                        table.name(),
                        b.first,
                        b.last
                    );
                }
            }
        }
    }
}
