use crate::{domain::weather::SkyCondition, engine::table::ConditionTable};

/// A secondary condition only replaces the primary reading above this weight.
pub const SUBSTITUTION_THRESHOLD: u8 = 50;

/// Weights for simultaneous conditions on one sample.
///
/// Fog outranks drizzle here; [`daily_severity`] orders them the other way.
#[must_use]
pub fn multi_condition_severity(condition: SkyCondition) -> u8 {
    match condition {
        SkyCondition::Thunderstorm => 100,
        SkyCondition::Snow => 90,
        SkyCondition::Rain => 80,
        SkyCondition::Fog => 70,
        SkyCondition::Drizzle => 60,
        SkyCondition::Cloudy | SkyCondition::PartlyCloudy => 10,
        SkyCondition::Clear => 0,
    }
}

/// Weights used when picking one condition for a whole day.
#[must_use]
pub fn daily_severity(condition: SkyCondition) -> u8 {
    match condition {
        SkyCondition::Thunderstorm => 100,
        SkyCondition::Snow => 90,
        SkyCondition::Rain => 80,
        SkyCondition::Drizzle => 70,
        SkyCondition::Fog => 60,
        SkyCondition::Cloudy | SkyCondition::PartlyCloudy => 10,
        SkyCondition::Clear => 0,
    }
}

/// Most severe provider code in `codes`; ties keep the earliest entry.
#[must_use]
pub fn resolve_severity(table: &dyn ConditionTable, codes: &[i32]) -> Option<i32> {
    let mut best: Option<(i32, u8)> = None;
    for &code in codes {
        let weight = multi_condition_severity(table.normalize(code));
        match best {
            Some((_, best_weight)) if weight <= best_weight => {}
            _ => best = Some((code, weight)),
        }
    }
    best.map(|(code, _)| code)
}

/// Provider code that represents a sample carrying several conditions.
///
/// The primary code is kept unless a secondary one resolves above
/// [`SUBSTITUTION_THRESHOLD`].
#[must_use]
pub fn resolve_primary_code(table: &dyn ConditionTable, primary: i32, secondary: &[i32]) -> i32 {
    if secondary.is_empty() {
        return primary;
    }

    let mut codes = Vec::with_capacity(secondary.len() + 1);
    codes.push(primary);
    codes.extend_from_slice(secondary);

    match resolve_severity(table, &codes) {
        Some(code)
            if multi_condition_severity(table.normalize(code)) > SUBSTITUTION_THRESHOLD =>
        {
            code
        }
        _ => primary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::table::OPEN_WEATHER_MAP;

    #[test]
    fn highest_severity_wins() {
        assert_eq!(resolve_severity(&OPEN_WEATHER_MAP, &[701, 500, 211]), Some(211));
        assert_eq!(resolve_severity(&OPEN_WEATHER_MAP, &[500, 601]), Some(601));
        assert_eq!(resolve_severity(&OPEN_WEATHER_MAP, &[]), None);
    }

    #[test]
    fn ties_keep_first_in_list() {
        assert_eq!(resolve_severity(&OPEN_WEATHER_MAP, &[501, 500]), Some(501));
        assert_eq!(resolve_severity(&OPEN_WEATHER_MAP, &[804, 801]), Some(804));
    }

    #[test]
    fn fog_outranks_drizzle_for_simultaneous_conditions() {
        assert_eq!(resolve_severity(&OPEN_WEATHER_MAP, &[300, 701]), Some(701));
        assert!(daily_severity(SkyCondition::Drizzle) > daily_severity(SkyCondition::Fog));
    }

    #[test]
    fn rain_with_mist_resolves_to_rain() {
        assert_eq!(resolve_primary_code(&OPEN_WEATHER_MAP, 701, &[501]), 501);
    }

    #[test]
    fn clouds_alongside_clear_do_not_hide_it() {
        assert_eq!(resolve_primary_code(&OPEN_WEATHER_MAP, 800, &[801]), 800);
        assert_eq!(resolve_primary_code(&OPEN_WEATHER_MAP, 801, &[804]), 801);
    }

    #[test]
    fn single_condition_is_untouched() {
        assert_eq!(resolve_primary_code(&OPEN_WEATHER_MAP, 803, &[]), 803);
    }
}
