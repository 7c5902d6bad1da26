use crate::logic::registry::BeachRegistry;
use crate::models::{UserPreference, WindCategory, WindReading, WindVerdict};

/// Decide whether `wind` suits `user` at `beach_id`.
///
/// Acceptance requires a known direction, a known speed, and
/// `speed <= ceiling` for the wind's category. Anything missing rejects.
pub fn evaluate(
    wind: &WindReading,
    user: &UserPreference,
    beach_id: u32,
    registry: &BeachRegistry,
) -> WindVerdict {
    let direction = wind.direction_text();

    let degrees = match wind.direction.as_ref().and_then(|d| d.degrees()) {
        Some(d) => d,
        None => return reject(WindCategory::Unknown, format!("Unknown wind direction: {}", direction)),
    };

    let beach = match registry.get(beach_id) {
        Some(b) => b,
        None => return reject(WindCategory::Unknown, format!("Unknown beach: {}", beach_id)),
    };

    let category = beach.classify(degrees);
    let label = category.label();
    let max_speed = match user.max_wind_for(category) {
        Some(m) => m,
        None => return reject(category, format!("{}: no wind limit", label)),
    };

    match wind.speed_kmh {
        Some(speed) if speed <= max_speed => WindVerdict {
            accepted: true,
            category,
            rationale: format!("{}: {} km/h {} (max: {})", label, speed, direction, max_speed),
        },
        Some(speed) => reject(
            category,
            format!("{}: {} km/h {} exceeds max {}", label, speed, direction, max_speed),
        ),
        None => reject(
            category,
            format!("{}: speed unavailable from {} (max: {})", label, direction, max_speed),
        ),
    }
}

fn reject(category: WindCategory, rationale: String) -> WindVerdict {
    WindVerdict {
        accepted: false,
        category,
        rationale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WindDirection, WindSource};
    use proptest::prelude::*;

    const NOOSA: u32 = 18159;

    fn registry() -> BeachRegistry {
        BeachRegistry::builtin().unwrap()
    }

    fn user() -> UserPreference {
        UserPreference::new("u1", "surfer@example.com", NOOSA).with_wind_limits(25.0, 10.0, 5.0)
    }

    fn compass(speed: f64, label: &str) -> WindReading {
        WindReading::live(speed, WindDirection::Compass(label.into()), None)
    }

    #[test]
    fn offshore_within_limit_accepted() {
        let verdict = evaluate(&compass(20.0, "S"), &user(), NOOSA, &registry());
        assert!(verdict.accepted);
        assert_eq!(verdict.category, WindCategory::Offshore);
        assert_eq!(verdict.rationale, "Offshore (ideal): 20 km/h S (max: 25)");
    }

    #[test]
    fn onshore_over_limit_rejected() {
        let verdict = evaluate(&compass(12.0, "N"), &user(), NOOSA, &registry());
        assert!(!verdict.accepted);
        assert_eq!(verdict.category, WindCategory::Onshore);
        assert!(verdict.rationale.contains("exceeds max 5"), "{}", verdict.rationale);
    }

    #[test]
    fn ceiling_is_inclusive() {
        let verdict = evaluate(&compass(10.0, "E"), &user(), NOOSA, &registry());
        assert!(verdict.accepted);
        assert_eq!(verdict.category, WindCategory::CrossShore);
    }

    #[test]
    fn unknown_label_is_hard_reject() {
        let verdict = evaluate(&compass(0.0, "XYZ"), &user(), NOOSA, &registry());
        assert!(!verdict.accepted);
        assert_eq!(verdict.category, WindCategory::Unknown);
        assert_eq!(verdict.rationale, "Unknown wind direction: XYZ");
    }

    #[test]
    fn missing_direction_is_unknown() {
        let wind = WindReading {
            speed_kmh: Some(1.0),
            direction: None,
            gust_kmh: None,
            source: WindSource::Forecast,
        };
        let verdict = evaluate(&wind, &user(), NOOSA, &registry());
        assert!(!verdict.accepted);
        assert_eq!(verdict.category, WindCategory::Unknown);
    }

    #[test]
    fn missing_speed_never_passes() {
        let wind = WindReading {
            speed_kmh: None,
            direction: Some(WindDirection::Compass("S".into())),
            gust_kmh: None,
            source: WindSource::Forecast,
        };
        let generous = user().with_wind_limits(1e9, 1e9, 1e9);
        let verdict = evaluate(&wind, &generous, NOOSA, &registry());
        assert!(!verdict.accepted);
        assert_eq!(verdict.category, WindCategory::Offshore);
    }

    #[test]
    fn unavailable_reading_rejected() {
        let verdict = evaluate(&WindReading::unavailable(), &user(), NOOSA, &registry());
        assert!(!verdict.accepted);
        assert_eq!(verdict.rationale, "Unknown wind direction: N/A");
    }

    #[test]
    fn unknown_beach_rejected() {
        let verdict = evaluate(&compass(1.0, "S"), &user(), 1, &registry());
        assert!(!verdict.accepted);
        assert_eq!(verdict.category, WindCategory::Unknown);
    }

    #[test]
    fn raw_bearing_accepted() {
        let wind = WindReading::live(15.0, WindDirection::Degrees(190.0), Some(20.0));
        let verdict = evaluate(&wind, &user(), NOOSA, &registry());
        assert!(verdict.accepted);
        assert_eq!(verdict.category, WindCategory::Offshore);
    }

    proptest! {
        #[test]
        fn prop_raising_ceiling_keeps_acceptance(
            speed in 0.0..60.0f64,
            ceiling in 0.0..60.0f64,
            raise in 0.0..30.0f64,
            point in 0usize..16,
        ) {
            let labels = ["N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE",
                          "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW"];
            let wind = compass(speed, labels[point]);
            let low = user().with_wind_limits(ceiling, ceiling, ceiling);
            let high = user().with_wind_limits(ceiling + raise, ceiling + raise, ceiling + raise);
            let before = evaluate(&wind, &low, NOOSA, &registry());
            let after = evaluate(&wind, &high, NOOSA, &registry());
            prop_assert!(!before.accepted || after.accepted);
            prop_assert_eq!(before.accepted, speed <= ceiling);
        }
    }
}
