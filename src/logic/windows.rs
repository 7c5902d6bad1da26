//! Correlates swell, tide and wind series into candidate surf windows.

use crate::models::{
    parse_local_timestamp, ForecastBundle, ForecastWindow, UserPreference, WindForecast,
};
use chrono::{DateTime, Duration, FixedOffset, Timelike};
use std::collections::{HashMap, HashSet};

/// Find every swell timestamp in `[now, now + horizon]` that falls in the
/// user's alert hours and whose swell and tide suit them.
///
/// Output follows the order of the swell series. A missing tide entry falls
/// back to the nearest tide reading in time; a missing wind entry leaves
/// `wind_forecast` empty. Malformed timestamps are skipped.
pub fn find_windows(
    bundle: &ForecastBundle,
    user: &UserPreference,
    now: DateTime<FixedOffset>,
    horizon: Duration,
) -> Vec<ForecastWindow> {
    let tz = *now.offset();
    let until = now + horizon;

    // Later duplicates overwrite earlier ones
    let swell: HashMap<&str, f64> = bundle
        .swell
        .iter()
        .map(|e| (e.date_time.as_str(), e.value))
        .collect();
    let tide: HashMap<&str, f64> = bundle
        .tide
        .iter()
        .map(|e| (e.date_time.as_str(), e.value))
        .collect();
    let wind: HashMap<&str, &WindForecast> = bundle
        .wind
        .iter()
        .map(|e| (e.date_time.as_str(), &e.value))
        .collect();

    // One point per key, first-seen order, carrying the same value as `tide`
    let mut tide_keys = HashSet::new();
    let tide_points: Vec<(DateTime<FixedOffset>, f64)> = bundle
        .tide
        .iter()
        .filter(|e| tide_keys.insert(e.date_time.as_str()))
        .filter_map(|e| {
            let key = e.date_time.as_str();
            parse_local_timestamp(key, &tz).map(|t| (t, tide[key]))
        })
        .collect();

    let mut seen = HashSet::new();
    let mut windows = Vec::new();

    for entry in &bundle.swell {
        let key = entry.date_time.as_str();
        if !seen.insert(key) {
            continue;
        }

        let Some(time) = parse_local_timestamp(key, &tz) else {
            tracing::debug!("Skipping malformed swell timestamp {:?}", key);
            continue;
        };

        if time < now || time > until {
            continue;
        }

        if !user.in_alert_hours(time.hour()) {
            continue;
        }

        let swell_m = swell[key];
        if !user.swell_ok(swell_m) {
            continue;
        }

        let tide_m = match tide.get(key) {
            Some(h) => Some(*h),
            None => nearest_tide(&tide_points, time),
        };
        let Some(tide_m) = tide_m.filter(|h| user.tide_ok(*h)) else {
            continue;
        };

        windows.push(ForecastWindow {
            time,
            swell_m,
            tide_m,
            wind_forecast: wind.get(key).map(|w| (*w).clone()),
        });
    }

    windows
}

/// Height of the tide reading closest in time to `at`; the earliest wins a tie.
fn nearest_tide(points: &[(DateTime<FixedOffset>, f64)], at: DateTime<FixedOffset>) -> Option<f64> {
    let mut best: Option<(i64, f64)> = None;
    for (time, height) in points {
        let diff = (*time - at).num_seconds().abs();
        if best.map_or(true, |(d, _)| diff < d) {
            best = Some((diff, *height));
        }
    }
    best.map(|(_, h)| h)
}
