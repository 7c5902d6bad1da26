use crate::logic::geometry::{degrees_to_compass, parse_compass};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Local-time key format shared by every forecast series.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a series key in the surf timezone. `None` for malformed keys.
pub fn parse_local_timestamp(raw: &str, tz: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok()?;
    tz.from_local_datetime(&naive).single()
}

/// One entry of a forecast time series, keyed by its raw local timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry<T> {
    pub date_time: String,
    pub value: T,
}

impl<T> SeriesEntry<T> {
    pub fn new(date_time: impl Into<String>, value: T) -> Self {
        Self {
            date_time: date_time.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WindDirection {
    Compass(String),
    Degrees(f64),
}

impl WindDirection {
    /// Bearing in `[0, 360)`, or `None` for an unrecognised label.
    pub fn degrees(&self) -> Option<f64> {
        match self {
            WindDirection::Compass(label) => parse_compass(label),
            WindDirection::Degrees(d) if d.is_finite() => Some(d.rem_euclid(360.0)),
            WindDirection::Degrees(_) => None,
        }
    }
}

impl std::fmt::Display for WindDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindDirection::Compass(label) => write!(f, "{}", label),
            WindDirection::Degrees(d) => write!(f, "{} ({}°)", degrees_to_compass(*d), d),
        }
    }
}

/// Forecast wind at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindForecast {
    pub speed_kmh: Option<f64>,
    pub direction: Option<WindDirection>,
}

/// Swell, tide and wind series for one beach, in provider order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub swell: Vec<SeriesEntry<f64>>,
    pub tide: Vec<SeriesEntry<f64>>,
    pub wind: Vec<SeriesEntry<WindForecast>>,
}

/// A timestamp whose swell and tide suit the user, pending a wind check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastWindow {
    pub time: DateTime<FixedOffset>,
    pub swell_m: f64,
    pub tide_m: f64,
    pub wind_forecast: Option<WindForecast>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindSource {
    Live,
    Forecast,
    Unavailable,
}

impl WindSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindSource::Live => "Live",
            WindSource::Forecast => "Forecast",
            WindSource::Unavailable => "None",
        }
    }
}

impl std::fmt::Display for WindSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wind used for a go/no-go check, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindReading {
    pub speed_kmh: Option<f64>,
    pub direction: Option<WindDirection>,
    pub gust_kmh: Option<f64>,
    pub source: WindSource,
}

impl WindReading {
    #[cfg(test)]
    pub fn live(speed_kmh: f64, direction: WindDirection, gust_kmh: Option<f64>) -> Self {
        Self {
            speed_kmh: Some(speed_kmh),
            direction: Some(direction),
            gust_kmh,
            source: WindSource::Live,
        }
    }

    pub fn from_forecast(forecast: &WindForecast) -> Self {
        Self {
            speed_kmh: forecast.speed_kmh,
            direction: forecast.direction.clone(),
            gust_kmh: None,
            source: WindSource::Forecast,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            speed_kmh: None,
            direction: None,
            gust_kmh: None,
            source: WindSource::Unavailable,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.speed_kmh.is_some() && self.direction.is_some()
    }

    pub fn speed_text(&self) -> String {
        match self.speed_kmh {
            Some(s) => format!("{} km/h", s),
            None => "n/a km/h".to_string(),
        }
    }

    pub fn direction_text(&self) -> String {
        match &self.direction {
            Some(d) => d.to_string(),
            None => "N/A".to_string(),
        }
    }
}

impl std::fmt::Display for WindReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} from {}", self.speed_text(), self.direction_text())?;
        if let Some(gust) = self.gust_kmh {
            write!(f, " (gusting {} km/h)", gust)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn aest() -> FixedOffset {
        FixedOffset::east_opt(10 * 3600).unwrap()
    }

    #[test]
    fn parses_local_keys() {
        let t = parse_local_timestamp("2026-03-01 06:00:00", &aest()).unwrap();
        assert_eq!(t.hour(), 6);
        assert_eq!(t.to_rfc3339(), "2026-03-01T06:00:00+10:00");
    }

    #[test]
    fn malformed_keys_are_none() {
        assert!(parse_local_timestamp("2026-03-01T06:00:00", &aest()).is_none());
        assert!(parse_local_timestamp("", &aest()).is_none());
        assert!(parse_local_timestamp("2026-13-01 06:00:00", &aest()).is_none());
    }

    #[test]
    fn direction_degrees() {
        assert_eq!(WindDirection::Compass("sse".into()).degrees(), Some(157.5));
        assert_eq!(WindDirection::Compass("N/A".into()).degrees(), None);
        assert_eq!(WindDirection::Degrees(370.0).degrees(), Some(10.0));
        assert_eq!(WindDirection::Degrees(f64::NAN).degrees(), None);
    }

    #[test]
    fn reading_display() {
        let live = WindReading::live(14.0, WindDirection::Compass("SW".into()), Some(22.0));
        assert_eq!(live.to_string(), "14 km/h from SW (gusting 22 km/h)");
        assert_eq!(
            WindReading::unavailable().to_string(),
            "n/a km/h from N/A"
        );
        let raw = WindReading::live(8.0, WindDirection::Degrees(200.0), None);
        assert_eq!(raw.direction_text(), "SSW (200°)");
    }

    #[test]
    fn completeness() {
        let partial = WindReading {
            speed_kmh: Some(10.0),
            direction: None,
            gust_kmh: None,
            source: WindSource::Live,
        };
        assert!(!partial.is_complete());
        assert!(!WindReading::unavailable().is_complete());
    }
}
