use crate::models::WindCategory;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_MIN_SWELL: f64 = 1.0;
pub const DEFAULT_MAX_SWELL: f64 = 3.0;
pub const DEFAULT_MIN_TIDE: f64 = 0.0;
pub const DEFAULT_MAX_TIDE: f64 = 2.0;
pub const DEFAULT_OFFSHORE_MAX_WIND: f64 = 25.0;
pub const DEFAULT_CROSS_SHORE_MAX_WIND: f64 = 10.0;
pub const DEFAULT_ONSHORE_MAX_WIND: f64 = 5.0;
pub const DEFAULT_START_HOUR: u32 = 5;
pub const DEFAULT_END_HOUR: u32 = 18;

/// A subscriber's surf preferences as read from the user store.
///
/// Heights are metres, wind ceilings km/h, hours are local clock hours with
/// `end_hour` exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "UserRow")]
pub struct UserPreference {
    pub id: String,
    pub email: String,
    pub name: String,
    pub beach_id: Option<u32>,
    pub beach_name: String,
    pub min_swell: f64,
    pub max_swell: f64,
    pub min_tide: f64,
    pub max_tide: f64,
    pub offshore_max_wind: f64,
    pub cross_shore_max_wind: f64,
    pub onshore_max_wind: f64,
    pub start_hour: u32,
    pub end_hour: u32,
    pub last_alert_at: Option<DateTime<FixedOffset>>,
}

#[cfg(test)]
impl UserPreference {
    pub fn new(id: impl Into<String>, email: impl Into<String>, beach_id: u32) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            beach_id: Some(beach_id),
            ..Self::default()
        }
    }

    pub fn with_swell(mut self, min: f64, max: f64) -> Self {
        self.min_swell = min;
        self.max_swell = max;
        self
    }

    pub fn with_tide(mut self, min: f64, max: f64) -> Self {
        self.min_tide = min;
        self.max_tide = max;
        self
    }

    pub fn with_wind_limits(mut self, offshore: f64, cross_shore: f64, onshore: f64) -> Self {
        self.offshore_max_wind = offshore;
        self.cross_shore_max_wind = cross_shore;
        self.onshore_max_wind = onshore;
        self
    }

    pub fn with_hours(mut self, start: u32, end: u32) -> Self {
        self.start_hour = start;
        self.end_hour = end;
        self
    }
}

impl UserPreference {
    /// `[start_hour, end_hour)`. A window that crosses midnight never matches.
    pub fn in_alert_hours(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }

    pub fn swell_ok(&self, height: f64) -> bool {
        self.min_swell <= height && height <= self.max_swell
    }

    pub fn tide_ok(&self, height: f64) -> bool {
        self.min_tide <= height && height <= self.max_tide
    }

    pub fn max_wind_for(&self, category: WindCategory) -> Option<f64> {
        match category {
            WindCategory::Offshore => Some(self.offshore_max_wind),
            WindCategory::CrossShore => Some(self.cross_shore_max_wind),
            WindCategory::Onshore => Some(self.onshore_max_wind),
            WindCategory::Unknown => None,
        }
    }
}

impl Default for UserPreference {
    fn default() -> Self {
        Self {
            id: String::new(),
            email: String::new(),
            name: "Surfer".into(),
            beach_id: None,
            beach_name: "Unknown Beach".into(),
            min_swell: DEFAULT_MIN_SWELL,
            max_swell: DEFAULT_MAX_SWELL,
            min_tide: DEFAULT_MIN_TIDE,
            max_tide: DEFAULT_MAX_TIDE,
            offshore_max_wind: DEFAULT_OFFSHORE_MAX_WIND,
            cross_shore_max_wind: DEFAULT_CROSS_SHORE_MAX_WIND,
            onshore_max_wind: DEFAULT_ONSHORE_MAX_WIND,
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            last_alert_at: None,
        }
    }
}

// Raw store row; every preference column may be null.
#[derive(Debug, Deserialize)]
struct UserRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    beach_id: Option<u32>,
    #[serde(default)]
    beach_name: Option<String>,
    #[serde(default)]
    min_swell: Option<f64>,
    #[serde(default)]
    max_swell: Option<f64>,
    #[serde(default)]
    min_tide: Option<f64>,
    #[serde(default)]
    max_tide: Option<f64>,
    #[serde(default)]
    offshore_max_wind: Option<f64>,
    #[serde(default)]
    cross_shore_max_wind: Option<f64>,
    #[serde(default)]
    onshore_max_wind: Option<f64>,
    #[serde(default)]
    start_hour: Option<u32>,
    #[serde(default)]
    end_hour: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    last_alert_at: Option<DateTime<FixedOffset>>,
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("invalid user id '{}'", other))),
    }
}

// RFC 3339, or a bare `timestamp` column value taken as UTC. Anything else
// is dropped rather than failing the row.
fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(t));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"));
    match naive {
        Ok(n) => Ok(Some(n.and_utc().fixed_offset())),
        Err(_) => {
            tracing::debug!("Ignoring unparseable last_alert_at {:?}", raw);
            Ok(None)
        }
    }
}

impl From<UserRow> for UserPreference {
    fn from(row: UserRow) -> Self {
        let defaults = UserPreference::default();
        Self {
            id: row.id,
            email: row.email.unwrap_or_default(),
            name: row
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(defaults.name),
            // 0 is what the signup form stores before a beach is picked
            beach_id: row.beach_id.filter(|id| *id != 0),
            beach_name: row.beach_name.unwrap_or(defaults.beach_name),
            min_swell: row.min_swell.unwrap_or(defaults.min_swell),
            max_swell: row.max_swell.unwrap_or(defaults.max_swell),
            min_tide: row.min_tide.unwrap_or(defaults.min_tide),
            max_tide: row.max_tide.unwrap_or(defaults.max_tide),
            offshore_max_wind: row.offshore_max_wind.unwrap_or(defaults.offshore_max_wind),
            cross_shore_max_wind: row
                .cross_shore_max_wind
                .unwrap_or(defaults.cross_shore_max_wind),
            onshore_max_wind: row.onshore_max_wind.unwrap_or(defaults.onshore_max_wind),
            start_hour: row.start_hour.unwrap_or(defaults.start_hour),
            end_hour: row.end_hour.unwrap_or(defaults.end_hour),
            last_alert_at: row.last_alert_at,
        }
    }
}
