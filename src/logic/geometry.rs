//! Compass and circular-range arithmetic for wind bearings.

use crate::error::{Result, SwellCheckError};
use crate::logic::registry::BeachRegistry;
use crate::models::WindCategory;
use serde::{Deserialize, Serialize};

/// Returned by [`compass_to_degrees`] for labels outside the 16-point table.
pub const INVALID_BEARING: f64 = -1.0;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const POINT_SPACING: f64 = 22.5;

/// Bearing of a 16-point compass label, case-insensitive.
pub fn parse_compass(label: &str) -> Option<f64> {
    let label = label.trim();
    COMPASS_POINTS
        .iter()
        .position(|p| p.eq_ignore_ascii_case(label))
        .map(|idx| idx as f64 * POINT_SPACING)
}

/// Bearing of a compass label, or [`INVALID_BEARING`] when the label is unknown.
pub fn compass_to_degrees(label: &str) -> f64 {
    parse_compass(label).unwrap_or(INVALID_BEARING)
}

/// Nearest 16-point label for a bearing.
pub fn degrees_to_compass(degrees: f64) -> &'static str {
    let idx = (degrees.rem_euclid(360.0) / POINT_SPACING).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[idx]
}

/// A clockwise arc of bearings from `start` to `end`, closed at both ends.
///
/// Both bounds lie in `[0, 360]`; 360 is accepted as another name for the
/// seam so catalog entries like `(315, 360)` load unchanged. When
/// `start > end` the arc wraps through north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct AngularInterval {
    start: f64,
    end: f64,
}

impl AngularInterval {
    pub fn new(start: f64, end: f64) -> Result<Self> {
        for bound in [start, end] {
            if !bound.is_finite() || !(0.0..=360.0).contains(&bound) {
                return Err(SwellCheckError::InvalidData(format!(
                    "bearing {} outside 0-360",
                    bound
                )));
            }
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, degrees: f64) -> bool {
        if self.wraps() {
            degrees >= self.start || degrees <= self.end
        } else {
            self.start <= degrees && degrees <= self.end
        }
    }

    /// True when `degrees` names the same bearing as either endpoint.
    pub fn is_endpoint(&self, degrees: f64) -> bool {
        [self.start, self.end]
            .iter()
            .any(|b| (degrees - b).rem_euclid(360.0) == 0.0)
    }
}

impl TryFrom<(f64, f64)> for AngularInterval {
    type Error = SwellCheckError;

    fn try_from((start, end): (f64, f64)) -> Result<Self> {
        Self::new(start, end)
    }
}

impl From<AngularInterval> for (f64, f64) {
    fn from(interval: AngularInterval) -> Self {
        (interval.start, interval.end)
    }
}

impl std::fmt::Display for AngularInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{} ({}°-{}°)",
            degrees_to_compass(self.start),
            degrees_to_compass(self.end),
            self.start,
            self.end
        )
    }
}

pub fn is_in_range(degrees: f64, interval: &AngularInterval) -> bool {
    interval.contains(degrees)
}

/// Classify a bearing for a catalog beach. `Unknown` only when the beach is
/// not in the registry.
pub fn classify_wind(degrees: f64, beach_id: u32, registry: &BeachRegistry) -> WindCategory {
    match registry.get(beach_id) {
        Some(beach) => beach.classify(degrees),
        None => WindCategory::Unknown,
    }
}
