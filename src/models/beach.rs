use crate::logic::geometry::{is_in_range, AngularInterval};
use serde::{Deserialize, Serialize};

/// How wind at a bearing meets a beach's shoreline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindCategory {
    Offshore,
    CrossShore,
    Onshore,
    Unknown,
}

impl WindCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindCategory::Offshore => "offshore",
            WindCategory::CrossShore => "cross_shore",
            WindCategory::Onshore => "onshore",
            WindCategory::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindCategory::Offshore => "Offshore (ideal)",
            WindCategory::CrossShore => "Cross-shore (marginal)",
            WindCategory::Onshore => "Onshore (avoid)",
            WindCategory::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for WindCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tide band a break works best on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TidePreset {
    Low,
    LowMid,
    Mid,
    MidHigh,
    High,
    All,
}

impl TidePreset {
    pub fn label(&self) -> &'static str {
        match self {
            TidePreset::Low => "Low",
            TidePreset::LowMid => "Low to Mid",
            TidePreset::Mid => "Mid",
            TidePreset::MidHigh => "Mid to High",
            TidePreset::High => "High",
            TidePreset::All => "All Tides",
        }
    }

    /// (min, max) tide height in metres
    pub fn range(&self) -> (f64, f64) {
        match self {
            TidePreset::Low => (0.0, 0.6),
            TidePreset::LowMid => (0.0, 1.2),
            TidePreset::Mid => (0.5, 1.5),
            TidePreset::MidHigh => (0.8, 2.2),
            TidePreset::High => (1.2, 2.5),
            TidePreset::All => (0.0, 2.5),
        }
    }
}

/// Directional profile of a surf beach.
///
/// Classification checks `offshore` first, then each `cross_shore` arc, and
/// calls anything left onshore. `onshore` is kept as catalog data and only
/// used to cross-check the other two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeachProfile {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub region: String,
    /// Best offshore bearing
    #[serde(default)]
    pub ideal: Option<f64>,
    pub offshore: AngularInterval,
    pub cross_shore: [AngularInterval; 2],
    pub onshore: AngularInterval,
    #[serde(default)]
    pub tide: Option<TidePreset>,
}

/// Bearings where the stored onshore arc disagrees with classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    /// Classified onshore but outside the stored onshore arc
    pub gaps: Vec<f64>,
    /// Classified offshore or cross-shore but strictly inside the onshore arc
    pub overlaps: Vec<f64>,
}

impl CoverageReport {
    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty() && self.overlaps.is_empty()
    }
}

const COVERAGE_STEP: f64 = 0.5;

impl BeachProfile {
    pub fn classify(&self, degrees: f64) -> WindCategory {
        if is_in_range(degrees, &self.offshore) {
            return WindCategory::Offshore;
        }

        if self.cross_shore.iter().any(|r| is_in_range(degrees, r)) {
            return WindCategory::CrossShore;
        }

        WindCategory::Onshore
    }

    pub fn coverage(&self) -> CoverageReport {
        let mut report = CoverageReport::default();
        let steps = (360.0 / COVERAGE_STEP) as usize;

        for step in 0..steps {
            let bearing = step as f64 * COVERAGE_STEP;
            let stored_onshore = self.onshore.contains(bearing);
            match self.classify(bearing) {
                WindCategory::Onshore if !stored_onshore => report.gaps.push(bearing),
                WindCategory::Offshore | WindCategory::CrossShore
                    if stored_onshore && !self.onshore.is_endpoint(bearing) =>
                {
                    report.overlaps.push(bearing)
                }
                _ => {}
            }
        }

        report
    }
}
