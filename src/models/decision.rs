use crate::models::{ForecastWindow, WindCategory, WindReading};
use serde::{Deserialize, Serialize};

/// Outcome of a single wind check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindVerdict {
    pub accepted: bool,
    pub category: WindCategory,
    pub rationale: String,
}

/// Why a user was not evaluated this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NoBeach,
    AlreadyAlerted,
    OutsideAlertHours,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoBeach => "no beach configured",
            SkipReason::AlreadyAlerted => "already alerted today",
            SkipReason::OutsideAlertHours => "outside alert hours",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    /// Preconditions failed; no data source was consulted.
    Skipped(SkipReason),
    /// No forecast timestamp matched swell, tide and hours.
    NoWindow,
    /// Every window inside the lookahead failed the wind check. Empty when
    /// all windows are still too far away.
    WindRejected(Vec<String>),
    /// Conditions met; the alert should go out.
    Sent {
        window: ForecastWindow,
        wind: WindReading,
        rationale: String,
    },
}

impl Decision {
    pub fn is_sent(&self) -> bool {
        matches!(self, Decision::Sent { .. })
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Skipped(reason) => write!(f, "skipped: {}", reason.as_str()),
            Decision::NoWindow => write!(f, "no matching swell/tide windows"),
            Decision::WindRejected(reasons) if reasons.is_empty() => {
                write!(f, "no window within the lookahead yet")
            }
            Decision::WindRejected(reasons) => {
                write!(f, "wind not ideal: {}", reasons.join("; "))
            }
            Decision::Sent {
                window, rationale, ..
            } => write!(
                f,
                "conditions met at {}: {}",
                window.time.format("%H:%M"),
                rationale
            ),
        }
    }
}
