//! Validation priority levels
//!
//! Defines how severe a validation failure is. Publishers compare a result's
//! priority against their threshold to decide whether to notify.

use serde::{Deserialize, Serialize};

/// Priority of a validation, ordered `Low < Normal < Critical`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Recorded for posterity, not reported to a human
    Low,
    /// Reported to a human, but nobody gets woken up
    #[default]
    Normal,
    /// Someone gets paged
    Critical,
}

impl Priority {
    /// All priorities in ascending order
    pub const ALL: [Self; 3] = [Self::Low, Self::Normal, Self::Critical];

    /// Whether a result of priority `self` clears `threshold`
    ///
    /// A missing threshold means "publish everything".
    #[must_use]
    pub fn meets(self, threshold: Option<Self>) -> bool {
        threshold.is_none_or(|t| t <= self)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Invalid priority: {s}. Use: low, normal, critical")),
        }
    }
}

/// Render an optional threshold for humans
#[must_use]
pub fn threshold_label(threshold: Option<Priority>) -> String {
    threshold.map_or_else(|| "any".to_string(), |p| p.to_string())
}
