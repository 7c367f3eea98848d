//! Flag badges and score banding for the presentation layer.

use serde::Serialize;

use crate::labels::FlagKind;
use crate::record::ReviewRecord;

/// A flag rendered as a coloured label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub flag: FlagKind,
    pub label: &'static str,
    pub color: &'static str,
}

impl From<FlagKind> for Badge {
    fn from(flag: FlagKind) -> Self {
        Self {
            flag,
            label: flag.label(),
            color: flag.badge_color(),
        }
    }
}

/// Badges for the record's active flags, in display order.
pub fn badges(record: &ReviewRecord) -> Vec<Badge> {
    record.active_flags().map(Badge::from).collect()
}

/// Coarse band for a score in `[0, 1]` (confidence or relevancy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 0.7 {
            Self::High
        } else if score >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// `0.81` → `"81.0%"`.
pub fn format_percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}
