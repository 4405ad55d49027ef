// SPDX-License-Identifier: MIT

//! Occupancy reading types and the shared level/confidence scales.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Percentage at or above which a reading counts as Moderate.
pub const MODERATE_THRESHOLD: u32 = 35;
/// Percentage at or above which a reading counts as High.
pub const HIGH_THRESHOLD: u32 = 75;

/// Minutes after which a reading is considered delayed.
pub const DEFAULT_STALE_AFTER_MINUTES: i64 = 5;

/// Busyness bucket derived from an occupancy percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupancyLevel {
    Low,
    Moderate,
    High,
}

impl OccupancyLevel {
    /// Bucket a percentage using the 35/75 thresholds.
    ///
    /// These boundaries are reused everywhere a level is shown; changing
    /// them changes every card, chart, and forecast flag at once.
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage < MODERATE_THRESHOLD {
            OccupancyLevel::Low
        } else if percentage < HIGH_THRESHOLD {
            OccupancyLevel::Moderate
        } else {
            OccupancyLevel::High
        }
    }
}

/// Human label for a confidence percentage.
pub fn confidence_label(confidence: u32) -> &'static str {
    if confidence >= 80 {
        "High confidence"
    } else if confidence >= 60 {
        "Medium confidence"
    } else {
        "Low confidence"
    }
}

/// Whether a reading is older than `stale_after_minutes`.
pub fn is_stale(last_updated_at: DateTime<Utc>, now: DateTime<Utc>, stale_after_minutes: i64) -> bool {
    now.signed_duration_since(last_updated_at) > Duration::minutes(stale_after_minutes)
}

/// Live occupancy estimate for one gym.
///
/// Constructed fresh on every refresh: synthetic baseline, optionally
/// blended with real check-in signal, then location-specific adjustments.
/// Never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveOccupancyReading {
    pub gym_id: String,
    pub gym_name: String,
    /// Final adjusted percentage, 0-100
    pub percentage: u32,
    pub level: OccupancyLevel,
    pub estimated_headcount: u32,
    /// 0-100
    pub confidence: u32,
    /// Check-ins observed in the recent window
    pub check_in_count: u32,
    /// Attendance backed out of the check-in count, when real data exists
    pub estimated_actual_count: Option<u32>,
    pub capacity: u32,
    /// RFC3339
    pub last_updated_at: String,
}

/// One point of the synthetic 24-hour trend series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Hour label (e.g., "18:00")
    pub time: String,
    /// 0-100
    pub occupancy: u32,
}

/// One point of the synthetic 12-hour forecast series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionPoint {
    /// Hour label (e.g., "19:00")
    pub time: String,
    /// 0-100
    pub predicted: u32,
    pub lower_bound: u32,
    pub upper_bound: u32,
    /// Predicted occupancy meets the High threshold
    pub peak_window: bool,
}

/// One row of the synthetic weekly heatmap (a day with six time slots).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapRow {
    /// Day label ("Mon" .. "Sun")
    pub day: String,
    /// Occupancy per slot, aligned with [`HEATMAP_SLOTS`]
    pub slots: Vec<u32>,
}

/// Time slot labels for the weekly heatmap.
pub const HEATMAP_SLOTS: [&str; 6] = ["6a", "9a", "12p", "3p", "6p", "9p"];
