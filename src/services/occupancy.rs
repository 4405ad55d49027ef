// SPDX-License-Identifier: MIT

//! Occupancy estimation: synthetic baseline, check-in aggregation, and the
//! blended live reading.
//!
//! The pipeline for one reading:
//! 1. Synthesize a baseline from the signal source (stands in for a sensor feed)
//! 2. Aggregate recent check-ins into an adjusted percentage
//! 3. Blend the two and apply location-specific bumps
//! 4. Re-derive the level from the final percentage

use crate::models::check_in::CheckIn;
use crate::models::gym::{Gym, DEFAULT_CAPACITY};
use crate::models::occupancy::{
    HeatmapRow, LiveOccupancyReading, OccupancyLevel, PredictionPoint, TrendPoint, HEATMAP_SLOTS,
    HIGH_THRESHOLD,
};
use crate::services::directory::GymDirectoryService;
use crate::services::signal::SignalSource;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Duration, Timelike, Utc};
use std::sync::Arc;

/// Window of check-ins that count toward the live estimate.
pub const RECENT_WINDOW_MS: i64 = 15 * 60 * 1000;

/// Assumed fraction of actual attendees who check in through the app.
/// Estimated attendance is backed out by dividing observed check-ins by this.
pub const CHECK_IN_ADOPTION_RATE: f64 = 0.30;

/// Assumed peak headcount used to scale percentages when no real capacity
/// is in play.
const ASSUMED_PEAK_HEADCOUNT: f64 = 120.0;

/// Weight given to the check-in-derived percentage when blending.
/// The synthetic baseline keeps the remaining 0.6.
const REAL_SIGNAL_WEIGHT: f64 = 0.4;

/// Confidence boost applied when real check-in data backs the reading.
const REAL_DATA_CONFIDENCE_BOOST: u32 = 15;

/// Name shown when a gym id cannot be resolved.
const UNKNOWN_GYM_NAME: &str = "Unknown gym";

/// Baseline reading produced by the synthesizer.
#[derive(Debug, Clone)]
pub struct SyntheticReading {
    pub percentage: u32,
    pub estimated_headcount: u32,
    pub level: OccupancyLevel,
    pub confidence: u32,
    pub last_updated_at: DateTime<Utc>,
}

/// Check-in signal for one gym over the recent window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInAggregate {
    pub check_in_count: u32,
    /// Attendance backed out of the check-in count; `None` without real data
    pub estimated_actual_count: Option<u32>,
    /// Percentage of capacity; `None` without real data
    pub adjusted_percentage: Option<u32>,
}

impl CheckInAggregate {
    pub fn has_real_data(&self) -> bool {
        self.adjusted_percentage.is_some()
    }
}

/// Convert a window of raw check-ins for one gym into an adjusted estimate.
///
/// Only 30% of actual attendees are assumed to check in, so the observed
/// count is divided by the adoption rate before being sized against
/// capacity. Capacity falls back to the directory default when the gym is
/// unknown or doesn't report one.
pub fn aggregate_check_ins(
    gym_id: &str,
    check_ins: &[CheckIn],
    gym: Option<&Gym>,
    now_ms: i64,
) -> CheckInAggregate {
    let count = check_ins
        .iter()
        .filter(|c| c.gym_id == gym_id && c.within_window(now_ms, RECENT_WINDOW_MS))
        .count() as u32;

    if count == 0 {
        return CheckInAggregate {
            check_in_count: 0,
            estimated_actual_count: None,
            adjusted_percentage: None,
        };
    }

    let capacity = gym.map_or(DEFAULT_CAPACITY, Gym::effective_capacity);
    let estimated_actual = (f64::from(count) / CHECK_IN_ADOPTION_RATE).round() as u32;
    let adjusted = ((f64::from(estimated_actual) / f64::from(capacity)) * 100.0).round() as u32;

    CheckInAggregate {
        check_in_count: count,
        estimated_actual_count: Some(estimated_actual),
        adjusted_percentage: Some(adjusted.min(100)),
    }
}

/// Occupancy estimation service over an injected signal source.
#[derive(Clone)]
pub struct OccupancyService {
    signal: Arc<dyn SignalSource>,
}

impl OccupancyService {
    pub fn new(signal: Arc<dyn SignalSource>) -> Self {
        Self { signal }
    }

    /// Produce a baseline reading absent any real signal.
    pub fn synthesize(&self, now: DateTime<Utc>) -> SyntheticReading {
        let percentage = self.signal.next_in(100);
        let estimated_headcount =
            ((f64::from(percentage) / 100.0) * ASSUMED_PEAK_HEADCOUNT).round() as u32;
        let confidence = (55 + self.signal.next_in(40)).min(100);

        SyntheticReading {
            percentage,
            estimated_headcount,
            level: OccupancyLevel::from_percentage(percentage),
            confidence,
            last_updated_at: now,
        }
    }

    /// Blend the synthetic baseline with real check-in signal and
    /// location-specific adjustments into the displayed live reading.
    ///
    /// An unknown gym id degrades to a placeholder name and skips the
    /// brand/name bumps; the reading is still produced.
    pub fn live_reading(
        &self,
        gym_id: &str,
        check_ins: &[CheckIn],
        directory: &GymDirectoryService,
        now: DateTime<Utc>,
    ) -> LiveOccupancyReading {
        let baseline = self.synthesize(now);
        let gym = directory.get_by_id(gym_id);
        let aggregate = aggregate_check_ins(gym_id, check_ins, gym, now.timestamp_millis());

        let (mut percentage, confidence) = match aggregate.adjusted_percentage {
            Some(adjusted) => {
                let blended = REAL_SIGNAL_WEIGHT * f64::from(adjusted)
                    + (1.0 - REAL_SIGNAL_WEIGHT) * f64::from(baseline.percentage);
                (
                    blended.round() as u32,
                    (baseline.confidence + REAL_DATA_CONFIDENCE_BOOST).min(100),
                )
            }
            None => (baseline.percentage, baseline.confidence),
        };

        if let Some(gym) = gym {
            // Heuristic bumps observed to track real traffic patterns:
            // both are additive then capped, so order doesn't matter.
            if gym.brand.contains("Anytime") {
                percentage = (percentage + 5).min(100);
            }
            if gym.name.contains("Downtown") {
                percentage = (percentage + 10).min(100);
            }
        }

        let capacity = gym.map_or(DEFAULT_CAPACITY, Gym::effective_capacity);
        let gym_name = gym.map_or_else(|| UNKNOWN_GYM_NAME.to_string(), |g| g.name.clone());
        let estimated_headcount =
            ((f64::from(percentage) / 100.0) * ASSUMED_PEAK_HEADCOUNT).round() as u32;

        LiveOccupancyReading {
            gym_id: gym_id.to_string(),
            gym_name,
            percentage,
            // The level always reflects the final adjusted percentage,
            // never the baseline's.
            level: OccupancyLevel::from_percentage(percentage),
            estimated_headcount,
            confidence,
            check_in_count: aggregate.check_in_count,
            estimated_actual_count: aggregate.estimated_actual_count,
            capacity,
            last_updated_at: format_utc_rfc3339(now),
        }
    }

    /// Synthetic 24-hour occupancy trend ending now.
    pub fn trend(&self, now: DateTime<Utc>) -> Vec<TrendPoint> {
        (0..24)
            .map(|index| {
                let hour_offset = 23 - index;
                let timestamp = now - Duration::hours(hour_offset);
                TrendPoint {
                    time: hour_label(timestamp),
                    occupancy: self.signal.next_in(100),
                }
            })
            .collect()
    }

    /// Synthetic 12-hour forecast starting now.
    pub fn predictions(&self, now: DateTime<Utc>) -> Vec<PredictionPoint> {
        (0..12)
            .map(|index| {
                let timestamp = now + Duration::hours(index);
                let predicted = self.signal.next_in(100);
                let spread = 8 + self.signal.next_in(18);

                PredictionPoint {
                    time: hour_label(timestamp),
                    predicted,
                    lower_bound: predicted.saturating_sub(spread),
                    upper_bound: (predicted + spread).min(100),
                    peak_window: predicted >= HIGH_THRESHOLD,
                }
            })
            .collect()
    }

    /// Synthetic weekly heatmap: seven days, six slots each.
    pub fn weekly_heatmap(&self) -> Vec<HeatmapRow> {
        const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

        DAYS.iter()
            .enumerate()
            .map(|(day_index, day)| {
                let slots = (0..HEATMAP_SLOTS.len())
                    .map(|slot_index| {
                        let base = 20 + ((day_index + slot_index) % 5) as u32 * 15;
                        (base + self.signal.next_in(25)).min(100)
                    })
                    .collect();
                HeatmapRow {
                    day: (*day).to_string(),
                    slots,
                }
            })
            .collect()
    }
}

/// Recommend the quietest forecast slot.
///
/// The window spans the lowest-predicted slot and its successor's label;
/// the earliest slot wins ties.
pub fn best_visit_window(predictions: &[PredictionPoint]) -> String {
    let Some((best_index, best)) = predictions
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| p.predicted)
    else {
        return "No forecast available yet".to_string();
    };

    match predictions.get(best_index + 1) {
        Some(next) => format!("Best time to go: {}\u{2013}{}", best.time, next.time),
        None => format!("Best time to go: {}", best.time),
    }
}

fn hour_label(timestamp: DateTime<Utc>) -> String {
    format!("{:02}:00", timestamp.hour())
}
