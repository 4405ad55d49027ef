// SPDX-License-Identifier: MIT

//! Analytics snapshot types.
//!
//! Snapshots are pure derived views over the check-in collection at
//! computation time. They have no identity of their own and are recomputed
//! whenever the underlying collection changes.

use serde::{Deserialize, Serialize};

// ─── Personal ────────────────────────────────────────────────

/// Summary of one user's check-in history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalAnalytics {
    pub total_check_ins: u32,
    /// Distinct gyms checked into
    pub unique_gyms: u32,
    /// Gym with the most check-ins, with its count. `None` with no history.
    pub most_visited: Option<MostVisitedGym>,
    /// The 10 most recent check-ins, newest first
    pub recent_check_ins: Vec<CheckInDetail>,
    /// Check-in counts per hour of day (24 buckets)
    pub hourly_distribution: Vec<u32>,
    /// Check-in counts per day of week (7 buckets, 0 = Sunday)
    pub weekly_distribution: Vec<u32>,
    /// Mean recorded distance in meters, 0 when none was recorded
    pub average_distance_meters: u32,
    /// Check-ins within the last 7 days
    pub this_week_check_ins: u32,
}

/// A user's most-visited gym.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MostVisitedGym {
    pub gym_id: String,
    pub gym_name: String,
    pub count: u32,
}

/// A check-in enriched with its resolved gym and a constructed date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInDetail {
    pub gym_id: String,
    pub gym_name: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// RFC3339
    pub date: String,
    pub distance_meters: Option<u32>,
}

// ─── Community ───────────────────────────────────────────────

/// Per-gym activity breakdown over the community windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymActivity {
    pub gym_id: String,
    pub gym_name: String,
    /// Check-ins within the last 24 hours
    pub last_24_hours_check_ins: u32,
    /// Check-ins within the last 15 minutes
    pub recent_check_ins: u32,
    /// Occupancy percentage backed out of the recent count
    pub estimated_occupancy: u32,
}

/// One hour-of-day bucket with its check-in count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakHour {
    /// 0-23
    pub hour: u32,
    pub count: u32,
}

/// An entry of the community activity feed. Carries no user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityActivityEntry {
    pub gym_id: String,
    pub gym_name: String,
    /// RFC3339
    pub date: String,
}

/// Summary of check-ins across all users, restricted to the last 24 hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityAnalytics {
    pub total_community_check_ins: u32,
    /// Gyms with at least one check-in in the 24-hour window
    pub gyms_with_activity: Vec<GymActivity>,
    /// Gym with the highest 15-minute recent count
    pub most_popular_gym: Option<GymActivity>,
    /// Top 5 gyms by 24-hour count, descending
    pub top_gyms: Vec<GymActivity>,
    /// 20 most recent check-ins, newest first, unresolved gyms excluded
    pub recent_activity: Vec<CommunityActivityEntry>,
    /// Top 3 hours of day by count, descending, zero-count hours excluded
    pub peak_hours: Vec<PeakHour>,
}

// ─── Advanced (premium) ──────────────────────────────────────

/// Consistency scoring and per-weekday forecast, derived from personal
/// analytics. Entitlement is checked by the caller, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedAnalytics {
    /// 0-100, monotonic in check-in frequency
    pub consistency_score: u32,
    /// Consistency score raised by 25%, capped at 100
    pub stretch_goal: u32,
    /// Projected check-ins per weekday (7 buckets, 0 = Sunday)
    pub forecasted_check_ins: Vec<u32>,
    /// Weekday index (0-6) with the highest historical count
    pub best_day_of_week: u32,
}

// ─── Partnership export ──────────────────────────────────────

/// Anonymized aggregate document for partner gyms.
///
/// Carries aggregate counts only: no user identifiers, no timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnershipExport {
    pub summary: PartnershipSummary,
    pub insights: Vec<GymInsight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnershipSummary {
    /// Distinct user ids across all held check-ins
    pub total_active_users: u32,
    pub total_check_ins: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymInsight {
    pub gym_id: String,
    pub gym_name: String,
    pub city: String,
    pub brand: String,
    pub metrics: GymInsightMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymInsightMetrics {
    pub total_check_ins: u32,
    pub unique_users: u32,
    pub estimated_occupancy: u32,
}
