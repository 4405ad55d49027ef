// SPDX-License-Identifier: MIT

//! Personal, community, and premium analytics engines, plus the
//! partnership export.
//!
//! Every engine is a pure function over a snapshot of the check-in
//! collection: the caller passes the snapshot and `now`, nothing here
//! reads a clock or global state.

use crate::models::analytics::{
    AdvancedAnalytics, CheckInDetail, CommunityActivityEntry, CommunityAnalytics, GymActivity,
    GymInsight, GymInsightMetrics, MostVisitedGym, PartnershipExport, PartnershipSummary,
    PeakHour, PersonalAnalytics,
};
use crate::models::check_in::CheckIn;
use crate::services::directory::GymDirectoryService;
use crate::services::occupancy::{CHECK_IN_ADOPTION_RATE, RECENT_WINDOW_MS};
use crate::time_utils::{datetime_from_ms, format_utc_rfc3339};
use chrono::{Datelike, Timelike};
use std::collections::{HashMap, HashSet};

/// Community aggregates are restricted to this window.
pub const COMMUNITY_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Personal "this week" window.
pub const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

const RECENT_PERSONAL_LIMIT: usize = 10;
const RECENT_COMMUNITY_LIMIT: usize = 20;
const LEADERBOARD_SIZE: usize = 5;
const PEAK_HOURS_LIMIT: usize = 3;

const UNKNOWN_GYM_NAME: &str = "Unknown gym";

// ─── Personal ────────────────────────────────────────────────

/// Summarize one user's check-in history.
///
/// An empty collection yields a zeroed snapshot, never an error. Hours and
/// weekdays are bucketed in UTC (0 = Sunday).
pub fn analyze_personal(
    check_ins: &[CheckIn],
    directory: &GymDirectoryService,
    now_ms: i64,
) -> PersonalAnalytics {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    let mut hourly = vec![0u32; 24];
    let mut weekly = vec![0u32; 7];
    let mut distance_sum: u64 = 0;
    let mut distance_count: u32 = 0;
    let mut this_week = 0u32;

    for check_in in check_ins {
        let entry = counts.entry(&check_in.gym_id).or_insert(0);
        if *entry == 0 {
            first_seen.push(&check_in.gym_id);
        }
        *entry += 1;

        let date = datetime_from_ms(check_in.timestamp);
        hourly[date.hour() as usize] += 1;
        weekly[date.weekday().num_days_from_sunday() as usize] += 1;

        if let Some(distance) = check_in.distance_meters {
            distance_sum += u64::from(distance);
            distance_count += 1;
        }
        if check_in.within_window(now_ms, WEEK_MS) {
            this_week += 1;
        }
    }

    // First gym to reach the top count wins ties, so the result is stable
    // across recomputations.
    let most_visited = first_seen
        .iter()
        .fold(None::<(&str, u32)>, |best, &gym_id| {
            let count = counts[gym_id];
            match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((gym_id, count)),
            }
        })
        .map(|(gym_id, count)| MostVisitedGym {
            gym_id: gym_id.to_string(),
            gym_name: resolve_name(directory, gym_id),
            count,
        });

    let mut recent: Vec<&CheckIn> = check_ins.iter().collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let recent_check_ins = recent
        .into_iter()
        .take(RECENT_PERSONAL_LIMIT)
        .map(|c| CheckInDetail {
            gym_id: c.gym_id.clone(),
            gym_name: resolve_name(directory, &c.gym_id),
            timestamp: c.timestamp,
            date: format_utc_rfc3339(datetime_from_ms(c.timestamp)),
            distance_meters: c.distance_meters,
        })
        .collect();

    let average_distance_meters = if distance_count > 0 {
        (distance_sum as f64 / f64::from(distance_count)).round() as u32
    } else {
        0
    };

    PersonalAnalytics {
        total_check_ins: check_ins.len() as u32,
        unique_gyms: counts.len() as u32,
        most_visited,
        recent_check_ins,
        hourly_distribution: hourly,
        weekly_distribution: weekly,
        average_distance_meters,
        this_week_check_ins: this_week,
    }
}

// ─── Community ───────────────────────────────────────────────

/// Summarize check-ins across all users, restricted to the last 24 hours.
pub fn analyze_community(
    check_ins: &[CheckIn],
    directory: &GymDirectoryService,
    now_ms: i64,
) -> CommunityAnalytics {
    let window: Vec<&CheckIn> = check_ins
        .iter()
        .filter(|c| c.within_window(now_ms, COMMUNITY_WINDOW_MS))
        .collect();

    // Group in first-seen order so tie-breaks are deterministic
    let mut order: Vec<&str> = Vec::new();
    let mut day_counts: HashMap<&str, u32> = HashMap::new();
    let mut recent_counts: HashMap<&str, u32> = HashMap::new();
    for check_in in &window {
        let entry = day_counts.entry(&check_in.gym_id).or_insert(0);
        if *entry == 0 {
            order.push(&check_in.gym_id);
        }
        *entry += 1;
        if check_in.within_window(now_ms, RECENT_WINDOW_MS) {
            *recent_counts.entry(&check_in.gym_id).or_insert(0) += 1;
        }
    }

    let gyms_with_activity: Vec<GymActivity> = order
        .iter()
        .filter_map(|&gym_id| {
            // Unresolved ids are dropped from the community breakdown
            let gym = directory.get_by_id(gym_id)?;
            let recent = recent_counts.get(gym_id).copied().unwrap_or(0);
            Some(GymActivity {
                gym_id: gym_id.to_string(),
                gym_name: gym.name.clone(),
                last_24_hours_check_ins: day_counts[gym_id],
                recent_check_ins: recent,
                estimated_occupancy: estimated_occupancy(recent, gym.effective_capacity()),
            })
        })
        .collect();

    let most_popular_gym = gyms_with_activity
        .iter()
        .fold(None::<&GymActivity>, |best, entry| match best {
            Some(b) if b.recent_check_ins >= entry.recent_check_ins => best,
            _ => Some(entry),
        })
        .cloned();

    let mut top_gyms = gyms_with_activity.clone();
    top_gyms.sort_by(|a, b| b.last_24_hours_check_ins.cmp(&a.last_24_hours_check_ins));
    top_gyms.truncate(LEADERBOARD_SIZE);

    let mut sorted_window = window.clone();
    sorted_window.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let recent_activity: Vec<CommunityActivityEntry> = sorted_window
        .iter()
        .filter_map(|c| {
            let gym = directory.get_by_id(&c.gym_id)?;
            Some(CommunityActivityEntry {
                gym_id: c.gym_id.clone(),
                gym_name: gym.name.clone(),
                date: format_utc_rfc3339(datetime_from_ms(c.timestamp)),
            })
        })
        .take(RECENT_COMMUNITY_LIMIT)
        .collect();

    let mut hour_counts = [0u32; 24];
    for check_in in &window {
        hour_counts[datetime_from_ms(check_in.timestamp).hour() as usize] += 1;
    }
    let mut peak_hours: Vec<PeakHour> = hour_counts
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(hour, &count)| PeakHour {
            hour: hour as u32,
            count,
        })
        .collect();
    peak_hours.sort_by(|a, b| b.count.cmp(&a.count).then(a.hour.cmp(&b.hour)));
    peak_hours.truncate(PEAK_HOURS_LIMIT);

    CommunityAnalytics {
        total_community_check_ins: window.len() as u32,
        gyms_with_activity,
        most_popular_gym,
        top_gyms,
        recent_activity,
        peak_hours,
    }
}

// ─── Advanced (premium) ──────────────────────────────────────

/// Derive consistency scoring and per-weekday forecasts from a personal
/// snapshot. Entitlement gating happens at the call site.
pub fn analyze_advanced(personal: &PersonalAnalytics) -> AdvancedAnalytics {
    let score = consistency_score(personal);
    AdvancedAnalytics {
        consistency_score: score,
        stretch_goal: stretch_goal(score),
        forecasted_check_ins: personal.weekly_distribution.clone(),
        best_day_of_week: best_day_of_week(&personal.weekly_distribution),
    }
}

/// Consistency heuristic, 0-100.
///
/// Up to 70 points for frequency (this week's check-ins against a daily
/// habit) plus up to 30 for regularity (how many distinct weekdays show
/// activity). Strictly bounded and monotonic in check-in frequency.
fn consistency_score(personal: &PersonalAnalytics) -> u32 {
    let frequency = f64::from(personal.this_week_check_ins.min(7)) / 7.0 * 70.0;
    let active_days = personal
        .weekly_distribution
        .iter()
        .filter(|&&count| count > 0)
        .count();
    let regularity = active_days as f64 / 7.0 * 30.0;

    ((frequency + regularity).round() as u32).min(100)
}

/// A goal 25% above the current score, capped at 100.
fn stretch_goal(score: u32) -> u32 {
    ((f64::from(score) * 1.25).round() as u32).min(100)
}

/// Weekday index (0 = Sunday) with the highest count; ties go to the
/// earliest weekday.
fn best_day_of_week(weekly: &[u32]) -> u32 {
    weekly
        .iter()
        .enumerate()
        .fold((0usize, 0u32), |(best_day, best_count), (day, &count)| {
            if count > best_count {
                (day, count)
            } else {
                (best_day, best_count)
            }
        })
        .0 as u32
}

// ─── Partnership export ──────────────────────────────────────

/// Reshape community analytics into the anonymized partner document.
///
/// Only aggregate counts leave this function: no user ids, no timestamps.
pub fn export_partnership_data(
    community: &CommunityAnalytics,
    check_ins: &[CheckIn],
    directory: &GymDirectoryService,
) -> PartnershipExport {
    let mut users: HashSet<&str> = HashSet::new();
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, u32> = HashMap::new();
    let mut gym_users: HashMap<&str, HashSet<&str>> = HashMap::new();

    for check_in in check_ins {
        users.insert(&check_in.user_id);
        let entry = totals.entry(&check_in.gym_id).or_insert(0);
        if *entry == 0 {
            order.push(&check_in.gym_id);
        }
        *entry += 1;
        gym_users
            .entry(&check_in.gym_id)
            .or_default()
            .insert(&check_in.user_id);
    }

    let insights = order
        .iter()
        .filter_map(|&gym_id| {
            let gym = directory.get_by_id(gym_id)?;
            // Live occupancy comes from the community snapshot's recent
            // window when the gym is active; otherwise it reads empty.
            let estimated_occupancy = community
                .gyms_with_activity
                .iter()
                .find(|g| g.gym_id == gym_id)
                .map_or(0, |g| g.estimated_occupancy);

            Some(GymInsight {
                gym_id: gym_id.to_string(),
                gym_name: gym.name.clone(),
                city: gym.city.clone(),
                brand: gym.brand.clone(),
                metrics: GymInsightMetrics {
                    total_check_ins: totals[gym_id],
                    unique_users: gym_users[gym_id].len() as u32,
                    estimated_occupancy,
                },
            })
        })
        .collect();

    PartnershipExport {
        summary: PartnershipSummary {
            total_active_users: users.len() as u32,
            total_check_ins: check_ins.len() as u32,
        },
        insights,
    }
}

// ─── Shared helpers ──────────────────────────────────────────

/// The 30% adoption-rate formula shared with the live aggregator.
fn estimated_occupancy(recent_count: u32, capacity: u32) -> u32 {
    let estimated_actual = (f64::from(recent_count) / CHECK_IN_ADOPTION_RATE).round();
    let capacity = f64::from(capacity.max(1));
    ((estimated_actual / capacity * 100.0).round() as u32).min(100)
}

fn resolve_name(directory: &GymDirectoryService, gym_id: &str) -> String {
    directory
        .get_by_id(gym_id)
        .map_or_else(|| UNKNOWN_GYM_NAME.to_string(), |g| g.name.clone())
}
