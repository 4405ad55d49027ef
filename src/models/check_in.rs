// SPDX-License-Identifier: MIT

//! Check-in event model.

use serde::{Deserialize, Serialize};

/// One user-initiated presence event at a gym.
///
/// Immutable once created. The session collection is append-only except for
/// load-time pruning of entries older than 24 hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    /// Gym directory id
    pub gym_id: String,
    /// Pseudo-anonymous client id, generated once and persisted locally
    pub user_id: String,
    /// Submission time, epoch milliseconds
    pub timestamp: i64,
    /// Distance from the gym's registered coordinates at submission time,
    /// rounded to whole meters. Absent when geolocation was not recorded.
    pub distance_meters: Option<u32>,
}

impl CheckIn {
    /// Whether this check-in falls within `window_ms` of `now_ms`.
    pub fn within_window(&self, now_ms: i64, window_ms: i64) -> bool {
        let age = now_ms - self.timestamp;
        age >= 0 && age <= window_ms
    }
}
