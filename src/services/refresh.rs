// SPDX-License-Identifier: MIT

//! Refresh scheduling with stale-result discarding.
//!
//! Readings are recomputed on a timer and on demand. Overlapping refreshes
//! for the same gym are not cancelled; instead each carries a generation
//! token and only the newest generation may commit. A refresh that loses
//! the race finishes quietly and its result is dropped.

use crate::models::LiveOccupancyReading;
use crate::services::occupancy::OccupancyService;
use crate::services::signal::SignalSource;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Seconds between scheduled refreshes of the active set.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Simulated sensor-network latency per fetch.
const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(450);

/// Probability that a fetch transiently fails.
const SENSOR_FAILURE_RATE: f64 = 0.04;

/// Transient refresh failure; retried on the next cycle, never fatal.
#[derive(Debug, thiserror::Error)]
#[error("Unable to reach sensor network.")]
pub struct SensorUnreachable;

/// Token identifying one in-flight refresh of one gym.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    gym_id: String,
    generation: u64,
}

/// Per-gym generation counters plus the committed readings.
#[derive(Default)]
pub struct RefreshCoordinator {
    generations: DashMap<String, u64>,
    readings: DashMap<String, LiveOccupancyReading>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh: bumps the gym's generation and returns the token
    /// the eventual commit must present.
    pub fn begin(&self, gym_id: &str) -> RefreshToken {
        let mut entry = self.generations.entry(gym_id.to_string()).or_insert(0);
        *entry += 1;
        RefreshToken {
            gym_id: gym_id.to_string(),
            generation: *entry,
        }
    }

    /// Commit a completed refresh. Returns `false` (and drops the reading)
    /// when a newer refresh has started since this token was issued.
    pub fn commit(&self, token: &RefreshToken, reading: LiveOccupancyReading) -> bool {
        let current = self
            .generations
            .get(&token.gym_id)
            .map(|g| *g)
            .unwrap_or(0);
        if token.generation != current {
            tracing::debug!(
                gym_id = %token.gym_id,
                stale = token.generation,
                current,
                "Discarding stale refresh result"
            );
            return false;
        }
        self.readings.insert(token.gym_id.clone(), reading);
        true
    }

    /// Last committed reading for a gym.
    pub fn latest(&self, gym_id: &str) -> Option<LiveOccupancyReading> {
        self.readings.get(gym_id).map(|r| r.clone())
    }

    /// Gym ids with at least one committed reading (the active set the
    /// scheduled task keeps fresh).
    pub fn active_gyms(&self) -> Vec<String> {
        self.readings.iter().map(|e| e.key().clone()).collect()
    }
}

/// One simulated sensor fetch: awaits the network delay, then fails
/// transiently with a small probability.
pub async fn fetch_sensor_frame(
    signal: &Arc<dyn SignalSource>,
    delay: Duration,
) -> Result<(), SensorUnreachable> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    if signal.next_unit() < SENSOR_FAILURE_RATE {
        return Err(SensorUnreachable);
    }
    Ok(())
}

/// Refresh driver combining the coordinator with the occupancy service.
#[derive(Clone)]
pub struct RefreshService {
    occupancy: OccupancyService,
    signal: Arc<dyn SignalSource>,
    coordinator: Arc<RefreshCoordinator>,
    fetch_delay: Duration,
}

impl RefreshService {
    pub fn new(
        occupancy: OccupancyService,
        signal: Arc<dyn SignalSource>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            occupancy,
            signal,
            coordinator,
            fetch_delay: DEFAULT_FETCH_DELAY,
        }
    }

    /// Zero-latency variant for tests.
    pub fn without_delay(mut self) -> Self {
        self.fetch_delay = Duration::ZERO;
        self
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Run one refresh for a gym.
    ///
    /// `Ok(Some)` is a committed fresh reading; `Ok(None)` means a newer
    /// refresh superseded this one and its result was discarded;
    /// `Err` is a transient sensor failure to retry next cycle.
    pub async fn refresh(
        &self,
        gym_id: &str,
        check_ins: &[crate::models::CheckIn],
        directory: &crate::services::directory::GymDirectoryService,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<LiveOccupancyReading>, SensorUnreachable> {
        let token = self.coordinator.begin(gym_id);
        fetch_sensor_frame(&self.signal, self.fetch_delay).await?;

        let reading = self.occupancy.live_reading(gym_id, check_ins, directory, now);
        if self.coordinator.commit(&token, reading.clone()) {
            Ok(Some(reading))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::occupancy::OccupancyLevel;
    use crate::services::directory::GymDirectoryService;
    use crate::services::signal::SequenceSignal;
    use crate::time_utils::format_utc_rfc3339;
    use chrono::Utc;

    fn reading(gym_id: &str, percentage: u32) -> LiveOccupancyReading {
        LiveOccupancyReading {
            gym_id: gym_id.to_string(),
            gym_name: "Test".to_string(),
            percentage,
            level: OccupancyLevel::from_percentage(percentage),
            estimated_headcount: 0,
            confidence: 70,
            check_in_count: 0,
            estimated_actual_count: None,
            capacity: 100,
            last_updated_at: format_utc_rfc3339(Utc::now()),
        }
    }

    #[test]
    fn test_stale_generation_discarded() {
        let coordinator = RefreshCoordinator::new();

        let first = coordinator.begin("mtl-1");
        let second = coordinator.begin("mtl-1");

        // The older in-flight refresh loses
        assert!(!coordinator.commit(&first, reading("mtl-1", 10)));
        assert!(coordinator.commit(&second, reading("mtl-1", 20)));
        assert_eq!(coordinator.latest("mtl-1").unwrap().percentage, 20);
    }

    #[test]
    fn test_generations_are_per_gym() {
        let coordinator = RefreshCoordinator::new();

        let a = coordinator.begin("mtl-1");
        let _b = coordinator.begin("qc-1");

        // A refresh of another gym doesn't invalidate this one
        assert!(coordinator.commit(&a, reading("mtl-1", 33)));
    }

    #[test]
    fn test_active_set_tracks_committed_readings() {
        let coordinator = RefreshCoordinator::new();
        assert!(coordinator.active_gyms().is_empty());

        let token = coordinator.begin("mtl-1");
        coordinator.commit(&token, reading("mtl-1", 40));
        assert_eq!(coordinator.active_gyms(), vec!["mtl-1".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_failure_rate_sampled() {
        // next_unit maps 3 -> 0.03 (< 0.04, fails), 50 -> 0.50 (succeeds)
        let failing: Arc<dyn SignalSource> = Arc::new(SequenceSignal::new(vec![3]));
        assert!(fetch_sensor_frame(&failing, Duration::ZERO).await.is_err());

        let healthy: Arc<dyn SignalSource> = Arc::new(SequenceSignal::new(vec![50]));
        assert!(fetch_sensor_frame(&healthy, Duration::ZERO).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_commits_fresh_reading() {
        let signal: Arc<dyn SignalSource> = Arc::new(SequenceSignal::new(vec![50, 5]));
        let service = RefreshService::new(
            OccupancyService::new(signal.clone()),
            signal,
            Arc::new(RefreshCoordinator::new()),
        )
        .without_delay();
        let directory = GymDirectoryService::default();

        let result = service
            .refresh("mtl-1", &[], &directory, Utc::now())
            .await
            .unwrap();

        assert!(result.is_some());
        assert!(service.coordinator().latest("mtl-1").is_some());
    }
}
