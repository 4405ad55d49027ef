// SPDX-License-Identifier: MIT

//! Check-in submission flow.
//!
//! A submission is accepted only when the gym resolves, the client's
//! position is within the geofence, and the user hasn't checked into the
//! same gym within the rate-limit window. Rejections are business
//! outcomes with user-facing messages, not errors.

use crate::models::check_in::CheckIn;
use crate::services::directory::GymDirectoryService;
use crate::services::geo::distance_meters;
use crate::services::geolocation::{GeolocationError, GeolocationProvider};
use crate::services::session::{CheckInSession, StoreError};
use std::fmt;
use std::sync::Arc;

/// Maximum allowed distance from a gym's registered coordinates.
pub const GEOFENCE_RADIUS_METERS: f64 = 200.0;

/// Minimum spacing between check-ins to the same gym by the same user.
pub const RATE_LIMIT_MS: i64 = 60 * 60 * 1000;

/// Why a submission was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInRejection {
    /// Checked into this gym too recently
    RateLimited { minutes_remaining: i64 },
    /// Outside the geofence; carries the measured distance
    OutOfRange { distance_meters: u32 },
    /// Position lookup failed
    Geolocation(GeolocationError),
}

impl fmt::Display for CheckInRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckInRejection::RateLimited { minutes_remaining } => write!(
                f,
                "You already checked in here recently. Try again in {} minute{}.",
                minutes_remaining,
                if *minutes_remaining == 1 { "" } else { "s" }
            ),
            CheckInRejection::OutOfRange { distance_meters } => write!(
                f,
                "You're {}m away. Get within {}m of the gym to check in.",
                distance_meters, GEOFENCE_RADIUS_METERS as u32
            ),
            CheckInRejection::Geolocation(e) => write!(f, "{}", e),
        }
    }
}

/// Errors that are not business rejections (unknown gym, storage failure).
#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    #[error("Unknown gym: {0}")]
    UnknownGym(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a submission attempt.
pub type CheckInOutcome = Result<CheckIn, CheckInRejection>;

/// Submission entry point over the session store and capabilities.
pub struct CheckInService {
    directory: GymDirectoryService,
    geolocation: Arc<dyn GeolocationProvider>,
}

impl CheckInService {
    pub fn new(directory: GymDirectoryService, geolocation: Arc<dyn GeolocationProvider>) -> Self {
        Self {
            directory,
            geolocation,
        }
    }

    /// Attempt a check-in for `user_id` at `gym_id`.
    ///
    /// On success the new check-in is appended to the session and
    /// persisted. `Ok(Err(rejection))` carries a user-facing reason;
    /// `Err` is reserved for unknown gyms and storage failures.
    pub async fn submit(
        &self,
        session: &CheckInSession,
        user_id: &str,
        gym_id: &str,
        now_ms: i64,
    ) -> Result<CheckInOutcome, CheckInError> {
        let gym = self
            .directory
            .get_by_id(gym_id)
            .ok_or_else(|| CheckInError::UnknownGym(gym_id.to_string()))?;

        // Rate limit before geolocation: no point prompting for a position
        // the user can't use yet.
        let snapshot = session.snapshot();
        if let Some(rejection) = rate_limit_check(&snapshot, user_id, gym_id, now_ms) {
            tracing::debug!(gym_id, "Check-in rate limited");
            return Ok(Err(rejection));
        }

        let position = match self.geolocation.current_position().await {
            Ok(position) => position,
            Err(e) => {
                tracing::debug!(gym_id, reason = %e, "Geolocation failed during check-in");
                return Ok(Err(CheckInRejection::Geolocation(e)));
            }
        };

        let distance = distance_meters(position.to_point(), gym.coordinates.to_point());
        if distance > GEOFENCE_RADIUS_METERS {
            tracing::debug!(gym_id, distance, "Check-in outside geofence");
            return Ok(Err(CheckInRejection::OutOfRange {
                distance_meters: distance.round() as u32,
            }));
        }

        let check_in = CheckIn {
            gym_id: gym_id.to_string(),
            user_id: user_id.to_string(),
            timestamp: now_ms,
            distance_meters: Some(distance.round() as u32),
        };
        session.append(check_in.clone())?;

        tracing::info!(gym_id, distance = check_in.distance_meters, "Check-in accepted");
        Ok(Ok(check_in))
    }
}

/// Reject if the user checked into this gym within the last hour,
/// reporting whole minutes remaining (rounded up) until eligible.
fn rate_limit_check(
    check_ins: &[CheckIn],
    user_id: &str,
    gym_id: &str,
    now_ms: i64,
) -> Option<CheckInRejection> {
    let last = check_ins
        .iter()
        .filter(|c| c.user_id == user_id && c.gym_id == gym_id)
        .map(|c| c.timestamp)
        .max()?;

    let elapsed = now_ms - last;
    if elapsed >= RATE_LIMIT_MS {
        return None;
    }

    let remaining_ms = RATE_LIMIT_MS - elapsed;
    Some(CheckInRejection::RateLimited {
        minutes_remaining: (remaining_ms as u64).div_ceil(60_000) as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, Gym};
    use crate::services::geolocation::FixedPositionProvider;
    use crate::services::session::MemoryStore;

    const GYM_POSITION: Coordinates = Coordinates {
        lat: 45.5017,
        lng: -73.5673,
    };

    fn test_gym() -> Gym {
        Gym {
            id: "mtl-anytime-1".to_string(),
            name: "Anytime Fitness Downtown".to_string(),
            brand: "Anytime Fitness".to_string(),
            city: "Montreal".to_string(),
            address: "1500 Rue St-Catherine O".to_string(),
            province: "Quebec".to_string(),
            coordinates: GYM_POSITION,
            capacity: Some(80),
        }
    }

    fn service_at(position: Coordinates) -> CheckInService {
        CheckInService::new(
            GymDirectoryService::from_gyms(vec![test_gym()]),
            Arc::new(FixedPositionProvider::at(position)),
        )
    }

    fn test_session() -> CheckInSession {
        CheckInSession::load(Arc::new(MemoryStore::new()), 0).unwrap()
    }

    #[tokio::test]
    async fn test_accepts_inside_geofence() {
        let service = service_at(GYM_POSITION);
        let session = test_session();

        let outcome = service
            .submit(&session, "user-1", "mtl-anytime-1", 1_000_000)
            .await
            .unwrap();

        let check_in = outcome.expect("should be accepted");
        assert_eq!(check_in.gym_id, "mtl-anytime-1");
        assert_eq!(check_in.distance_meters, Some(0));
        assert_eq!(session.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_outside_geofence_with_distance() {
        // ~0.01 degrees latitude north: roughly 1.1 km away
        let service = service_at(Coordinates {
            lat: GYM_POSITION.lat + 0.01,
            lng: GYM_POSITION.lng,
        });
        let session = test_session();

        let outcome = service
            .submit(&session, "user-1", "mtl-anytime-1", 1_000_000)
            .await
            .unwrap();

        match outcome.expect_err("should be rejected") {
            CheckInRejection::OutOfRange { distance_meters } => {
                assert!((1_000..1_300).contains(&distance_meters));
            }
            other => panic!("unexpected rejection: {:?}", other),
        }
        assert!(session.snapshot().is_empty(), "no partial state written");
    }

    #[tokio::test]
    async fn test_geofence_boundary_inclusive_at_200() {
        // Just under 200m: ~0.0017966 degrees of latitude is ~199.9m
        let service = service_at(Coordinates {
            lat: GYM_POSITION.lat + 0.0017966,
            lng: GYM_POSITION.lng,
        });
        let session = test_session();

        let outcome = service
            .submit(&session, "user-1", "mtl-anytime-1", 1_000_000)
            .await
            .unwrap();
        assert!(outcome.is_ok(), "199.9m should be accepted");

        // Just over: ~0.0018100 degrees is ~201.4m
        let service = service_at(Coordinates {
            lat: GYM_POSITION.lat + 0.0018100,
            lng: GYM_POSITION.lng,
        });
        let outcome = service
            .submit(&session, "user-2", "mtl-anytime-1", 1_000_000)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            Err(CheckInRejection::OutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_same_gym_within_hour() {
        let service = service_at(GYM_POSITION);
        let session = test_session();
        let start = 10_000_000;

        let first = service
            .submit(&session, "user-1", "mtl-anytime-1", start)
            .await
            .unwrap();
        assert!(first.is_ok());

        // 59 minutes later: rejected with 1 minute remaining
        let outcome = service
            .submit(&session, "user-1", "mtl-anytime-1", start + 59 * 60_000)
            .await
            .unwrap();
        assert_eq!(
            outcome.expect_err("should be rate limited"),
            CheckInRejection::RateLimited {
                minutes_remaining: 1
            }
        );

        // 61 minutes later: accepted
        let outcome = service
            .submit(&session, "user-1", "mtl-anytime-1", start + 61 * 60_000)
            .await
            .unwrap();
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limit_reports_minutes_remaining() {
        let service = service_at(GYM_POSITION);
        let session = test_session();
        let start = 10_000_000;

        service
            .submit(&session, "user-1", "mtl-anytime-1", start)
            .await
            .unwrap()
            .unwrap();

        // 10 minutes in: 50 minutes remaining
        let outcome = service
            .submit(&session, "user-1", "mtl-anytime-1", start + 10 * 60_000)
            .await
            .unwrap();
        assert_eq!(
            outcome.unwrap_err(),
            CheckInRejection::RateLimited {
                minutes_remaining: 50
            }
        );
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_user() {
        let service = service_at(GYM_POSITION);
        let session = test_session();

        service
            .submit(&session, "user-1", "mtl-anytime-1", 1_000_000)
            .await
            .unwrap()
            .unwrap();

        let outcome = service
            .submit(&session, "user-2", "mtl-anytime-1", 1_001_000)
            .await
            .unwrap();
        assert!(outcome.is_ok(), "different user is not limited");
    }

    #[tokio::test]
    async fn test_geolocation_failure_reasons_surface() {
        for error in [
            GeolocationError::PermissionDenied,
            GeolocationError::PositionUnavailable,
            GeolocationError::Timeout,
        ] {
            let service = CheckInService::new(
                GymDirectoryService::from_gyms(vec![test_gym()]),
                Arc::new(FixedPositionProvider::failing(error)),
            );
            let session = test_session();

            let outcome = service
                .submit(&session, "user-1", "mtl-anytime-1", 1_000_000)
                .await
                .unwrap();
            assert_eq!(
                outcome.unwrap_err(),
                CheckInRejection::Geolocation(error)
            );
            assert!(session.snapshot().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_gym_is_an_error() {
        let service = service_at(GYM_POSITION);
        let session = test_session();

        let result = service
            .submit(&session, "user-1", "ghost-gym", 1_000_000)
            .await;
        assert!(matches!(result, Err(CheckInError::UnknownGym(_))));
    }
}
