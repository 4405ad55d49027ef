// SPDX-License-Identifier: MIT

use axum::body::Body;
use axum::response::Response;
use gym_pulse::config::Config;
use gym_pulse::models::check_in::CheckIn;
use gym_pulse::models::Coordinates;
use gym_pulse::routes::create_router;
use gym_pulse::services::{
    CheckInService, CheckInSession, EntitlementService, FixedPositionProvider, GeolocationError,
    GymDirectoryService, MemoryStore, OccupancyService, RefreshCoordinator, RefreshService,
    SequenceSignal,
};
use gym_pulse::time_utils::now_ms;
use gym_pulse::AppState;
use std::sync::Arc;

/// Registered coordinates of "Anytime Fitness Downtown" in data/gyms.json.
#[allow(dead_code)]
pub const DOWNTOWN_GYM: Coordinates = Coordinates {
    lat: 45.5017,
    lng: -73.5673,
};

/// Load the real gym directory for testing.
pub fn load_test_directory() -> GymDirectoryService {
    GymDirectoryService::load_from_file("data/gyms.json")
        .expect("Failed to load gym directory - is data/ committed?")
}

/// Builder for a test app over deterministic mock capabilities.
pub struct TestAppBuilder {
    signal: Vec<u32>,
    position: Result<Coordinates, GeolocationError>,
    check_ins: Vec<CheckIn>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            // Healthy fetch (0.50), baseline 50%, confidence raw 10
            signal: vec![50, 10],
            position: Ok(DOWNTOWN_GYM),
            check_ins: Vec::new(),
        }
    }

    /// Replace the deterministic signal sequence.
    #[allow(dead_code)]
    pub fn signal(mut self, values: Vec<u32>) -> Self {
        self.signal = values;
        self
    }

    /// Position reported by the mock geolocation capability.
    #[allow(dead_code)]
    pub fn position(mut self, position: Coordinates) -> Self {
        self.position = Ok(position);
        self
    }

    /// Make geolocation fail with the given reason.
    #[allow(dead_code)]
    pub fn geolocation_failure(mut self, error: GeolocationError) -> Self {
        self.position = Err(error);
        self
    }

    /// Seed the session store with existing check-ins.
    #[allow(dead_code)]
    pub fn check_ins(mut self, check_ins: Vec<CheckIn>) -> Self {
        self.check_ins = check_ins;
        self
    }

    pub fn build(self) -> (axum::Router, Arc<AppState>) {
        let config = Config::test_default();
        let directory = load_test_directory();

        let store = Arc::new(MemoryStore::with_check_ins(self.check_ins));
        let session = CheckInSession::load(store, now_ms()).expect("Failed to load test session");

        let signal = Arc::new(SequenceSignal::new(self.signal));
        let occupancy = OccupancyService::new(signal.clone());
        let refresh = RefreshService::new(
            occupancy.clone(),
            signal,
            Arc::new(RefreshCoordinator::new()),
        )
        .without_delay();

        let geolocation = Arc::new(match self.position {
            Ok(position) => FixedPositionProvider::at(position),
            Err(error) => FixedPositionProvider::failing(error),
        });
        let check_ins = CheckInService::new(directory.clone(), geolocation);

        let state = Arc::new(AppState {
            config,
            directory,
            session,
            occupancy,
            refresh,
            check_ins,
            entitlements: EntitlementService::new(),
        });

        (create_router(state.clone()), state)
    }
}

/// Create a test app with default mock dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    TestAppBuilder::new().build()
}

/// Collect a response body into JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not valid JSON")
}

/// A check-in at `gym_id` some milliseconds in the past.
#[allow(dead_code)]
pub fn check_in_ago(gym_id: &str, user_id: &str, age_ms: i64) -> CheckIn {
    CheckIn {
        gym_id: gym_id.to_string(),
        user_id: user_id.to_string(),
        timestamp: now_ms() - age_ms,
        distance_meters: Some(45),
    }
}
