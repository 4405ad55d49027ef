// SPDX-License-Identifier: MIT

//! GymPulse API Server
//!
//! Estimates live gym occupancy by blending synthetic sensor signal with
//! geofenced user check-ins, and serves the derived analytics.

use gym_pulse::{
    config::Config,
    services::{
        CheckInService, CheckInSession, EntitlementService, FixedPositionProvider,
        GymDirectoryService, JsonFileStore, OccupancyService, RandomSignal, RefreshCoordinator,
        RefreshService,
    },
    time_utils::now_ms,
    AppState,
};
use gym_pulse::models::Coordinates;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Demo position when no real geolocation capability is wired in:
/// Anytime Fitness Downtown, Montreal.
const DEMO_POSITION: Coordinates = Coordinates {
    lat: 45.5017,
    lng: -73.5673,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting GymPulse API");

    // Load the gym directory
    tracing::info!(path = %config.gyms_data_path, "Loading gym directory");
    let directory = GymDirectoryService::load_from_file(&config.gyms_data_path)
        .expect("Failed to load gym directory");

    // Load session state (prunes expired check-ins, ensures a client id)
    let store = Arc::new(JsonFileStore::new(&config.session_store_path));
    let session = CheckInSession::load(store, now_ms()).expect("Failed to load session store");
    tracing::info!(
        check_ins = session.snapshot().len(),
        "Session store loaded"
    );

    // Wire up services around the shared signal source
    let signal = Arc::new(RandomSignal);
    let occupancy = OccupancyService::new(signal.clone());
    let coordinator = Arc::new(RefreshCoordinator::new());
    let refresh = RefreshService::new(occupancy.clone(), signal, coordinator);
    let check_ins = CheckInService::new(
        directory.clone(),
        Arc::new(FixedPositionProvider::at(DEMO_POSITION)),
    );

    let state = Arc::new(AppState {
        config,
        directory,
        session,
        occupancy,
        refresh,
        check_ins,
        entitlements: EntitlementService::new(),
    });

    // Keep the active set fresh on a fixed cadence
    spawn_refresh_task(state.clone());

    // Build router
    let app = gym_pulse::routes::create_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically re-refresh every gym that has served a reading. Transient
/// sensor failures are logged and retried on the next tick; stale
/// in-flight results are discarded by the coordinator.
fn spawn_refresh_task(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(state.config.refresh_interval_secs));
        loop {
            interval.tick().await;
            let snapshot = state.session.snapshot();
            for gym_id in state.refresh.coordinator().active_gyms() {
                match state
                    .refresh
                    .refresh(&gym_id, &snapshot, &state.directory, chrono::Utc::now())
                    .await
                {
                    Ok(Some(reading)) => {
                        tracing::debug!(
                            gym_id = %gym_id,
                            percentage = reading.percentage,
                            "Scheduled refresh committed"
                        );
                    }
                    Ok(None) => {} // superseded; newer result already committed
                    Err(e) => {
                        tracing::warn!(gym_id = %gym_id, error = %e, "Scheduled refresh failed");
                    }
                }
            }
        }
    });
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gym_pulse=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
