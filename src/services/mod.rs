// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod analytics;
pub mod check_in;
pub mod directory;
pub mod entitlement;
pub mod geo;
pub mod geolocation;
pub mod occupancy;
pub mod refresh;
pub mod session;
pub mod signal;

pub use check_in::{CheckInRejection, CheckInService};
pub use directory::GymDirectoryService;
pub use entitlement::EntitlementService;
pub use geolocation::{FixedPositionProvider, GeolocationError, GeolocationProvider};
pub use occupancy::OccupancyService;
pub use refresh::{RefreshCoordinator, RefreshService};
pub use session::{CheckInSession, JsonFileStore, MemoryStore, SessionStore};
pub use signal::{RandomSignal, SequenceSignal, SignalSource};
