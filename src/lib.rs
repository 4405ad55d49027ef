// SPDX-License-Identifier: MIT

//! GymPulse: know when to go.
//!
//! This crate estimates how busy a gym is right now by blending a
//! synthetic sensor baseline with geofenced user check-ins, and derives
//! personal, community, and premium analytics from the check-in history.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{
    CheckInService, CheckInSession, EntitlementService, GymDirectoryService, OccupancyService,
    RefreshService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub directory: GymDirectoryService,
    pub session: CheckInSession,
    pub occupancy: OccupancyService,
    pub refresh: RefreshService,
    pub check_ins: CheckInService,
    pub entitlements: EntitlementService,
}
