// SPDX-License-Identifier: MIT

//! Gym location model.
//!
//! Gyms are static reference data loaded from the bundled directory file.
//! The engines never own them; they resolve ids through
//! [`crate::services::GymDirectoryService`].

use geo::Point;
use serde::{Deserialize, Serialize};

/// Assumed member capacity when a gym doesn't report one.
pub const DEFAULT_CAPACITY: u32 = 100;

/// Registered coordinates of a gym.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// View as a `geo` point (x = longitude, y = latitude).
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

/// A gym location from the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gym {
    /// Directory id (e.g., "mtl-anytime-1")
    pub id: String,
    /// Display name (e.g., "Anytime Fitness Downtown")
    pub name: String,
    /// Brand name (e.g., "Anytime Fitness")
    pub brand: String,
    /// City
    pub city: String,
    /// Street address
    pub address: String,
    /// Province
    pub province: String,
    /// Registered coordinates
    pub coordinates: Coordinates,
    /// Member capacity, if known
    pub capacity: Option<u32>,
}

impl Gym {
    /// Capacity used in occupancy math, falling back to [`DEFAULT_CAPACITY`].
    pub fn effective_capacity(&self) -> u32 {
        self.capacity.unwrap_or(DEFAULT_CAPACITY)
    }
}
