// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod analytics;
pub mod check_in;
pub mod gym;
pub mod occupancy;
pub mod subscription;

pub use check_in::CheckIn;
pub use gym::{Coordinates, Gym};
pub use occupancy::{LiveOccupancyReading, OccupancyLevel};
pub use subscription::{SubscriptionStatus, UserSubscription};
