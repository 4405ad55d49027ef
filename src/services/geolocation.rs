// SPDX-License-Identifier: MIT

//! Geolocation capability consumed by the check-in flow.

use crate::models::Coordinates;
use async_trait::async_trait;

/// Why a position lookup failed. Each maps to a specific user-facing
/// rejection reason; a failed lookup never writes partial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Location permission was denied")]
    PermissionDenied,

    #[error("Your position is currently unavailable")]
    PositionUnavailable,

    #[error("Timed out waiting for your position")]
    Timeout,
}

/// Provider of the client's current position.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Fixed-position provider for tests and demo deployments.
pub struct FixedPositionProvider {
    position: Result<Coordinates, GeolocationError>,
}

impl FixedPositionProvider {
    pub fn at(position: Coordinates) -> Self {
        Self {
            position: Ok(position),
        }
    }

    pub fn failing(error: GeolocationError) -> Self {
        Self {
            position: Err(error),
        }
    }
}

#[async_trait]
impl GeolocationProvider for FixedPositionProvider {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.position
    }
}
