// SPDX-License-Identifier: MIT

//! Great-circle distance between coordinates.
//!
//! The geofence and every recorded check-in distance go through this one
//! function, so the Earth radius here is load-bearing: it must stay at
//! 6,371,000 m to keep distances comparable across stored data.

use geo::Point;

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine great-circle distance in meters.
///
/// Points are (x = longitude, y = latitude) in degrees. Total over valid
/// coordinate ranges; NaN inputs propagate NaN rather than erroring.
pub fn distance_meters(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lng = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}
