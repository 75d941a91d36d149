//! crates/clocker_core/src/geo.rs
//!
//! Great-circle distance between a device and a campus.

use crate::domain::GeoCoordinate;

/// Mean Earth radius used for every distance, 6371 km expressed in meters.
pub const EARTH_RADIUS_METERS: f64 = 6371.0 * 1000.0;

/// Calculate the surface distance in meters between two coordinates using the
/// Haversine formula.
///
/// No validation is performed: a `NaN` in any field yields `NaN`, which callers
/// treat as an unknown distance.
pub fn distance_meters(a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lon_a = a.longitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let lon_b = b.longitude.to_radians();

    // Absolute differences are taken before halving, matching the figures
    // recorded by existing attendance rows.
    let delta_lon = (lon_b - lon_a).abs();
    let delta_lat = (lat_b - lat_a).abs();

    let arc = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    let central_angle = 2.0 * arc.sqrt().asin();

    central_angle * EARTH_RADIUS_METERS
}
