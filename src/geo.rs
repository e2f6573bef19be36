//! Geographic utilities.
//!
//! Haversine great-circle distance, used for the nearest-hospital helper
//! and for reporting the length of fetched route polylines.

use crate::Coordinate;

/// Earth radius in meters (mean radius)
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate the haversine distance between two coordinates in meters.
///
/// # Example
/// ```
/// use hospital_locator::{haversine_distance, Coordinate};
///
/// let sao_paulo = Coordinate::new(-23.5505, -46.6333);
/// let rio = Coordinate::new(-22.9068, -43.1729);
/// let distance = haversine_distance(&sao_paulo, &rio);
/// assert!(distance > 350_000.0 && distance < 370_000.0);
/// ```
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Total length of a polyline in meters.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}
