//! Spatial query utilities for distance calculations.
//!
//! Uses Haversine formula for accurate distances on Earth's surface.

use geo::{HaversineDistance, Point};

/// Meters per degree of latitude, and of longitude at the equator
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    p1.haversine_distance(&p2)
}

/// Convert meters to degrees at equator (for bounding box queries)
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Radius in degrees that covers `meters` in every direction around `latitude`.
///
/// Longitude degrees shrink towards the poles, so the longitude span dominates.
/// The extra 10% absorbs the difference between the equatorial approximation
/// and the real length of a latitude degree.
pub fn covering_radius_degrees(meters: f64, latitude: f64) -> f64 {
    let cos_lat = latitude.to_radians().cos().abs().max(0.01);
    meters_to_degrees_approx(meters) / cos_lat * 1.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Gelsenkirchen Hbf to Bochum Hbf is roughly 9 km
        let gelsenkirchen = Point::new(7.1022064, 51.5049259);
        let bochum = Point::new(7.2235, 51.4787);

        let dist = haversine_distance(gelsenkirchen, bochum);
        assert!((dist - 8_900.0).abs() < 1_000.0);
    }

    #[test]
    fn test_degree_conversions() {
        assert!((meters_to_degrees_approx(111_320.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_covering_radius_contains_real_distance() {
        let origin = Point::new(7.10283, 51.50483);
        let radius_deg = covering_radius_degrees(200.0, origin.y());

        // A point 200 m due east must lie inside the degree radius
        let east = Point::new(origin.x() + radius_deg, origin.y());
        assert!(haversine_distance(origin, east) >= 200.0);

        let north = Point::new(origin.x(), origin.y() + radius_deg);
        assert!(haversine_distance(origin, north) >= 200.0);
    }
}
