//! Distances on the WGS-84 ellipsoid.
//!
//! The inverse geodesic problem is solved with Karney's algorithm, which
//! converges for every pair of points, nearly antipodal ones included.

use std::sync::LazyLock;

use geographiclib_rs::{Geodesic, InverseGeodesic};

use crate::model::Coordinates;

static WGS84: LazyLock<Geodesic> = LazyLock::new(Geodesic::wgs84);

/// Geodesic distance between two points in metres.
#[must_use]
pub fn geodesic_distance_m(from: Coordinates, to: Coordinates) -> f64 {
    let distance: f64 = WGS84.inverse(
        from.latitude(),
        from.longitude(),
        to.latitude(),
        to.longitude(),
    );
    distance
}

/// Geodesic distance between two points in kilometres.
#[must_use]
pub fn geodesic_distance_km(from: Coordinates, to: Coordinates) -> f64 {
    geodesic_distance_m(from, to) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates::new(latitude, longitude).expect("valid test coordinates")
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn identical_points_are_zero_apart() {
        let accra = point(5.6037, -0.1870);
        assert_close(geodesic_distance_m(accra, accra), 0.0, 1e-9);
    }

    #[test]
    fn one_degree_along_the_equator_matches_the_semi_major_axis() {
        // a * (pi / 180)
        assert_close(
            geodesic_distance_m(point(0.0, 0.0), point(0.0, 1.0)),
            111_319.491,
            0.01,
        );
        assert_close(
            geodesic_distance_m(point(0.0, 0.0), point(0.0, 5.0)),
            556_597.454,
            0.01,
        );
    }

    #[test]
    fn one_degree_along_a_meridian_is_shorter_at_the_equator() {
        // WGS-84 meridian arc from 0° to 1° is about 110.574 km.
        assert_close(
            geodesic_distance_km(point(0.0, 0.0), point(1.0, 0.0)),
            110.574,
            0.001,
        );
    }

    #[test]
    fn distance_is_symmetric() {
        let berlin = point(52.5200, 13.4050);
        let lagos = point(6.5244, 3.3792);
        assert_close(
            geodesic_distance_m(berlin, lagos),
            geodesic_distance_m(lagos, berlin),
            1e-6,
        );
    }

    #[test]
    fn crossing_the_antimeridian_takes_the_short_way() {
        let east = point(0.0, 179.5);
        let west = point(0.0, -179.5);
        assert_close(geodesic_distance_km(east, west), 111.319, 0.001);
    }

    #[test]
    fn antipodal_points_are_half_a_meridian_apart() {
        // the shortest path between equatorial antipodes runs over a pole
        assert_close(
            geodesic_distance_m(point(0.0, 0.0), point(0.0, 180.0)),
            20_003_931.459,
            0.01,
        );
    }

    #[test]
    fn distance_grows_steadily_towards_the_antipode() {
        let origin = point(0.0, 0.0);
        let distances: Vec<f64> = (0..=20)
            .map(|step| geodesic_distance_m(origin, point(0.0, 179.0 + f64::from(step) * 0.05)))
            .collect();

        for pair in distances.windows(2) {
            let [nearer, farther] = pair else {
                continue;
            };
            assert!(
                farther >= nearer,
                "distance dropped from {nearer} to {farther}"
            );
        }
    }
}
