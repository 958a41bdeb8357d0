//! Great-circle distance between airports.
//!
//! The same function sets edge weights when the graph is built and serves as
//! the A* heuristic, so the heuristic can never exceed the cost of an edge.

use serde::Serialize;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to another point in kilometres.
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Haversine distance in kilometres between two points given in degrees.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const LHR: Coordinates = Coordinates {
        latitude: 51.4700,
        longitude: -0.4543,
    };
    const JFK: Coordinates = Coordinates {
        latitude: 40.6413,
        longitude: -73.7781,
    };

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(LHR.distance_to(&LHR), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(LHR.distance_to(&JFK), JFK.distance_to(&LHR));
    }

    #[test]
    fn london_to_new_york_is_about_5540_km() {
        let distance = LHR.distance_to(&JFK);
        assert!((distance - 5540.0).abs() < 15.0, "got {distance}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let distance = haversine(0.0, 0.0, 1.0, 0.0);
        assert!((distance - 111.195).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn antipodal_points_are_half_the_circumference_apart() {
        let distance = haversine(0.0, 0.0, 0.0, 180.0);
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_coordinates_are_invalid() {
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
        assert!(Coordinates::new(-33.9461, 151.1772).is_valid());
    }
}
