//! Great-circle distance for venue-gated check-in.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_MILES: f64 = 3959.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Haversine distance in miles.
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().atan2((1.0 - h).sqrt())
}

pub fn within_radius(user: Coordinates, target: Coordinates, radius_miles: f64) -> bool {
    distance_miles(user, target) <= radius_miles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_to_self() {
        let p = Coordinates { lat: 29.76, lng: -95.37 };
        assert!(distance_miles(p, p).abs() < 1e-9);
        assert!(within_radius(p, p, 0.0));
    }

    #[test]
    fn one_degree_of_latitude_is_about_69_miles() {
        let a = Coordinates { lat: 30.0, lng: -95.0 };
        let b = Coordinates { lat: 31.0, lng: -95.0 };
        let d = distance_miles(a, b);
        assert!((d - 69.1).abs() < 0.5, "got {d}");
        assert!(!within_radius(a, b, 1.0));
    }
}
