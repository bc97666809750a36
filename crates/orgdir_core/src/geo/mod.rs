//! Coordinate math for area queries.
//!
//! # Responsibility
//! - Exact great-circle distance between two points (haversine).
//! - Approximate kilometer-to-degree conversion used to size prefilter boxes.
//!
//! # Invariants
//! - Inputs are pre-validated `Point`s; no range checks happen here.
//! - `distance_km` is symmetric, non-negative and zero for identical points.

pub mod bbox;

use crate::model::point::Point;

pub use bbox::{radius_box, rectangle_box, BoundingBox};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Length of one degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.32;

/// Great-circle distance between `from` and `to` in kilometers.
///
/// ```
/// use orgdir_core::geo::distance_km;
/// use orgdir_core::Point;
///
/// let a = Point::new(55.751244, 37.618423).unwrap();
/// let b = Point::new(55.753215, 37.620393).unwrap();
/// let d = distance_km(a, b);
/// assert!(d > 0.2 && d < 0.3);
/// ```
pub fn distance_km(from: Point, to: Point) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let delta_lat = (to.latitude() - from.latitude()).to_radians();
    let delta_lon = (to.longitude() - from.longitude()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` marginally above 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Converts `km` into `(latitude, longitude)` degree offsets around `latitude`.
///
/// Flat per-degree approximation; only good enough to size a prefilter box.
/// Longitude degrees shrink with `cos(latitude)`; at the poles the cosine
/// vanishes and the equatorial ratio is used instead so the result stays finite.
pub fn km_to_degree_offsets(km: f64, latitude: f64) -> (f64, f64) {
    let lat_offset = km / KM_PER_DEGREE;

    let cos_lat = latitude.to_radians().cos();
    let lon_offset = if cos_lat.abs() <= f64::EPSILON {
        km / KM_PER_DEGREE
    } else {
        km / (KM_PER_DEGREE * cos_lat)
    };

    (lat_offset, lon_offset)
}

#[cfg(test)]
mod tests {
    use super::{distance_km, km_to_degree_offsets, KM_PER_DEGREE};
    use crate::model::point::Point;

    fn point(lat: f64, lon: f64) -> Point {
        Point::new(lat, lon).unwrap()
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let samples = [
            point(55.751244, 37.618423),
            point(-33.8688, 151.2093),
            point(0.0, 0.0),
            point(89.9, -179.9),
            point(-90.0, 180.0),
        ];
        for a in samples {
            assert_eq!(distance_km(a, a), 0.0);
            for b in samples {
                assert_eq!(distance_km(a, b), distance_km(b, a));
                assert!(distance_km(a, b) >= 0.0);
            }
        }
    }

    #[test]
    fn distance_matches_known_city_pair() {
        // London -> Paris is roughly 344 km.
        let london = point(51.5074, -0.1278);
        let paris = point(48.8566, 2.3522);
        let d = distance_km(london, paris);
        assert!((d - 344.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_circumference_apart() {
        let d = distance_km(point(0.0, 0.0), point(0.0, 180.0));
        assert!((d - std::f64::consts::PI * 6371.0).abs() < 1e-6);
    }

    #[test]
    fn moscow_neighbours_are_about_a_quarter_km_apart() {
        let d = distance_km(point(55.751244, 37.618423), point(55.753215, 37.620393));
        assert!(d > 0.2 && d < 0.3, "got {d}");
    }

    #[test]
    fn offsets_at_equator_are_equal() {
        let (lat, lon) = km_to_degree_offsets(111.32, 0.0);
        assert!((lat - 1.0).abs() < 1e-12);
        assert!((lon - 1.0).abs() < 1e-12);
    }

    #[test]
    fn longitude_offset_grows_with_latitude() {
        let (lat_60, lon_60) = km_to_degree_offsets(10.0, 60.0);
        assert!((lat_60 - 10.0 / KM_PER_DEGREE).abs() < 1e-12);
        assert!((lon_60 - 2.0 * 10.0 / KM_PER_DEGREE).abs() < 1e-9);

        let (_, lon_south) = km_to_degree_offsets(10.0, -60.0);
        assert!((lon_south - lon_60).abs() < 1e-12);
    }

    #[test]
    fn polar_offsets_are_finite() {
        for latitude in [90.0, -90.0] {
            let (lat, lon) = km_to_degree_offsets(25.0, latitude);
            assert!(lat.is_finite());
            assert!(lon.is_finite());
            assert!((lon - 25.0 / KM_PER_DEGREE).abs() < 1e-12);
        }
    }
}
