//! Bounding-box prefilter.
//!
//! A box is a cheap, inclusive `[min, max]` range over building coordinates.
//! For circular queries it over-selects near the corners; the distance ranker
//! removes those candidates afterwards.

use super::km_to_degree_offsets;
use crate::model::point::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned latitude/longitude rectangle in degrees.
///
/// Bounds are not clamped or wrapped: a box around a point near the
/// antimeridian may extend past ±180 and simply match nothing there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box centered on `center` with independent half-extents in degrees.
    pub fn around(center: Point, lat_offset_deg: f64, lon_offset_deg: f64) -> Self {
        Self {
            min_lat: center.latitude() - lat_offset_deg,
            max_lat: center.latitude() + lat_offset_deg,
            min_lon: center.longitude() - lon_offset_deg,
            max_lon: center.longitude() + lon_offset_deg,
        }
    }

    /// Inclusive membership test, identical to the range query repositories run.
    pub fn contains(&self, point: Point) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude())
            && (self.min_lon..=self.max_lon).contains(&point.longitude())
    }
}

/// Square-ish prefilter box for a circular search of `radius_km` around `center`.
pub fn radius_box(center: Point, radius_km: f64) -> BoundingBox {
    let (lat_offset, lon_offset) = km_to_degree_offsets(radius_km, center.latitude());
    BoundingBox::around(center, lat_offset, lon_offset)
}

/// Rectangle of `lat_extent_km` (north-south half-size) by `lon_extent_km`
/// (east-west half-size) around `center`.
///
/// Each extent is converted on its own, both at the center latitude.
pub fn rectangle_box(center: Point, lat_extent_km: f64, lon_extent_km: f64) -> BoundingBox {
    let (lat_offset, _) = km_to_degree_offsets(lat_extent_km, center.latitude());
    let (_, lon_offset) = km_to_degree_offsets(lon_extent_km, center.latitude());
    BoundingBox::around(center, lat_offset, lon_offset)
}

#[cfg(test)]
mod tests {
    use super::{radius_box, rectangle_box};
    use crate::geo::{distance_km, KM_PER_DEGREE};
    use crate::model::point::Point;

    #[test]
    fn radius_box_is_symmetric_around_center() {
        let center = Point::new(55.751244, 37.618423).unwrap();
        let bbox = radius_box(center, 1.1);

        assert!((center.latitude() - bbox.min_lat - (bbox.max_lat - center.latitude())).abs() < 1e-12);
        assert!((center.longitude() - bbox.min_lon - (bbox.max_lon - center.longitude())).abs() < 1e-12);
        assert!((bbox.max_lat - bbox.min_lat - 2.2 / KM_PER_DEGREE).abs() < 1e-12);
        assert!(bbox.max_lon - bbox.min_lon > bbox.max_lat - bbox.min_lat);
        assert!(bbox.contains(center));
    }

    #[test]
    fn radius_box_covers_the_whole_circle() {
        let center = Point::new(55.751244, 37.618423).unwrap();
        let radius = 5.0;
        let bbox = radius_box(center, radius);

        // Points on the circle along the axes must fall inside the box.
        let north = Point::new(bbox.max_lat, center.longitude()).unwrap();
        let east = Point::new(center.latitude(), bbox.max_lon).unwrap();
        assert!(distance_km(center, north) >= radius * 0.99);
        assert!(distance_km(center, east) >= radius * 0.99);
    }

    #[test]
    fn box_corners_can_exceed_radius() {
        let center = Point::new(10.0, 10.0).unwrap();
        let bbox = radius_box(center, 3.0);
        let corner = Point::new(bbox.max_lat, bbox.max_lon).unwrap();
        assert!(bbox.contains(corner));
        assert!(distance_km(center, corner) > 3.0);
    }

    #[test]
    fn rectangle_box_uses_independent_extents() {
        let center = Point::new(60.0, 30.0).unwrap();
        let bbox = rectangle_box(center, 2.0, 4.0);

        assert!((bbox.max_lat - center.latitude() - 2.0 / KM_PER_DEGREE).abs() < 1e-12);
        // cos(60°) = 0.5 doubles the longitude offset.
        assert!((bbox.max_lon - center.longitude() - 8.0 / KM_PER_DEGREE).abs() < 1e-9);
        assert!(bbox.contains(Point::new(60.0 - 1.0 / KM_PER_DEGREE, 30.0).unwrap()));
        assert!(!bbox.contains(Point::new(60.0 + 3.0 / KM_PER_DEGREE, 30.0).unwrap()));
    }

    #[test]
    fn contains_is_inclusive_on_edges() {
        let center = Point::new(0.0, 0.0).unwrap();
        let bbox = rectangle_box(center, 10.0, 10.0);
        let edge = Point::new(bbox.max_lat, bbox.min_lon).unwrap();
        assert!(bbox.contains(edge));
    }
}
