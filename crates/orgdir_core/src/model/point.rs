//! Geographic point value type.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// WGS-84 latitude/longitude pair in decimal degrees.
///
/// Construct through [`Point::new`], which rejects non-finite and out-of-range
/// values, so downstream math can assume valid input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct Point {
    latitude: f64,
    longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[derive(Deserialize)]
struct RawPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawPoint> for Point {
    type Error = ValidationError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::Point;
    use crate::model::validation::ValidationError;

    #[test]
    fn deserialization_applies_range_checks() {
        let point: Point =
            serde_json::from_str(r#"{"latitude":55.75,"longitude":37.61}"#).unwrap();
        assert_eq!(point, Point::new(55.75, 37.61).unwrap());

        let err = serde_json::from_str::<Point>(r#"{"latitude":500.0,"longitude":0.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("latitude 500"));
        assert!(serde_json::from_str::<Point>(r#"{"latitude":0.0,"longitude":-999.0}"#).is_err());
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(Point::new(90.0, 180.0).is_ok());
        assert!(Point::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        assert_eq!(
            Point::new(90.5, 0.0),
            Err(ValidationError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            Point::new(0.0, -180.1),
            Err(ValidationError::LongitudeOutOfRange(-180.1))
        );
        assert!(Point::new(f64::NAN, 0.0).is_err());
        assert!(Point::new(0.0, f64::INFINITY).is_err());
    }
}
