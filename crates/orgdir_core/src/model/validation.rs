//! Input validation errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Malformed input rejected before any data access happens.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Latitude is outside `[-90, 90]` or not finite.
    LatitudeOutOfRange(f64),
    /// Longitude is outside `[-180, 180]` or not finite.
    LongitudeOutOfRange(f64),
    /// A distance argument is zero, negative or NaN.
    NonPositiveDistance { field: &'static str, value: f64 },
    /// A distance argument exceeds the supported maximum.
    DistanceTooLarge {
        field: &'static str,
        value: f64,
        max: f64,
    },
    /// A required text field is blank after trim.
    BlankText(&'static str),
    /// Text is shorter than `min` characters.
    TextTooShort { field: &'static str, min: usize },
    /// Text is longer than `max` characters.
    TextTooLong { field: &'static str, max: usize },
    /// Activity expansion depth must be at least one.
    ZeroDepth,
    /// Phone number does not match the accepted digit format.
    InvalidPhone(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
            Self::NonPositiveDistance { field, value } => {
                write!(f, "{field} must be greater than 0 km, got {value}")
            }
            Self::DistanceTooLarge { field, value, max } => {
                write!(f, "{field} must not exceed {max} km, got {value}")
            }
            Self::BlankText(field) => write!(f, "{field} must not be blank"),
            Self::TextTooShort { field, min } => {
                write!(f, "{field} must be at least {min} characters")
            }
            Self::TextTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::ZeroDepth => write!(f, "activity depth must be at least 1"),
            Self::InvalidPhone(value) => write!(f, "invalid phone number `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Checks that a distance in kilometers is finite, positive and at most `max_km`.
pub fn ensure_distance_km(field: &'static str, value: f64, max_km: f64) -> Result<f64, ValidationError> {
    if value.is_nan() || value <= 0.0 {
        return Err(ValidationError::NonPositiveDistance { field, value });
    }
    if value > max_km {
        return Err(ValidationError::DistanceTooLarge {
            field,
            value,
            max: max_km,
        });
    }
    Ok(value)
}

/// Trims `value` and rejects it when nothing is left.
pub fn normalize_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankText(field));
    }
    Ok(trimmed.to_string())
}

/// Checks a search term as given: not blank, and `min..=max` characters long.
///
/// The term is not trimmed; surrounding whitespace is part of what is matched.
pub fn ensure_query_text<'a>(
    field: &'static str,
    value: &'a str,
    min: usize,
    max: usize,
) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankText(field));
    }
    let chars = value.chars().count();
    if chars < min {
        return Err(ValidationError::TextTooShort { field, min });
    }
    if chars > max {
        return Err(ValidationError::TextTooLong { field, max });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{ensure_distance_km, ensure_query_text, normalize_text, ValidationError};

    #[test]
    fn distance_must_be_positive_and_bounded() {
        assert_eq!(ensure_distance_km("radius", 1.1, 6371.0), Ok(1.1));
        assert!(matches!(
            ensure_distance_km("radius", 0.0, 6371.0),
            Err(ValidationError::NonPositiveDistance { field: "radius", .. })
        ));
        assert!(matches!(
            ensure_distance_km("radius", f64::NAN, 6371.0),
            Err(ValidationError::NonPositiveDistance { .. })
        ));
        assert!(matches!(
            ensure_distance_km("radius", 7000.0, 6371.0),
            Err(ValidationError::DistanceTooLarge { .. })
        ));
    }

    #[test]
    fn infinite_distance_is_too_large() {
        assert!(matches!(
            ensure_distance_km("radius", f64::INFINITY, 6371.0),
            Err(ValidationError::DistanceTooLarge { .. })
        ));
    }

    #[test]
    fn normalize_text_trims_and_rejects_blank() {
        assert_eq!(normalize_text("name", "  Еда ").unwrap(), "Еда");
        assert_eq!(
            normalize_text("name", " \t "),
            Err(ValidationError::BlankText("name"))
        );
    }

    #[test]
    fn query_text_length_counts_characters() {
        assert_eq!(ensure_query_text("activity name", "Еда", 2, 20), Ok("Еда"));
        assert_eq!(ensure_query_text("activity name", " Лег", 2, 20), Ok(" Лег"));
        assert_eq!(
            ensure_query_text("activity name", "Е", 2, 20),
            Err(ValidationError::TextTooShort {
                field: "activity name",
                min: 2
            })
        );
        assert_eq!(
            ensure_query_text("activity name", &"я".repeat(21), 2, 20),
            Err(ValidationError::TextTooLong {
                field: "activity name",
                max: 20
            })
        );
        assert_eq!(
            ensure_query_text("activity name", "  ", 2, 20),
            Err(ValidationError::BlankText("activity name"))
        );
    }
}
