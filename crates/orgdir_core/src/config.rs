//! Search engine configuration.
//!
//! # Invariants
//! - `1 <= default_activity_depth <= max_activity_depth`.
//! - `max_search_distance_km` is finite and positive.

use crate::geo::EARTH_RADIUS_KM;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Depth used by activity search when the caller does not pass one.
pub const DEFAULT_ACTIVITY_DEPTH: u32 = 3;

/// Hard cap on caller-provided activity depth.
pub const MAX_ACTIVITY_DEPTH: u32 = 10;

/// Tunables for [`crate::search::SearchEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Generations visited by activity search, counting the matched level.
    pub default_activity_depth: u32,
    /// Largest depth a caller may request.
    pub max_activity_depth: u32,
    /// Largest radius or rectangle extent accepted, in kilometers.
    pub max_search_distance_km: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_activity_depth: DEFAULT_ACTIVITY_DEPTH,
            max_activity_depth: MAX_ACTIVITY_DEPTH,
            max_search_distance_km: EARTH_RADIUS_KM,
        }
    }
}

/// Invalid search configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// JSON could not be parsed into [`SearchConfig`].
    Parse(serde_json::Error),
    /// A value is outside its allowed range.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid search config: {err}"),
            Self::Invalid(message) => write!(f, "invalid search config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl SearchConfig {
    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_activity_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_activity_depth must be at least 1".to_string(),
            ));
        }
        if self.default_activity_depth == 0 || self.default_activity_depth > self.max_activity_depth
        {
            return Err(ConfigError::Invalid(format!(
                "default_activity_depth must be within 1..={}, got {}",
                self.max_activity_depth, self.default_activity_depth
            )));
        }
        if !self.max_search_distance_km.is_finite() || self.max_search_distance_km <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_search_distance_km must be a positive number, got {}",
                self.max_search_distance_km
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SearchConfig, DEFAULT_ACTIVITY_DEPTH};

    #[test]
    fn default_config_is_valid() {
        let config = SearchConfig::default();
        assert_eq!(config.default_activity_depth, DEFAULT_ACTIVITY_DEPTH);
        assert_eq!(config.max_search_distance_km, 6371.0);
        config.validate().expect("default config should validate");
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config = SearchConfig::from_json(r#"{ "default_activity_depth": 2 }"#).unwrap();
        assert_eq!(config.default_activity_depth, 2);
        assert_eq!(config.max_activity_depth, SearchConfig::default().max_activity_depth);
    }

    #[test]
    fn from_json_rejects_unknown_fields_and_bad_ranges() {
        assert!(matches!(
            SearchConfig::from_json(r#"{ "depth": 2 }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SearchConfig::from_json(r#"{ "default_activity_depth": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SearchConfig::from_json(r#"{ "default_activity_depth": 5, "max_activity_depth": 4 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SearchConfig::from_json(r#"{ "max_search_distance_km": -1.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }
}
