//! Organization read model and phone number normalization.

use crate::model::activity::Activity;
use crate::model::building::Building;
use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Stable organization identifier (`organizations.id`).
pub type OrganizationId = i64;

static PHONE_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{5,15}$").expect("valid phone regex"));

/// Phone number stored as a plain digit string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalizes separators (spaces, dashes, parentheses) and validates the rest.
    ///
    /// A leading `+` is dropped after validation; stored numbers are digits only.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let compact: String = raw
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '-' | '(' | ')'))
            .collect();
        if !PHONE_DIGITS_RE.is_match(&compact) {
            return Err(ValidationError::InvalidPhone(raw.to_string()));
        }
        Ok(Self(compact.trim_start_matches('+').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

/// Fully materialized organization: building, phones and activities resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub building: Building,
    pub phones: Vec<PhoneNumber>,
    pub activities: Vec<Activity>,
}
