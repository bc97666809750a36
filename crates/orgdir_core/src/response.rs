//! Response envelope for directory queries.
//!
//! # Responsibility
//! - Shape search/lookup outcomes into the externally visible payload.
//! - Own the numeric response code taxonomy.
//!
//! # Invariants
//! - `response_type` is `success` exactly when `code == 0`.
//! - Result-carrying fields are omitted, not null, when absent.

use crate::model::building::Building;
use crate::model::organization::Organization;
use crate::model::point::Point;
use crate::search::ActivitySearch;
use serde::{Deserialize, Serialize};

/// Numeric outcome codes carried in [`ResponseEnvelope::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    OrganizationIdNotFound,
    OrganizationNameNotFound,
    BuildingNotFound,
    ActivityNotFound,
    OrganizationIdFailed,
    OrganizationNameFailed,
    BuildingListFailed,
    BuildingOrganizationsFailed,
    ActivitySearchFailed,
    RadiusSearchFailed,
    RectangleSearchFailed,
}

impl ResponseCode {
    pub fn code(self) -> u16 {
        match self {
            Self::Success => 0,
            Self::OrganizationIdNotFound => 20,
            Self::OrganizationNameNotFound => 21,
            Self::BuildingNotFound => 22,
            Self::ActivityNotFound => 23,
            Self::OrganizationIdFailed => 50,
            Self::OrganizationNameFailed => 51,
            Self::BuildingListFailed => 52,
            Self::BuildingOrganizationsFailed => 53,
            Self::ActivitySearchFailed => 54,
            Self::RadiusSearchFailed => 55,
            Self::RectangleSearchFailed => 56,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Success,
    Error,
}

/// Organization as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationInfo {
    pub id: i64,
    pub name: String,
    pub phones: Vec<u64>,
    pub activities: Vec<String>,
    pub address: String,
}

impl From<&Organization> for OrganizationInfo {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            name: org.name.clone(),
            phones: org
                .phones
                .iter()
                .filter_map(|phone| phone.as_str().parse().ok())
                .collect(),
            activities: org
                .activities
                .iter()
                .map(|activity| activity.name.clone())
                .collect(),
            address: org.building.address.clone(),
        }
    }
}

/// Building as exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInfo {
    pub id: i64,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Building> for BuildingInfo {
    fn from(building: &Building) -> Self {
        Self {
            id: building.id,
            address: building.address.clone(),
            latitude: building.location.latitude(),
            longitude: building.location.longitude(),
        }
    }
}

/// Single organization for lookups, a list for searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrganizationPayload {
    One(OrganizationInfo),
    Many(Vec<OrganizationInfo>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDetail {
    pub message: String,
    pub response_type: ResponseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<Vec<BuildingInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<usize>,
}

/// `{ "code": .., "detail": { "message": .., "response_type": .., ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub code: u16,
    pub detail: ResponseDetail,
}

impl ResponseEnvelope {
    fn new(code: ResponseCode, message: impl Into<String>) -> Self {
        let response_type = if code == ResponseCode::Success {
            ResponseType::Success
        } else {
            ResponseType::Error
        };
        Self {
            code: code.code(),
            detail: ResponseDetail {
                message: message.into(),
                response_type,
                organization: None,
                building: None,
                qty: None,
            },
        }
    }

    /// Failure envelope without result fields.
    pub fn error(code: ResponseCode, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }

    /// Success envelope listing organizations and their count.
    pub fn organizations(message: impl Into<String>, organizations: &[Organization]) -> Self {
        let mut envelope = Self::new(ResponseCode::Success, message);
        envelope.detail.organization = Some(OrganizationPayload::Many(
            organizations.iter().map(OrganizationInfo::from).collect(),
        ));
        envelope.detail.qty = Some(organizations.len());
        envelope
    }

    /// Success envelope for a single organization lookup.
    pub fn organization(organization: &Organization) -> Self {
        let mut envelope = Self::new(ResponseCode::Success, "organization found");
        envelope.detail.organization = Some(OrganizationPayload::One(OrganizationInfo::from(
            organization,
        )));
        envelope
    }

    /// Success envelope listing buildings.
    pub fn buildings(buildings: &[Building]) -> Self {
        let mut envelope = Self::new(
            ResponseCode::Success,
            format!("found {} buildings", buildings.len()),
        );
        envelope.detail.building = Some(buildings.iter().map(BuildingInfo::from).collect());
        envelope
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Envelope for a radius search result.
pub fn radius_response(center: Point, radius_km: f64, found: &[Organization]) -> ResponseEnvelope {
    ResponseEnvelope::organizations(
        format!(
            "found {} organizations within {} km of ({}, {})",
            found.len(),
            radius_km,
            center.latitude(),
            center.longitude()
        ),
        found,
    )
}

/// Envelope for a rectangle search result; the message reports full box size.
pub fn rectangle_response(
    center: Point,
    lat_extent_km: f64,
    lon_extent_km: f64,
    found: &[Organization],
) -> ResponseEnvelope {
    ResponseEnvelope::organizations(
        format!(
            "found {} organizations in a {}x{} km area around ({}, {})",
            found.len(),
            lat_extent_km * 2.0,
            lon_extent_km * 2.0,
            center.latitude(),
            center.longitude()
        ),
        found,
    )
}

/// Envelope for an activity search; unknown activities map to code 23 with an empty list.
pub fn activity_response(activity_name: &str, search: &ActivitySearch) -> ResponseEnvelope {
    if search.is_unknown_activity() {
        let mut envelope = ResponseEnvelope::error(
            ResponseCode::ActivityNotFound,
            format!("no activities named like '{activity_name}'"),
        );
        envelope.detail.organization = Some(OrganizationPayload::Many(Vec::new()));
        envelope.detail.qty = Some(0);
        return envelope;
    }

    ResponseEnvelope::organizations(
        format!(
            "found {} organizations for activity '{}' (including {} related activity types)",
            search.organizations.len(),
            activity_name,
            search.activity_ids.len()
        ),
        &search.organizations,
    )
}

/// Envelope for organizations in one building; `None` means the building is unknown.
pub fn building_response(
    building_id: i64,
    organizations: Option<&[Organization]>,
) -> ResponseEnvelope {
    match organizations {
        Some(found) => ResponseEnvelope::organizations(
            format!("found {} organizations in building", found.len()),
            found,
        ),
        None => ResponseEnvelope::error(
            ResponseCode::BuildingNotFound,
            format!("building with id {building_id} not found"),
        ),
    }
}
