//! Exact-distance filtering and ordering of prefiltered candidates.

use crate::geo::distance_km;
use crate::model::organization::Organization;
use crate::model::point::Point;

struct Candidate {
    organization: Organization,
    distance_km: f64,
}

/// Orders `organizations` by great-circle distance from `origin`.
///
/// With `radius_km`, candidates farther than the radius are dropped; a
/// candidate exactly on the radius is kept. Sorting is stable, so equally
/// distant organizations keep the order they were received in.
pub fn rank_by_distance(
    organizations: Vec<Organization>,
    origin: Point,
    radius_km: Option<f64>,
) -> Vec<Organization> {
    let mut candidates: Vec<Candidate> = organizations
        .into_iter()
        .map(|organization| Candidate {
            distance_km: distance_km(origin, organization.building.location),
            organization,
        })
        .filter(|candidate| radius_km.map_or(true, |radius| candidate.distance_km <= radius))
        .collect();

    candidates.sort_by(|left, right| left.distance_km.total_cmp(&right.distance_km));

    candidates
        .into_iter()
        .map(|candidate| candidate.organization)
        .collect()
}
