//! Search engine composition over an injected directory repository.
//!
//! # Responsibility
//! - Validate query input and fail fast before any data access.
//! - Compose prefilter, ranking and activity expansion into search use-cases.
//! - Serve the plain id/name/building lookups of the directory.
//!
//! # Invariants
//! - Radius results lie within the radius and are sorted by distance.
//! - Rectangle results are exactly the organizations inside the box.
//! - Activity results contain each organization once, in repository order.

use crate::config::{ConfigError, SearchConfig};
use crate::geo::{radius_box, rectangle_box, BoundingBox};
use crate::model::activity::ActivityId;
use crate::model::building::{Building, BuildingId};
use crate::model::organization::{Organization, OrganizationId};
use crate::model::point::Point;
use crate::model::validation::{ensure_distance_km, ensure_query_text, ValidationError};
use crate::repo::directory_repo::{DirectoryRepository, RepoError};
use crate::search::activity_tree::expand_activity_ids;
use crate::search::ranker::rank_by_distance;
use log::{debug, info};
use std::collections::{BTreeSet, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const ACTIVITY_NAME_CHARS: (usize, usize) = (2, 20);
const ORGANIZATION_NAME_CHARS: (usize, usize) = (1, 50);

pub type SearchResult<T> = Result<T, SearchError>;

/// Errors surfaced by search use-cases.
#[derive(Debug)]
pub enum SearchError {
    /// Query input rejected before data access.
    Validation(ValidationError),
    /// Repository failure, passed through unchanged.
    Repo(RepoError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid search request: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SearchError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for SearchError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome of an activity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySearch {
    /// Matched activities plus descendants within the requested depth.
    pub activity_ids: BTreeSet<ActivityId>,
    /// Organizations linked to any of `activity_ids`, each listed once.
    pub organizations: Vec<Organization>,
}

impl ActivitySearch {
    /// True when no activity name matched at all.
    pub fn is_unknown_activity(&self) -> bool {
        self.activity_ids.is_empty()
    }
}

/// Search facade over a [`DirectoryRepository`].
pub struct SearchEngine<R: DirectoryRepository> {
    repo: R,
    config: SearchConfig,
}

impl<R: DirectoryRepository> SearchEngine<R> {
    /// Creates an engine with [`SearchConfig::default`].
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            config: SearchConfig::default(),
        }
    }

    /// Creates an engine with an explicit, validated configuration.
    pub fn with_config(repo: R, config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { repo, config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Organizations within `radius_km` of `center`, nearest first.
    pub fn search_by_radius(&self, center: Point, radius_km: f64) -> SearchResult<Vec<Organization>> {
        let radius_km = ensure_distance_km("radius", radius_km, self.config.max_search_distance_km)?;
        let started_at = Instant::now();

        let bbox = radius_box(center, radius_km);
        let candidates = self.organizations_in_box(&bbox)?;
        let candidate_count = candidates.len();
        let ranked = rank_by_distance(candidates, center, Some(radius_km));

        info!(
            "event=search_radius module=search status=ok lat={} lon={} radius_km={} candidates={} results={} duration_ms={}",
            center.latitude(),
            center.longitude(),
            radius_km,
            candidate_count,
            ranked.len(),
            started_at.elapsed().as_millis()
        );
        Ok(ranked)
    }

    /// Organizations inside the rectangle spanned by the two half-extents,
    /// ordered by distance from `center`.
    ///
    /// Box membership alone decides inclusion.
    pub fn search_by_rectangle(
        &self,
        center: Point,
        lat_extent_km: f64,
        lon_extent_km: f64,
    ) -> SearchResult<Vec<Organization>> {
        let max_km = self.config.max_search_distance_km;
        let lat_extent_km = ensure_distance_km("latitude offset", lat_extent_km, max_km)?;
        let lon_extent_km = ensure_distance_km("longitude offset", lon_extent_km, max_km)?;
        let started_at = Instant::now();

        let bbox = rectangle_box(center, lat_extent_km, lon_extent_km);
        debug!(
            "event=search_rectangle module=search status=bounds min_lat={:.6} max_lat={:.6} min_lon={:.6} max_lon={:.6}",
            bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon
        );

        let candidates = self.organizations_in_box(&bbox)?;
        let ranked = rank_by_distance(candidates, center, None);

        info!(
            "event=search_rectangle module=search status=ok lat={} lon={} lat_extent_km={} lon_extent_km={} results={} duration_ms={}",
            center.latitude(),
            center.longitude(),
            lat_extent_km,
            lon_extent_km,
            ranked.len(),
            started_at.elapsed().as_millis()
        );
        Ok(ranked)
    }

    /// Organizations linked to activities matching `activity_name`, including
    /// descendant categories down to `max_depth` generations.
    pub fn search_by_activity(
        &self,
        activity_name: &str,
        max_depth: u32,
    ) -> SearchResult<ActivitySearch> {
        let (min_chars, max_chars) = ACTIVITY_NAME_CHARS;
        let activity_name =
            ensure_query_text("activity name", activity_name, min_chars, max_chars)?;
        if max_depth == 0 {
            return Err(ValidationError::ZeroDepth.into());
        }
        let max_depth = max_depth.min(self.config.max_activity_depth);
        let started_at = Instant::now();

        let activity_ids = expand_activity_ids(&self.repo, activity_name, max_depth)?;
        if activity_ids.is_empty() {
            info!(
                "event=search_activity module=search status=no_match depth={} duration_ms={}",
                max_depth,
                started_at.elapsed().as_millis()
            );
            return Ok(ActivitySearch {
                activity_ids,
                organizations: Vec::new(),
            });
        }

        let linked = self.repo.find_organizations_by_activity_id_in(&activity_ids)?;
        let organizations = dedupe_by_id(linked);

        info!(
            "event=search_activity module=search status=ok depth={} activities={} results={} duration_ms={}",
            max_depth,
            activity_ids.len(),
            organizations.len(),
            started_at.elapsed().as_millis()
        );
        Ok(ActivitySearch {
            activity_ids,
            organizations,
        })
    }

    /// [`Self::search_by_activity`] with the configured default depth.
    pub fn search_by_activity_default(&self, activity_name: &str) -> SearchResult<ActivitySearch> {
        self.search_by_activity(activity_name, self.config.default_activity_depth)
    }

    /// Loads one organization by id.
    pub fn organization_by_id(
        &self,
        organization_id: OrganizationId,
    ) -> SearchResult<Option<Organization>> {
        Ok(self.repo.get_organization(organization_id)?)
    }

    /// Loads one organization whose name equals `name` exactly.
    pub fn organization_by_name(&self, name: &str) -> SearchResult<Option<Organization>> {
        let (min_chars, max_chars) = ORGANIZATION_NAME_CHARS;
        let name = ensure_query_text("organization name", name, min_chars, max_chars)?;
        Ok(self.repo.find_organization_by_name(name)?)
    }

    /// Organizations hosted in a building; `None` when the building is unknown.
    pub fn organizations_in_building(
        &self,
        building_id: BuildingId,
    ) -> SearchResult<Option<Vec<Organization>>> {
        if self.repo.get_building(building_id)?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.repo.find_organizations_by_building_id(building_id)?))
    }

    /// Every building in the directory.
    pub fn list_buildings(&self) -> SearchResult<Vec<Building>> {
        Ok(self.repo.list_buildings()?)
    }

    fn organizations_in_box(&self, bbox: &BoundingBox) -> SearchResult<Vec<Organization>> {
        let buildings = self.repo.find_buildings_in_box(bbox)?;
        let mut organizations = Vec::new();
        for building in &buildings {
            organizations.extend(self.repo.find_organizations_by_building_id(building.id)?);
        }
        debug!(
            "event=box_prefilter module=search status=ok buildings={} organizations={}",
            buildings.len(),
            organizations.len()
        );
        Ok(organizations)
    }
}

fn dedupe_by_id(organizations: Vec<Organization>) -> Vec<Organization> {
    let mut seen = HashSet::new();
    organizations
        .into_iter()
        .filter(|organization| seen.insert(organization.id))
        .collect()
}
