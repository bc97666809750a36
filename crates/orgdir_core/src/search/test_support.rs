//! In-memory directory used by search unit tests.

use crate::geo::BoundingBox;
use crate::model::activity::{Activity, ActivityId};
use crate::model::building::{Building, BuildingId};
use crate::model::organization::{Organization, OrganizationId};
use crate::model::point::Point;
use crate::repo::directory_repo::{DirectoryRepository, RepoError, RepoResult};
use std::cell::Cell;
use std::collections::BTreeSet;

#[derive(Default)]
pub(crate) struct FakeDirectory {
    pub buildings: Vec<Building>,
    pub organizations: Vec<Organization>,
    pub activities: Vec<Activity>,
    /// `(organization, activity)` links in insertion order.
    pub links: Vec<(OrganizationId, ActivityId)>,
    pub failure: Option<String>,
    parent_queries: Cell<usize>,
    box_queries: Cell<usize>,
}

impl FakeDirectory {
    pub fn with_activities(activities: Vec<Activity>) -> Self {
        Self {
            activities,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn parent_queries(&self) -> usize {
        self.parent_queries.get()
    }

    pub fn box_queries(&self) -> usize {
        self.box_queries.get()
    }

    /// Adds an organization, registering its building once.
    pub fn add_organization(&mut self, organization: Organization) {
        if !self
            .buildings
            .iter()
            .any(|building| building.id == organization.building.id)
        {
            self.buildings.push(organization.building.clone());
        }
        for activity in &organization.activities {
            self.links.push((organization.id, activity.id));
        }
        self.organizations.push(organization);
    }

    fn check(&self) -> RepoResult<()> {
        match &self.failure {
            Some(message) => Err(RepoError::InvalidData(message.clone())),
            None => Ok(()),
        }
    }

    fn organization(&self, id: OrganizationId) -> Option<Organization> {
        self.organizations.iter().find(|org| org.id == id).cloned()
    }
}

impl DirectoryRepository for FakeDirectory {
    fn find_buildings_in_box(&self, bbox: &BoundingBox) -> RepoResult<Vec<Building>> {
        self.check()?;
        self.box_queries.set(self.box_queries.get() + 1);
        Ok(self
            .buildings
            .iter()
            .filter(|building| bbox.contains(building.location))
            .cloned()
            .collect())
    }

    fn find_organizations_by_building_id(
        &self,
        building_id: BuildingId,
    ) -> RepoResult<Vec<Organization>> {
        self.check()?;
        Ok(self
            .organizations
            .iter()
            .filter(|org| org.building.id == building_id)
            .cloned()
            .collect())
    }

    fn find_activities_by_name_contains(&self, needle: &str) -> RepoResult<Vec<Activity>> {
        self.check()?;
        let needle = needle.to_lowercase();
        Ok(self
            .activities
            .iter()
            .filter(|activity| activity.name_contains(&needle))
            .cloned()
            .collect())
    }

    fn find_activities_by_parent_id_in(
        &self,
        parent_ids: &BTreeSet<ActivityId>,
    ) -> RepoResult<Vec<Activity>> {
        self.check()?;
        self.parent_queries.set(self.parent_queries.get() + 1);
        Ok(self
            .activities
            .iter()
            .filter(|activity| {
                activity
                    .parent_id
                    .is_some_and(|parent| parent_ids.contains(&parent))
            })
            .cloned()
            .collect())
    }

    fn find_organizations_by_activity_id_in(
        &self,
        activity_ids: &BTreeSet<ActivityId>,
    ) -> RepoResult<Vec<Organization>> {
        self.check()?;
        Ok(self
            .links
            .iter()
            .filter(|(_, activity_id)| activity_ids.contains(activity_id))
            .filter_map(|(org_id, _)| self.organization(*org_id))
            .collect())
    }

    fn get_building(&self, building_id: BuildingId) -> RepoResult<Option<Building>> {
        self.check()?;
        Ok(self
            .buildings
            .iter()
            .find(|building| building.id == building_id)
            .cloned())
    }

    fn list_buildings(&self) -> RepoResult<Vec<Building>> {
        self.check()?;
        Ok(self.buildings.clone())
    }

    fn get_organization(
        &self,
        organization_id: OrganizationId,
    ) -> RepoResult<Option<Organization>> {
        self.check()?;
        Ok(self.organization(organization_id))
    }

    fn find_organization_by_name(&self, name: &str) -> RepoResult<Option<Organization>> {
        self.check()?;
        Ok(self
            .organizations
            .iter()
            .find(|org| org.name == name)
            .cloned())
    }
}

/// Organization alone in a building at `(lat, lon)`; the building id equals the org id.
pub(crate) fn organization_at(id: i64, name: &str, lat: f64, lon: f64) -> Organization {
    Organization {
        id,
        name: name.to_string(),
        building: Building {
            id,
            address: format!("{name} street, 1"),
            location: Point::new(lat, lon).unwrap(),
        },
        phones: Vec::new(),
        activities: Vec::new(),
    }
}

/// Two-root forest: Еда → {Мясная, Молочная}; Автомобили → {Грузовые, Легковые → {Запчасти, Аксессуары}}.
pub(crate) fn demo_forest() -> Vec<Activity> {
    let node = |id: i64, name: &str, parent_id: Option<i64>| Activity {
        id,
        name: name.to_string(),
        parent_id,
    };
    vec![
        node(1, "Еда", None),
        node(2, "Мясная продукция", Some(1)),
        node(3, "Молочная продукция", Some(1)),
        node(4, "Автомобили", None),
        node(5, "Грузовые", Some(4)),
        node(6, "Легковые", Some(4)),
        node(7, "Запчасти", Some(6)),
        node(8, "Аксессуары", Some(6)),
    ]
}
