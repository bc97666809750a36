//! Demo directory contents for local runs and tests.
//!
//! Three buildings in central Moscow, a two-root activity forest and two
//! organizations. Seeding is not idempotent; run it on an empty database.

use crate::model::activity::ActivityId;
use crate::model::building::BuildingId;
use crate::model::organization::{OrganizationId, PhoneNumber};
use crate::model::point::Point;
use crate::repo::directory_repo::{NewOrganization, RepoResult, SqliteDirectoryRepository};
use log::info;

/// Ids assigned to the seeded rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededDirectory {
    pub buildings: Vec<BuildingId>,
    pub activities: Vec<ActivityId>,
    pub organizations: Vec<OrganizationId>,
}

const BUILDINGS: [(&str, f64, f64); 3] = [
    ("г. Москва, ул. Блюхера, 32/1", 55.751244, 37.618423),
    ("г. Москва, ул. Ленина, 1, офис 3", 55.753215, 37.620393),
    ("г. Москва, ул. Красная, 3, офис 1", 55.752166, 37.621001),
];

const PHONES: [&str; 3] = ["2222222", "3333333", "89236661313"];

/// Populates an empty directory with the demo dataset.
pub fn seed_demo_directory(repo: &SqliteDirectoryRepository<'_>) -> RepoResult<SeededDirectory> {
    let mut buildings = Vec::with_capacity(BUILDINGS.len());
    for (address, latitude, longitude) in BUILDINGS {
        buildings.push(repo.create_building(address, Point::new(latitude, longitude)?)?);
    }

    let food = repo.create_activity("Еда", None)?;
    let meat = repo.create_activity("Мясная продукция", Some(food))?;
    let dairy = repo.create_activity("Молочная продукция", Some(food))?;
    let cars = repo.create_activity("Автомобили", None)?;
    let trucks = repo.create_activity("Грузовые", Some(cars))?;
    let passenger = repo.create_activity("Легковые", Some(cars))?;
    let parts = repo.create_activity("Запчасти", Some(passenger))?;
    let accessories = repo.create_activity("Аксессуары", Some(passenger))?;

    let phones = PHONES
        .into_iter()
        .map(PhoneNumber::parse)
        .collect::<Result<Vec<_>, _>>()?;

    let horns_and_hooves = repo.create_organization(&NewOrganization {
        name: "ООО \"Рога и Копыта\"".to_string(),
        building_id: buildings[0],
        phones: phones.clone(),
        activity_ids: vec![meat, dairy],
    })?;
    let auto_parts = repo.create_organization(&NewOrganization {
        name: "АО \"Автозапчасти+\"".to_string(),
        building_id: buildings[1],
        phones: vec![phones[1].clone()],
        activity_ids: vec![parts, accessories],
    })?;

    let seeded = SeededDirectory {
        buildings,
        activities: vec![food, meat, dairy, cars, trucks, passenger, parts, accessories],
        organizations: vec![horns_and_hooves, auto_parts],
    };
    info!(
        "event=seed module=seed status=ok buildings={} activities={} organizations={}",
        seeded.buildings.len(),
        seeded.activities.len(),
        seeded.organizations.len()
    );
    Ok(seeded)
}
