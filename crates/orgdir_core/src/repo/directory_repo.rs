//! Directory repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Answer range, equality and membership queries over buildings,
//!   organizations and activities.
//! - Resolve organizations together with their building, phones and
//!   activities.
//! - Provide the small write surface used to populate a directory.
//!
//! # Invariants
//! - Listing order is deterministic (`id ASC`).
//! - Persisted coordinates and phone numbers are re-validated on read.
//! - `find_organizations_by_activity_id_in` hydrates each organization once,
//!   however many of its activities match.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::geo::BoundingBox;
use crate::model::activity::{Activity, ActivityId};
use crate::model::building::{Building, BuildingId};
use crate::model::organization::{Organization, OrganizationId, PhoneNumber};
use crate::model::point::Point;
use crate::model::validation::{normalize_text, ValidationError};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BUILDING_SELECT_SQL: &str = "SELECT
    id,
    address,
    latitude,
    longitude
FROM buildings";

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    name,
    parent_id
FROM activities";

const ORGANIZATION_SELECT_SQL: &str = "SELECT
    o.id AS org_id,
    o.name AS org_name,
    b.id AS building_id,
    b.address AS address,
    b.latitude AS latitude,
    b.longitude AS longitude
FROM organizations o
INNER JOIN buildings b ON b.id = o.building_id";

const REQUIRED_TABLES: [&str; 6] = [
    "buildings",
    "phones",
    "activities",
    "organizations",
    "organization_phones",
    "organization_activities",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from directory repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Write input rejected before touching storage.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// A write referenced a row that does not exist.
    MissingReference { table: &'static str, id: i64 },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingReference { table, id } => {
                write!(f, "referenced row {id} does not exist in `{table}`")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "directory repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "directory repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid directory data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::MissingReference { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read-side data-access contract consumed by the search engine.
pub trait DirectoryRepository {
    /// Buildings whose coordinates fall inside the inclusive box.
    fn find_buildings_in_box(&self, bbox: &BoundingBox) -> RepoResult<Vec<Building>>;
    /// Resolved organizations hosted in one building.
    fn find_organizations_by_building_id(
        &self,
        building_id: BuildingId,
    ) -> RepoResult<Vec<Organization>>;
    /// Activities whose name contains `needle`, ignoring case.
    fn find_activities_by_name_contains(&self, needle: &str) -> RepoResult<Vec<Activity>>;
    /// Direct children of any activity in `parent_ids`.
    fn find_activities_by_parent_id_in(
        &self,
        parent_ids: &BTreeSet<ActivityId>,
    ) -> RepoResult<Vec<Activity>>;
    /// Resolved organizations linked to any activity in `activity_ids`.
    fn find_organizations_by_activity_id_in(
        &self,
        activity_ids: &BTreeSet<ActivityId>,
    ) -> RepoResult<Vec<Organization>>;
    /// Loads one building by id.
    fn get_building(&self, building_id: BuildingId) -> RepoResult<Option<Building>>;
    /// Lists every building.
    fn list_buildings(&self) -> RepoResult<Vec<Building>>;
    /// Loads one resolved organization by id.
    fn get_organization(&self, organization_id: OrganizationId)
        -> RepoResult<Option<Organization>>;
    /// Loads the lowest-id organization with exactly this name.
    fn find_organization_by_name(&self, name: &str) -> RepoResult<Option<Organization>>;
}

/// Write model for [`SqliteDirectoryRepository::create_organization`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganization {
    pub name: String,
    pub building_id: BuildingId,
    pub phones: Vec<PhoneNumber>,
    pub activity_ids: Vec<ActivityId>,
}

/// SQLite-backed directory repository.
pub struct SqliteDirectoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectoryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_directory_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Inserts one building and returns its id.
    pub fn create_building(&self, address: &str, location: Point) -> RepoResult<BuildingId> {
        let address = normalize_text("address", address)?;
        self.conn.execute(
            "INSERT INTO buildings (address, latitude, longitude) VALUES (?1, ?2, ?3);",
            params![address, location.latitude(), location.longitude()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Inserts one activity under an optional parent and returns its id.
    pub fn create_activity(
        &self,
        name: &str,
        parent_id: Option<ActivityId>,
    ) -> RepoResult<ActivityId> {
        let name = normalize_text("activity name", name)?;
        if let Some(parent_id) = parent_id {
            ensure_row_exists(self.conn, "activities", parent_id)?;
        }
        self.conn.execute(
            "INSERT INTO activities (name, parent_id) VALUES (?1, ?2);",
            params![name, parent_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Inserts one organization with its phone and activity links atomically.
    ///
    /// Phone numbers are shared rows: an existing number is linked, not duplicated.
    pub fn create_organization(&self, new_org: &NewOrganization) -> RepoResult<OrganizationId> {
        let name = normalize_text("organization name", &new_org.name)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_row_exists(&tx, "buildings", new_org.building_id)?;
        for activity_id in &new_org.activity_ids {
            ensure_row_exists(&tx, "activities", *activity_id)?;
        }

        tx.execute(
            "INSERT INTO organizations (name, building_id) VALUES (?1, ?2);",
            params![name, new_org.building_id],
        )?;
        let organization_id = tx.last_insert_rowid();

        for phone in &new_org.phones {
            tx.execute(
                "INSERT INTO phones (number) VALUES (?1)
                 ON CONFLICT(number) DO NOTHING;",
                [phone.as_str()],
            )?;
            let phone_id: i64 = tx.query_row(
                "SELECT id FROM phones WHERE number = ?1;",
                [phone.as_str()],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO organization_phones (organization_id, phone_id)
                 VALUES (?1, ?2);",
                params![organization_id, phone_id],
            )?;
        }

        for activity_id in &new_org.activity_ids {
            tx.execute(
                "INSERT OR IGNORE INTO organization_activities (organization_id, activity_id)
                 VALUES (?1, ?2);",
                params![organization_id, activity_id],
            )?;
        }

        tx.commit()?;
        Ok(organization_id)
    }
}

impl DirectoryRepository for SqliteDirectoryRepository<'_> {
    fn find_buildings_in_box(&self, bbox: &BoundingBox) -> RepoResult<Vec<Building>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BUILDING_SELECT_SQL}
             WHERE latitude BETWEEN ?1 AND ?2
               AND longitude BETWEEN ?3 AND ?4
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params![
            bbox.min_lat,
            bbox.max_lat,
            bbox.min_lon,
            bbox.max_lon
        ])?;

        let mut buildings = Vec::new();
        while let Some(row) = rows.next()? {
            buildings.push(parse_building_row(row)?);
        }
        Ok(buildings)
    }

    fn find_organizations_by_building_id(
        &self,
        building_id: BuildingId,
    ) -> RepoResult<Vec<Organization>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORGANIZATION_SELECT_SQL}
             WHERE o.building_id = ?1
             ORDER BY o.id ASC;"
        ))?;
        let mut rows = stmt.query([building_id])?;

        let mut organizations = Vec::new();
        while let Some(row) = rows.next()? {
            organizations.push(hydrate_organization(self.conn, row)?);
        }
        Ok(organizations)
    }

    fn find_activities_by_name_contains(&self, needle: &str) -> RepoResult<Vec<Activity>> {
        // SQLite `LIKE`/`lower()` only fold ASCII, so the match runs in Rust to
        // keep Cyrillic names case-insensitive.
        let needle = needle.to_lowercase();
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;

        let mut matches = Vec::new();
        while let Some(row) = rows.next()? {
            let activity = parse_activity_row(row)?;
            if activity.name_contains(&needle) {
                matches.push(activity);
            }
        }
        Ok(matches)
    }

    fn find_activities_by_parent_id_in(
        &self,
        parent_ids: &BTreeSet<ActivityId>,
    ) -> RepoResult<Vec<Activity>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL}
             WHERE parent_id IN ({})
             ORDER BY id ASC;",
            placeholders(parent_ids.len())
        ))?;
        let mut rows = stmt.query(params_from_iter(parent_ids.iter()))?;

        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            children.push(parse_activity_row(row)?);
        }
        Ok(children)
    }

    fn find_organizations_by_activity_id_in(
        &self,
        activity_ids: &BTreeSet<ActivityId>,
    ) -> RepoResult<Vec<Organization>> {
        if activity_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{ORGANIZATION_SELECT_SQL}
             WHERE o.id IN (
                 SELECT organization_id
                 FROM organization_activities
                 WHERE activity_id IN ({})
             )
             ORDER BY o.id ASC;",
            placeholders(activity_ids.len())
        ))?;
        let mut rows = stmt.query(params_from_iter(activity_ids.iter()))?;

        let mut organizations = Vec::new();
        while let Some(row) = rows.next()? {
            organizations.push(hydrate_organization(self.conn, row)?);
        }
        Ok(organizations)
    }

    fn get_building(&self, building_id: BuildingId) -> RepoResult<Option<Building>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BUILDING_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([building_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_building_row(row)?));
        }
        Ok(None)
    }

    fn list_buildings(&self) -> RepoResult<Vec<Building>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BUILDING_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;

        let mut buildings = Vec::new();
        while let Some(row) = rows.next()? {
            buildings.push(parse_building_row(row)?);
        }
        Ok(buildings)
    }

    fn get_organization(
        &self,
        organization_id: OrganizationId,
    ) -> RepoResult<Option<Organization>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORGANIZATION_SELECT_SQL} WHERE o.id = ?1;"))?;
        let mut rows = stmt.query([organization_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(hydrate_organization(self.conn, row)?));
        }
        Ok(None)
    }

    fn find_organization_by_name(&self, name: &str) -> RepoResult<Option<Organization>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORGANIZATION_SELECT_SQL}
             WHERE o.name = ?1
             ORDER BY o.id ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(hydrate_organization(self.conn, row)?));
        }
        Ok(None)
    }
}

fn hydrate_organization(conn: &Connection, row: &Row<'_>) -> RepoResult<Organization> {
    let id: OrganizationId = row.get("org_id")?;
    let building = Building {
        id: row.get("building_id")?,
        address: row.get("address")?,
        location: parse_location(row, "buildings")?,
    };

    Ok(Organization {
        id,
        name: row.get("org_name")?,
        building,
        phones: load_phones(conn, id)?,
        activities: load_organization_activities(conn, id)?,
    })
}

fn load_phones(conn: &Connection, organization_id: OrganizationId) -> RepoResult<Vec<PhoneNumber>> {
    let mut stmt = conn.prepare(
        "SELECT p.number
         FROM phones p
         INNER JOIN organization_phones op ON op.phone_id = p.id
         WHERE op.organization_id = ?1
         ORDER BY p.id ASC;",
    )?;
    let mut rows = stmt.query([organization_id])?;

    let mut phones = Vec::new();
    while let Some(row) = rows.next()? {
        let number: String = row.get(0)?;
        let phone = PhoneNumber::parse(&number).map_err(|_| {
            RepoError::InvalidData(format!("invalid phone `{number}` in phones.number"))
        })?;
        phones.push(phone);
    }
    Ok(phones)
}

fn load_organization_activities(
    conn: &Connection,
    organization_id: OrganizationId,
) -> RepoResult<Vec<Activity>> {
    let mut stmt = conn.prepare(
        "SELECT a.id AS id, a.name AS name, a.parent_id AS parent_id
         FROM activities a
         INNER JOIN organization_activities oa ON oa.activity_id = a.id
         WHERE oa.organization_id = ?1
         ORDER BY a.id ASC;",
    )?;
    let mut rows = stmt.query([organization_id])?;

    let mut activities = Vec::new();
    while let Some(row) = rows.next()? {
        activities.push(parse_activity_row(row)?);
    }
    Ok(activities)
}

fn parse_building_row(row: &Row<'_>) -> RepoResult<Building> {
    Ok(Building {
        id: row.get("id")?,
        address: row.get("address")?,
        location: parse_location(row, "buildings")?,
    })
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    Ok(Activity {
        id: row.get("id")?,
        name: row.get("name")?,
        parent_id: row.get("parent_id")?,
    })
}

fn parse_location(row: &Row<'_>, table: &'static str) -> RepoResult<Point> {
    let latitude: f64 = row.get("latitude")?;
    let longitude: f64 = row.get("longitude")?;
    Point::new(latitude, longitude).map_err(|err| {
        RepoError::InvalidData(format!("invalid coordinates in {table}: {err}"))
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn ensure_row_exists(conn: &Connection, table: &'static str, id: i64) -> RepoResult<()> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE id = ?1;"),
            [id],
            |row| row.get(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(RepoError::MissingReference { table, id }),
    }
}

fn ensure_directory_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
