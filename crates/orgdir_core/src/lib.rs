//! Core of the organization directory: geo search, activity tree search and
//! the SQLite-backed store they run against.

pub mod config;
pub mod db;
pub mod geo;
pub mod logging;
pub mod model;
pub mod repo;
pub mod response;
pub mod search;
pub mod seed;

pub use config::{ConfigError, SearchConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use geo::{distance_km, km_to_degree_offsets, BoundingBox};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{Activity, ActivityId};
pub use model::building::{Building, BuildingId};
pub use model::organization::{Organization, OrganizationId, PhoneNumber};
pub use model::point::Point;
pub use model::validation::ValidationError;
pub use repo::directory_repo::{
    DirectoryRepository, NewOrganization, RepoError, RepoResult, SqliteDirectoryRepository,
};
pub use response::{ResponseCode, ResponseEnvelope};
pub use search::{ActivitySearch, SearchEngine, SearchError, SearchResult};
pub use seed::{seed_demo_directory, SeededDirectory};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
