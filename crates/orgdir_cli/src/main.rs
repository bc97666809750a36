//! `orgdir` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and environment fallbacks.
//! - Open the directory store, run one query, print the response envelope.
//!
//! # Exit codes
//! - `0` when an envelope was printed, including not-found and internal-error envelopes.
//! - `1` when setup fails (database, config, logging).
//! - `2` when query input is invalid.

use clap::{Parser, Subcommand};
use log::error;
use orgdir_core::response::{
    activity_response, building_response, radius_response, rectangle_response,
};
use orgdir_core::{
    default_log_level, init_logging, open_db, open_db_in_memory, seed_demo_directory, ConfigError,
    DbError, DirectoryRepository, LoggingError, Point, RepoError, ResponseCode, ResponseEnvelope,
    SearchConfig, SearchEngine, SearchError, SearchResult, SqliteDirectoryRepository,
    ValidationError,
};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const MEMORY_DB: &str = ":memory:";

#[derive(Debug, Parser)]
#[command(name = "orgdir", version)]
#[command(about = "Organization directory lookups, geo search and activity search", long_about = None)]
struct Cli {
    /// SQLite database file; `:memory:` runs against a freshly seeded in-memory store
    #[arg(long, env = "ORGDIR_DB", default_value = "orgdir.sqlite3")]
    db: String,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "ORGDIR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for log files; file logging stays off when unset
    #[arg(long, env = "ORGDIR_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// JSON file with search settings
    #[arg(long, env = "ORGDIR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Load the demo dataset into the database
    Seed,
    /// Organizations within a radius of a point, nearest first
    Radius {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Radius in kilometers
        #[arg(long)]
        radius_km: f64,
    },
    /// Organizations inside a rectangle centered on a point
    Rectangle {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Half-height of the rectangle in kilometers
        #[arg(long)]
        lat_km: f64,
        /// Half-width of the rectangle in kilometers
        #[arg(long)]
        lon_km: f64,
    },
    /// Organizations under an activity and its sub-activities
    Activity {
        name: String,
        /// Levels to descend, counting the matched activity as level 1
        #[arg(long)]
        depth: Option<u32>,
    },
    /// Organization by id
    OrgId { id: i64 },
    /// Organization by exact name
    OrgName { name: String },
    /// Organizations in one building
    Building { id: i64 },
    /// All buildings
    Buildings,
}

#[derive(Debug)]
enum CliError {
    Logging(LoggingError),
    Config(ConfigError),
    ConfigRead { path: PathBuf, source: std::io::Error },
    Db(DbError),
    Repo(RepoError),
    Validation(ValidationError),
    Output(serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Validation(_) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::ConfigRead { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "invalid input: {err}"),
            Self::Output(err) => write!(f, "cannot encode response: {err}"),
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ValidationError> for CliError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = run(&cli).and_then(|envelope| envelope.to_json_pretty().map_err(CliError::Output));
    match outcome {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

fn run(cli: &Cli) -> Result<ResponseEnvelope, CliError> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }
    let config = load_config(cli.config.as_deref())?;

    let in_memory = cli.db == MEMORY_DB;
    let conn = if in_memory {
        open_db_in_memory()?
    } else {
        open_db(&cli.db)?
    };
    let repo = SqliteDirectoryRepository::try_new(&conn)?;

    let mut seeded = None;
    if in_memory || matches!(cli.command, Command::Seed) {
        seeded = Some(seed_demo_directory(&repo)?);
    }

    let engine = SearchEngine::with_config(repo, config)?;
    let mut envelope = execute(&engine, &cli.command)?;
    if let (Command::Seed, Some(seeded)) = (&cli.command, seeded) {
        envelope.detail.message = format!(
            "seeded {} buildings, {} activities, {} organizations",
            seeded.buildings.len(),
            seeded.activities.len(),
            seeded.organizations.len()
        );
    }
    Ok(envelope)
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig, CliError> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SearchConfig::from_json(&raw)?)
}

fn execute<R: DirectoryRepository>(
    engine: &SearchEngine<R>,
    command: &Command,
) -> Result<ResponseEnvelope, CliError> {
    match command {
        Command::Seed | Command::Buildings => settle(
            engine.list_buildings(),
            ResponseCode::BuildingListFailed,
            |buildings| ResponseEnvelope::buildings(&buildings),
        ),
        Command::Radius {
            lat,
            lon,
            radius_km,
        } => {
            let center = Point::new(*lat, *lon)?;
            settle(
                engine.search_by_radius(center, *radius_km),
                ResponseCode::RadiusSearchFailed,
                |found| radius_response(center, *radius_km, &found),
            )
        }
        Command::Rectangle {
            lat,
            lon,
            lat_km,
            lon_km,
        } => {
            let center = Point::new(*lat, *lon)?;
            settle(
                engine.search_by_rectangle(center, *lat_km, *lon_km),
                ResponseCode::RectangleSearchFailed,
                |found| rectangle_response(center, *lat_km, *lon_km, &found),
            )
        }
        Command::Activity { name, depth } => {
            let outcome = match depth {
                Some(depth) => engine.search_by_activity(name, *depth),
                None => engine.search_by_activity_default(name),
            };
            settle(outcome, ResponseCode::ActivitySearchFailed, |search| {
                activity_response(name, &search)
            })
        }
        Command::OrgId { id } => settle(
            engine.organization_by_id(*id),
            ResponseCode::OrganizationIdFailed,
            |found| match found {
                Some(org) => ResponseEnvelope::organization(&org),
                None => ResponseEnvelope::error(
                    ResponseCode::OrganizationIdNotFound,
                    format!("organization with id {id} not found"),
                ),
            },
        ),
        Command::OrgName { name } => settle(
            engine.organization_by_name(name),
            ResponseCode::OrganizationNameFailed,
            |found| match found {
                Some(org) => ResponseEnvelope::organization(&org),
                None => ResponseEnvelope::error(
                    ResponseCode::OrganizationNameNotFound,
                    format!("organization named '{}' not found", name),
                ),
            },
        ),
        Command::Building { id } => settle(
            engine.organizations_in_building(*id),
            ResponseCode::BuildingOrganizationsFailed,
            |found| building_response(*id, found.as_deref()),
        ),
    }
}

/// Renders a successful outcome; repository failures become internal-error envelopes.
fn settle<T>(
    outcome: SearchResult<T>,
    failure: ResponseCode,
    render: impl FnOnce(T) -> ResponseEnvelope,
) -> Result<ResponseEnvelope, CliError> {
    match outcome {
        Ok(value) => Ok(render(value)),
        Err(SearchError::Validation(err)) => Err(CliError::Validation(err)),
        Err(SearchError::Repo(err)) => {
            error!(
                "event=command module=cli status=error code={} error={}",
                failure.code(),
                err
            );
            Ok(ResponseEnvelope::error(
                failure,
                format!("internal error: {err}"),
            ))
        }
    }
}
