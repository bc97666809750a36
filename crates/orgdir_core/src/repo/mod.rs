//! Repository layer: data-access contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the query contract the search engine depends on.
//! - Isolate SQL details from search/business orchestration.
//!
//! # Invariants
//! - Read paths return fully materialized entities.
//! - Missing rows are empty results or `None`, never errors.

pub mod directory_repo;
