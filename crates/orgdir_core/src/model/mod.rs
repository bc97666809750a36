//! Directory domain model.
//!
//! # Responsibility
//! - Define the read models shared by repositories, search and responses.
//! - Own input validation for coordinates, distances and phone numbers.
//!
//! # Invariants
//! - A `Point` always holds a finite, in-range latitude/longitude pair.
//! - Every organization resolves to exactly one building.

pub mod activity;
pub mod building;
pub mod organization;
pub mod point;
pub mod validation;
