//! Building read model.

use crate::model::point::Point;
use serde::{Deserialize, Serialize};

/// Stable building identifier (`buildings.id`).
pub type BuildingId = i64;

/// A physical building hosting zero or more organizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub address: String,
    pub location: Point,
}
