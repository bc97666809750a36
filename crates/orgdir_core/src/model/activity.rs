//! Activity category read model.
//!
//! Activities form a forest through `parent_id`. Roots have no parent.

use serde::{Deserialize, Serialize};

/// Stable activity identifier (`activities.id`).
pub type ActivityId = i64;

/// One node of the activity forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    /// `None` for root categories such as "Еда" or "Автомобили".
    pub parent_id: Option<ActivityId>,
}

impl Activity {
    /// Case-insensitive substring match used by activity search.
    ///
    /// Lowercasing is Unicode-aware, so Cyrillic names match regardless of case.
    pub fn name_contains(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
    }
}
