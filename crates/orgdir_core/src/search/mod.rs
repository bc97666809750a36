//! Search and ranking engine.
//!
//! # Responsibility
//! - Geospatial radius/rectangle search: box prefilter, then exact distance.
//! - Activity search: depth-bounded expansion of the category forest.
//!
//! # Invariants
//! - Input is validated before the first repository call.
//! - Repository failures propagate unchanged; nothing is retried.

pub mod activity_tree;
pub mod engine;
pub mod ranker;

#[cfg(test)]
pub(crate) mod test_support;

pub use activity_tree::expand_activity_ids;
pub use engine::{ActivitySearch, SearchEngine, SearchError, SearchResult};
pub use ranker::rank_by_distance;
