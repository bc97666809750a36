//! Activity category expansion.
//!
//! Finds every activity whose name contains the query (ignoring case) and
//! walks the forest downwards level by level. Depth 1 is the matched level
//! itself; each further level adds one generation of descendants.
//!
//! An id already collected is never expanded twice, so a malformed parent
//! relation with a cycle terminates on its own in addition to the depth cap.

use crate::model::activity::ActivityId;
use crate::repo::directory_repo::{DirectoryRepository, RepoResult};
use log::debug;
use std::collections::BTreeSet;

/// Returns the ids of matching activities plus their descendants.
///
/// An empty set means no activity matched; this is not an error.
/// `max_depth` of 0 or 1 returns only the direct matches.
pub fn expand_activity_ids<R>(
    repo: &R,
    activity_name: &str,
    max_depth: u32,
) -> RepoResult<BTreeSet<ActivityId>>
where
    R: DirectoryRepository + ?Sized,
{
    let base = repo.find_activities_by_name_contains(activity_name)?;
    if base.is_empty() {
        return Ok(BTreeSet::new());
    }

    let mut collected: BTreeSet<ActivityId> = base.iter().map(|activity| activity.id).collect();
    let mut frontier = collected.clone();
    let mut levels_visited = 1;

    while levels_visited < max_depth && !frontier.is_empty() {
        let children = repo.find_activities_by_parent_id_in(&frontier)?;

        let mut next = BTreeSet::new();
        for child in children {
            if collected.insert(child.id) {
                next.insert(child.id);
            }
        }

        frontier = next;
        levels_visited += 1;
    }

    debug!(
        "event=activity_expand module=search status=ok base_matches={} collected={} levels={}",
        base.len(),
        collected.len(),
        levels_visited
    );
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::expand_activity_ids;
    use crate::model::activity::Activity;
    use crate::search::test_support::{demo_forest, FakeDirectory};
    use std::collections::BTreeSet;

    fn ids(values: &[i64]) -> BTreeSet<i64> {
        values.iter().copied().collect()
    }

    #[test]
    fn depth_one_returns_only_base_matches() {
        let repo = FakeDirectory::with_activities(demo_forest());
        let result = expand_activity_ids(&repo, "Еда", 1).unwrap();
        assert_eq!(result, ids(&[1]));
        assert_eq!(repo.parent_queries(), 0);
    }

    #[test]
    fn food_expands_to_meat_and_dairy() {
        let repo = FakeDirectory::with_activities(demo_forest());
        let result = expand_activity_ids(&repo, "Еда", 3).unwrap();
        assert_eq!(result, ids(&[1, 2, 3]));
    }

    #[test]
    fn substring_match_excludes_parent_and_sibling() {
        let repo = FakeDirectory::with_activities(demo_forest());
        // "Легковые" (6) under "Автомобили" (4); children "Запчасти" (7), "Аксессуары" (8).
        let result = expand_activity_ids(&repo, "Лег", 3).unwrap();
        assert_eq!(result, ids(&[6, 7, 8]));
        assert!(!result.contains(&4));
        assert!(!result.contains(&5));
    }

    #[test]
    fn match_is_case_insensitive() {
        let repo = FakeDirectory::with_activities(demo_forest());
        assert_eq!(expand_activity_ids(&repo, "лег", 1).unwrap(), ids(&[6]));
        assert_eq!(expand_activity_ids(&repo, "ПРОДУКЦИЯ", 1).unwrap(), ids(&[2, 3]));
    }

    #[test]
    fn depth_bounds_generations() {
        let repo = FakeDirectory::with_activities(demo_forest());
        assert_eq!(expand_activity_ids(&repo, "Автомобили", 2).unwrap(), ids(&[4, 5, 6]));
        assert_eq!(
            expand_activity_ids(&repo, "Автомобили", 3).unwrap(),
            ids(&[4, 5, 6, 7, 8])
        );
    }

    #[test]
    fn stops_early_when_frontier_is_empty() {
        let repo = FakeDirectory::with_activities(demo_forest());
        let result = expand_activity_ids(&repo, "Запчасти", 10).unwrap();
        assert_eq!(result, ids(&[7]));
        assert_eq!(repo.parent_queries(), 1);
    }

    #[test]
    fn unknown_name_returns_empty_set() {
        let repo = FakeDirectory::with_activities(demo_forest());
        assert!(expand_activity_ids(&repo, "Космос", 3).unwrap().is_empty());
        assert_eq!(repo.parent_queries(), 0);
    }

    #[test]
    fn cyclic_parents_terminate_before_depth_cap() {
        let cyclic = vec![
            Activity {
                id: 1,
                name: "Loop A".to_string(),
                parent_id: Some(2),
            },
            Activity {
                id: 2,
                name: "Loop B".to_string(),
                parent_id: Some(1),
            },
        ];
        let repo = FakeDirectory::with_activities(cyclic);
        let result = expand_activity_ids(&repo, "Loop A", 50).unwrap();
        assert_eq!(result, ids(&[1, 2]));
        assert_eq!(repo.parent_queries(), 2);
    }
}
