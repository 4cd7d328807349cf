//! Deletion planning: one survivor per duplicate group.

use serde::{Deserialize, Serialize};

use mediasift_analyze::{DuplicateGroup, GroupMember};

/// The delete-list produced from a set of duplicate groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletionPlan {
    /// Files scheduled for deletion, in group order.
    pub doomed: Vec<GroupMember>,
    /// The file kept per group, parallel to the input group order.
    pub survivors: Vec<GroupMember>,
}

impl DeletionPlan {
    /// Number of files scheduled for deletion.
    pub fn len(&self) -> usize {
        self.doomed.len()
    }

    /// Check if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.doomed.is_empty()
    }

    /// Total bytes that would be reclaimed.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.doomed.iter().map(|m| m.size).sum()
    }
}

/// Picks survivors and executes deletions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionPlanner;

impl DeletionPlanner {
    /// Create a new planner.
    pub fn new() -> Self {
        Self
    }

    /// Schedule every group member except the survivor for deletion.
    ///
    /// The survivor is the member with the largest size; on a size tie the
    /// earliest member in group order wins. Group members arrive in
    /// catalog insertion order, so the choice is stable across repeated
    /// runs on the same input.
    pub fn plan(&self, groups: &[DuplicateGroup]) -> DeletionPlan {
        let mut plan = DeletionPlan::default();

        for group in groups {
            let Some(survivor_idx) = first_largest(&group.members) else {
                continue;
            };
            plan.survivors.push(group.members[survivor_idx].clone());
            for (idx, member) in group.members.iter().enumerate() {
                if idx != survivor_idx {
                    plan.doomed.push(member.clone());
                }
            }
        }

        plan
    }
}

/// Index of the first member holding the maximal size.
fn first_largest(members: &[GroupMember]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, member) in members.iter().enumerate() {
        match best {
            // Strictly greater only: ties keep the earlier member.
            Some(b) if member.size <= members[b].size => {}
            _ => best = Some(idx),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediasift_core::{Fingerprint, MediaKind};
    use std::path::PathBuf;

    fn member(name: &str, size: u64) -> GroupMember {
        GroupMember {
            path: PathBuf::from(format!("/media/{name}")),
            name: name.into(),
            size,
        }
    }

    fn group(members: Vec<GroupMember>) -> DuplicateGroup {
        DuplicateGroup {
            kind: MediaKind::Image,
            fingerprint: Fingerprint::new([0xaa; 32]),
            members,
        }
    }

    #[test]
    fn test_largest_member_survives() {
        let groups = vec![group(vec![
            member("small.jpg", 10),
            member("big.jpg", 30),
            member("mid.jpg", 20),
        ])];

        let plan = DeletionPlanner::new().plan(&groups);
        assert_eq!(plan.survivors[0].name.as_str(), "big.jpg");
        let doomed: Vec<_> = plan.doomed.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(doomed, vec!["small.jpg", "mid.jpg"]);
        assert_eq!(plan.reclaimable_bytes(), 30);
    }

    #[test]
    fn test_size_tie_keeps_first_in_group_order() {
        let groups = vec![group(vec![
            member("first.jpg", 10),
            member("second.jpg", 10),
        ])];

        let plan = DeletionPlanner::new().plan(&groups);
        assert_eq!(plan.survivors[0].name.as_str(), "first.jpg");
        assert_eq!(plan.doomed.len(), 1);
        assert_eq!(plan.doomed[0].name.as_str(), "second.jpg");
    }

    #[test]
    fn test_plan_is_stable_across_runs() {
        let groups = vec![group(vec![
            member("a.jpg", 10),
            member("b.jpg", 10),
            member("c.jpg", 10),
        ])];

        let planner = DeletionPlanner::new();
        let one = planner.plan(&groups);
        let two = planner.plan(&groups);
        let names = |p: &DeletionPlan| {
            p.doomed
                .iter()
                .map(|m| m.name.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&one), names(&two));
        assert_eq!(one.survivors[0].name, two.survivors[0].name);
    }

    #[test]
    fn test_empty_groups_make_empty_plan() {
        let plan = DeletionPlanner::new().plan(&[]);
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
    }
}
