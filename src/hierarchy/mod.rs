//! Parent/child structure of a schedule: container roll-up and WBS codes.

pub mod rollup;
pub mod wbs;

pub use rollup::{roll_up_all, roll_up_ancestors};
pub use wbs::{assign_wbs_codes, renumber};

use crate::ids::TaskId;
use crate::schedule::ProjectSchedule;
use std::collections::{HashMap, HashSet};

/// Parent chain of `task_id`, nearest first. Stops at unknown parents and
/// at the first repeated id, so malformed trees cannot loop forever.
pub(crate) fn ancestors(parents: &HashMap<TaskId, Option<TaskId>>, task_id: TaskId) -> Vec<TaskId> {
    let mut chain = Vec::new();
    let mut seen = HashSet::from([task_id]);
    let mut current = parents.get(&task_id).copied().flatten();
    while let Some(parent) = current {
        if !parents.contains_key(&parent) || !seen.insert(parent) {
            break;
        }
        chain.push(parent);
        current = parents.get(&parent).copied().flatten();
    }
    chain
}

pub(crate) fn parent_map(schedule: &ProjectSchedule) -> HashMap<TaskId, Option<TaskId>> {
    schedule
        .tasks
        .iter()
        .map(|task| (task.id, task.parent_id))
        .collect()
}
