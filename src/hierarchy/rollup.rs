use super::{ancestors, parent_map};
use crate::ids::TaskId;
use crate::schedule::ProjectSchedule;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Recompute the date range of every ancestor of `changed`, deepest first,
/// each ancestor once. Returns the containers whose dates actually changed.
pub fn roll_up_ancestors(schedule: &mut ProjectSchedule, changed: &[TaskId]) -> Vec<TaskId> {
    let parents = parent_map(schedule);
    let mut targets: HashSet<TaskId> = HashSet::new();
    for task_id in changed {
        targets.extend(ancestors(&parents, *task_id));
    }
    roll_up(schedule, &parents, targets)
}

/// Recompute every task that has children.
pub fn roll_up_all(schedule: &mut ProjectSchedule) -> Vec<TaskId> {
    let parents = parent_map(schedule);
    let targets: HashSet<TaskId> = schedule
        .tasks
        .iter()
        .filter_map(|task| task.parent_id)
        .filter(|parent| parents.contains_key(parent))
        .collect();
    roll_up(schedule, &parents, targets)
}

fn roll_up(
    schedule: &mut ProjectSchedule,
    parents: &HashMap<TaskId, Option<TaskId>>,
    targets: HashSet<TaskId>,
) -> Vec<TaskId> {
    let mut ordered: Vec<(usize, TaskId)> = targets
        .into_iter()
        .map(|id| (ancestors(parents, id).len(), id))
        .collect();
    ordered.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let index = schedule.task_index();
    let mut updated = Vec::new();
    for (_, container_id) in ordered {
        let range = schedule
            .tasks
            .iter()
            .filter(|task| task.parent_id == Some(container_id) && task.id != container_id)
            .filter_map(|task| Some((task.planned_start?, task.planned_end?)))
            .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, (start, end)| match acc {
                None => Some((start, end)),
                Some((lo, hi)) => Some((lo.min(start), hi.max(end))),
            });
        let Some((start, end)) = range else {
            continue;
        };

        let container = &mut schedule.tasks[index[&container_id]];
        let duration = (end - start).num_days() + 1;
        if container.planned_start == Some(start)
            && container.planned_end == Some(end)
            && container.duration_days == duration
        {
            continue;
        }
        container.planned_start = Some(start);
        container.planned_end = Some(end);
        container.duration_days = duration;
        updated.push(container_id);
    }
    updated
}
