use super::parent_map;
use crate::ids::TaskId;
use crate::schedule::ProjectSchedule;
use crate::writer::WbsAssignment;
use std::collections::HashMap;

/// Fresh WBS codes for every task, ordered by task id.
///
/// Siblings are numbered from 1 in `(sort_order, id)` order. Tasks whose
/// parent is missing count as roots. Tasks caught in a parent cycle are never
/// reached from a root and get `None`.
pub fn renumber(schedule: &ProjectSchedule) -> Vec<WbsAssignment> {
    let parents = parent_map(schedule);
    let mut children: HashMap<Option<TaskId>, Vec<(i32, TaskId)>> = HashMap::new();
    for task in &schedule.tasks {
        let parent = task.parent_id.filter(|id| parents.contains_key(id));
        children
            .entry(parent)
            .or_default()
            .push((task.sort_order, task.id));
    }
    for siblings in children.values_mut() {
        siblings.sort();
    }

    let mut codes: HashMap<TaskId, String> = HashMap::with_capacity(schedule.tasks.len());
    let mut stack: Vec<(TaskId, String)> = Vec::new();
    push_children(&children, None, "", &mut stack);
    while let Some((task_id, code)) = stack.pop() {
        if codes.contains_key(&task_id) {
            continue;
        }
        push_children(&children, Some(task_id), &code, &mut stack);
        codes.insert(task_id, code);
    }

    let mut assignments: Vec<WbsAssignment> = schedule
        .tasks
        .iter()
        .map(|task| WbsAssignment {
            task_id: task.id,
            wbs_code: codes.get(&task.id).cloned(),
        })
        .collect();
    assignments.sort_by_key(|assignment| assignment.task_id);
    assignments
}

fn push_children(
    children: &HashMap<Option<TaskId>, Vec<(i32, TaskId)>>,
    parent: Option<TaskId>,
    prefix: &str,
    stack: &mut Vec<(TaskId, String)>,
) {
    let Some(siblings) = children.get(&parent) else {
        return;
    };
    // Reverse so the first sibling is popped first.
    for (position, (_, id)) in siblings.iter().enumerate().rev() {
        let code = if prefix.is_empty() {
            (position + 1).to_string()
        } else {
            format!("{prefix}.{}", position + 1)
        };
        stack.push((*id, code));
    }
}

/// Apply [`renumber`] in place.
pub fn assign_wbs_codes(schedule: &mut ProjectSchedule) {
    let codes: HashMap<TaskId, Option<String>> = renumber(schedule)
        .into_iter()
        .map(|assignment| (assignment.task_id, assignment.wbs_code))
        .collect();
    for task in &mut schedule.tasks {
        task.wbs_code = codes.get(&task.id).cloned().flatten();
    }
}
