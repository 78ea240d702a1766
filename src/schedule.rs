use crate::dependency::TaskDependency;
use crate::ids::{ScheduleId, TaskId};
use crate::metadata::ScheduleMetadata;
use crate::task::ScheduleTask;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Aggregate root: one schedule's task tree and dependency network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSchedule {
    pub id: ScheduleId,
    #[serde(default)]
    pub metadata: ScheduleMetadata,
    #[serde(default)]
    pub tasks: Vec<ScheduleTask>,
    #[serde(default)]
    pub dependencies: Vec<TaskDependency>,
}

impl ProjectSchedule {
    pub fn new(id: ScheduleId, name: impl Into<String>) -> Self {
        let metadata = ScheduleMetadata {
            name: name.into(),
            ..ScheduleMetadata::default()
        };
        Self::new_with_metadata(id, metadata)
    }

    pub fn new_with_metadata(id: ScheduleId, metadata: ScheduleMetadata) -> Self {
        Self {
            id,
            metadata,
            tasks: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn task(&self, task_id: TaskId) -> Option<&ScheduleTask> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> Option<&mut ScheduleTask> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }

    pub fn task_index(&self) -> HashMap<TaskId, usize> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| (task.id, idx))
            .collect()
    }

    /// Insert or replace a task. The task is re-homed into this schedule.
    pub fn upsert_task(&mut self, mut task: ScheduleTask) {
        task.schedule_id = self.id;
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    pub fn upsert_dependency(&mut self, dependency: TaskDependency) {
        match self
            .dependencies
            .iter_mut()
            .find(|existing| existing.id == dependency.id)
        {
            Some(existing) => *existing = dependency,
            None => self.dependencies.push(dependency),
        }
    }

    /// Remove a task, re-parent its children onto its own parent and drop every
    /// dependency that referenced it.
    pub fn delete_task(&mut self, task_id: TaskId) -> bool {
        let Some(position) = self.tasks.iter().position(|task| task.id == task_id) else {
            return false;
        };
        let removed = self.tasks.remove(position);
        for task in &mut self.tasks {
            if task.parent_id == Some(task_id) {
                task.parent_id = removed.parent_id;
            }
        }
        self.dependencies
            .retain(|dep| dep.predecessor_id != task_id && dep.successor_id != task_id);
        true
    }

    pub fn children_of(&self, parent_id: TaskId) -> Vec<&ScheduleTask> {
        self.tasks
            .iter()
            .filter(|task| task.parent_id == Some(parent_id))
            .collect()
    }

    /// Summary tasks plus every task some other task names as its parent.
    pub fn container_ids(&self) -> HashSet<TaskId> {
        let mut containers: HashSet<TaskId> = self
            .tasks
            .iter()
            .filter(|task| task.is_container())
            .map(|task| task.id)
            .collect();
        containers.extend(self.tasks.iter().filter_map(|task| task.parent_id));
        containers
    }

    pub fn critical_task_ids(&self) -> Vec<TaskId> {
        let mut critical: Vec<&ScheduleTask> =
            self.tasks.iter().filter(|task| task.is_critical).collect();
        critical.sort_by(|a, b| a.early_start.cmp(&b.early_start).then(a.id.cmp(&b.id)));
        critical.into_iter().map(|task| task.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpmStatistics {
    pub total_tasks: usize,
    pub critical_tasks: usize,
    pub critical_percentage: f64,
    pub project_duration: f64,
    pub total_dependencies: usize,
}

impl CpmStatistics {
    pub fn new(
        total_tasks: usize,
        critical_tasks: usize,
        project_duration: f64,
        total_dependencies: usize,
    ) -> Self {
        let critical_percentage = if total_tasks == 0 {
            0.0
        } else {
            critical_tasks as f64 * 100.0 / total_tasks as f64
        };
        Self {
            total_tasks,
            critical_tasks,
            critical_percentage,
            project_duration,
            total_dependencies,
        }
    }
}

/// What a full recalculation hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutcome {
    pub schedule_id: ScheduleId,
    pub duration: f64,
    pub critical_task_ids: Vec<TaskId>,
    pub statistics: CpmStatistics,
    pub calculated_at: DateTime<Utc>,
}

impl CalculationOutcome {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("schedule={}", self.schedule_id));
        parts.push(format!("tasks={}", self.statistics.total_tasks));
        parts.push(format!("critical={}", self.statistics.critical_tasks));
        parts.push(format!("critical_pct={:.1}", self.statistics.critical_percentage));
        parts.push(format!("deps={}", self.statistics.total_dependencies));
        parts.push(format!("duration={}", self.duration));
        if !self.critical_task_ids.is_empty() {
            let chain = self
                .critical_task_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("crit_tasks={}", chain));
        }
        parts.join(", ")
    }
}
