use crate::calculations::analyze;
use crate::cascade::propagate;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{CpmError, Result};
use crate::hierarchy::{renumber, roll_up_all, roll_up_ancestors};
use crate::ids::{ScheduleId, TaskId};
use crate::persistence::ScheduleRepository;
use crate::schedule::CalculationOutcome;
use crate::writer::{CpmUpdate, WbsAssignment, apply_wbs_codes};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of a single-task date edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    pub task_id: TaskId,
    /// Successors that moved, in the order they were moved.
    pub shifted_tasks: Vec<TaskId>,
    /// Containers whose date range was recomputed.
    pub updated_containers: Vec<TaskId>,
}

impl CascadeOutcome {
    pub fn to_cli_summary(&self) -> String {
        let join = |ids: &[TaskId]| {
            ids.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        format!(
            "task={}, shifted=[{}], containers=[{}]",
            self.task_id,
            join(&self.shifted_tasks),
            join(&self.updated_containers)
        )
    }
}

/// Entry point for callers. Every operation loads the schedule, works on it in
/// memory and stores the result through one
/// [`update_schedule`](ScheduleRepository::update_schedule) call, so the
/// repository serializes it against every other writer of that schedule.
pub struct CpmEngine<R, C = SystemClock> {
    repository: R,
    clock: C,
    config: EngineConfig,
}

impl<R: ScheduleRepository> CpmEngine<R, SystemClock> {
    pub fn new(repository: R) -> Self {
        Self::with_clock(repository, SystemClock)
    }
}

impl<R: ScheduleRepository, C: Clock> CpmEngine<R, C> {
    pub fn with_clock(repository: R, clock: C) -> Self {
        Self {
            repository,
            clock,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Full CPM recalculation of one schedule.
    pub fn calculate(&self, schedule_id: ScheduleId) -> Result<CalculationOutcome> {
        let mut outcome = None;
        let mut orphaned = 0;
        self.repository.update_schedule(schedule_id, &mut |schedule| {
            let result = analyze(schedule, &self.config)?;
            let reference = self.clock.now();
            let update = CpmUpdate::from_result(schedule_id, &result, reference)?;
            update.apply_to(schedule)?;
            orphaned = result.orphaned_dependencies.len();
            outcome = Some(CalculationOutcome {
                schedule_id,
                duration: result.project_duration,
                critical_task_ids: result.critical_task_ids(),
                statistics: result.statistics(),
                calculated_at: reference,
            });
            Ok(())
        })?;
        let outcome = outcome.ok_or(CpmError::ScheduleNotFound(schedule_id))?;

        info!(
            schedule_id = %schedule_id,
            tasks = outcome.statistics.total_tasks,
            critical = outcome.statistics.critical_tasks,
            dependencies = outcome.statistics.total_dependencies,
            orphaned,
            duration = outcome.duration,
            "critical path calculated"
        );
        Ok(outcome)
    }

    /// Move one task, push its successors and roll the change up the tree.
    pub fn cascade(
        &self,
        task_id: TaskId,
        new_start: NaiveDate,
        new_end: NaiveDate,
    ) -> Result<CascadeOutcome> {
        let schedule_id = self
            .repository
            .schedule_of_task(task_id)?
            .ok_or(CpmError::TaskNotFound(task_id))?;

        let mut outcome = None;
        self.repository.update_schedule(schedule_id, &mut |schedule| {
            let shifted_tasks = propagate(schedule, task_id, new_start, new_end, &self.config)?;
            let mut moved = Vec::with_capacity(shifted_tasks.len() + 1);
            moved.push(task_id);
            moved.extend(shifted_tasks.iter().copied());
            let updated_containers = roll_up_ancestors(schedule, &moved);
            debug!(
                schedule_id = %schedule_id,
                changed = moved.len() + updated_containers.len(),
                "committing cascade"
            );
            outcome = Some(CascadeOutcome {
                task_id,
                shifted_tasks,
                updated_containers,
            });
            Ok(())
        })?;
        let outcome = outcome.ok_or(CpmError::ScheduleNotFound(schedule_id))?;

        info!(
            schedule_id = %schedule_id,
            task_id = %task_id,
            shifted = outcome.shifted_tasks.len(),
            containers = outcome.updated_containers.len(),
            "cascade applied"
        );
        Ok(outcome)
    }

    /// Recompute and store WBS codes for the whole tree.
    pub fn renumber_wbs(&self, schedule_id: ScheduleId) -> Result<Vec<WbsAssignment>> {
        let mut assignments = Vec::new();
        self.repository.update_schedule(schedule_id, &mut |schedule| {
            assignments = renumber(schedule);
            apply_wbs_codes(schedule, &assignments)?;
            Ok(())
        })?;
        info!(schedule_id = %schedule_id, tasks = assignments.len(), "wbs codes renumbered");
        Ok(assignments)
    }

    /// Recompute every container's date range from its children.
    pub fn roll_up(&self, schedule_id: ScheduleId) -> Result<Vec<TaskId>> {
        let mut updated = Vec::new();
        self.repository.update_schedule(schedule_id, &mut |schedule| {
            updated = roll_up_all(schedule);
            Ok(())
        })?;
        info!(schedule_id = %schedule_id, containers = updated.len(), "containers rolled up");
        Ok(updated)
    }
}
