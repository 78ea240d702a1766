use super::{
    PersistenceError, PersistenceResult, ScheduleRepository, ScheduleWork, engine_error,
    missing_schedule, validate_schedule,
};
use crate::error;
use crate::ids::{ScheduleId, TaskId};
use crate::locks::ScheduleLocks;
use crate::schedule::ProjectSchedule;
use crate::writer::{CpmUpdate, TaskDateUpdate, WbsAssignment, apply_task_dates, apply_wbs_codes};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Repository held entirely in memory. Updates of one schedule take that
/// schedule's lock, work on a copy and swap it in only when the whole update
/// applied. Other schedules stay readable and writable meanwhile.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    schedules: RwLock<BTreeMap<ScheduleId, ProjectSchedule>>,
    locks: ScheduleLocks,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedules(schedules: impl IntoIterator<Item = ProjectSchedule>) -> PersistenceResult<Self> {
        let store = Self::new();
        for schedule in schedules {
            store.save_schedule(&schedule)?;
        }
        Ok(store)
    }

    fn modify<E, F>(&self, schedule_id: ScheduleId, apply: F) -> Result<(), E>
    where
        E: From<PersistenceError>,
        F: FnOnce(&mut ProjectSchedule) -> Result<(), E>,
    {
        let handle = self.locks.handle(schedule_id);
        let _guard = handle.lock();
        let mut draft = self
            .schedules
            .read()
            .get(&schedule_id)
            .cloned()
            .ok_or_else(|| missing_schedule(schedule_id))?;
        apply(&mut draft)?;
        validate_schedule(&draft)?;
        self.schedules.write().insert(schedule_id, draft);
        Ok(())
    }
}

impl ScheduleRepository for InMemoryScheduleStore {
    fn load_schedule(&self, schedule_id: ScheduleId) -> PersistenceResult<Option<ProjectSchedule>> {
        Ok(self.schedules.read().get(&schedule_id).cloned())
    }

    fn schedule_of_task(&self, task_id: TaskId) -> PersistenceResult<Option<ScheduleId>> {
        Ok(self
            .schedules
            .read()
            .values()
            .find(|schedule| schedule.task(task_id).is_some())
            .map(|schedule| schedule.id))
    }

    fn schedule_ids(&self) -> PersistenceResult<Vec<ScheduleId>> {
        Ok(self.schedules.read().keys().copied().collect())
    }

    fn save_schedule(&self, schedule: &ProjectSchedule) -> PersistenceResult<()> {
        validate_schedule(schedule)?;
        let handle = self.locks.handle(schedule.id);
        let _guard = handle.lock();
        self.schedules.write().insert(schedule.id, schedule.clone());
        Ok(())
    }

    fn update_schedule(&self, schedule_id: ScheduleId, work: &mut ScheduleWork<'_>) -> error::Result<()> {
        self.modify(schedule_id, |schedule| work(schedule))
            .map_err(|err| engine_error(schedule_id, err))
    }

    fn commit_cpm(&self, update: &CpmUpdate) -> PersistenceResult<()> {
        self.modify(update.schedule_id, |schedule| update.apply_to(schedule))
    }

    fn commit_task_dates(
        &self,
        schedule_id: ScheduleId,
        updates: &[TaskDateUpdate],
    ) -> PersistenceResult<()> {
        self.modify(schedule_id, |schedule| apply_task_dates(schedule, updates))
    }

    fn commit_wbs_codes(
        &self,
        schedule_id: ScheduleId,
        assignments: &[WbsAssignment],
    ) -> PersistenceResult<()> {
        self.modify(schedule_id, |schedule| apply_wbs_codes(schedule, assignments))
    }
}
