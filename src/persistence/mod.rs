use crate::error::{self, CpmError};
use crate::ids::{ScheduleId, TaskId};
use crate::schedule::ProjectSchedule;
use crate::task_validation;
use crate::writer::{CpmUpdate, TaskDateUpdate, WbsAssignment};
use serde_json::Error as SerdeJsonError;
use std::io;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// The closure [`ScheduleRepository::update_schedule`] runs on the loaded schedule.
pub type ScheduleWork<'a> = dyn FnMut(&mut ProjectSchedule) -> error::Result<()> + 'a;

/// Storage seam for the engine. Every `commit_*` call is all-or-nothing: if
/// any part of the update is rejected the stored schedule is unchanged.
///
/// Writes to one schedule are serialized by the store itself, so two engines
/// or two processes sharing a store never interleave their updates.
pub trait ScheduleRepository {
    fn load_schedule(&self, schedule_id: ScheduleId) -> PersistenceResult<Option<ProjectSchedule>>;
    fn schedule_of_task(&self, task_id: TaskId) -> PersistenceResult<Option<ScheduleId>>;
    fn schedule_ids(&self) -> PersistenceResult<Vec<ScheduleId>>;
    fn save_schedule(&self, schedule: &ProjectSchedule) -> PersistenceResult<()>;
    /// Load `schedule_id`, run `work` on it and store the result while holding
    /// the schedule's write lock for the whole sequence. Nothing is stored when
    /// `work` fails or the result does not validate.
    fn update_schedule(&self, schedule_id: ScheduleId, work: &mut ScheduleWork<'_>) -> error::Result<()>;
    fn commit_cpm(&self, update: &CpmUpdate) -> PersistenceResult<()>;
    fn commit_task_dates(
        &self,
        schedule_id: ScheduleId,
        updates: &[TaskDateUpdate],
    ) -> PersistenceResult<()>;
    fn commit_wbs_codes(
        &self,
        schedule_id: ScheduleId,
        assignments: &[WbsAssignment],
    ) -> PersistenceResult<()>;
}

impl<T: ScheduleRepository + ?Sized> ScheduleRepository for Arc<T> {
    fn load_schedule(&self, schedule_id: ScheduleId) -> PersistenceResult<Option<ProjectSchedule>> {
        (**self).load_schedule(schedule_id)
    }

    fn schedule_of_task(&self, task_id: TaskId) -> PersistenceResult<Option<ScheduleId>> {
        (**self).schedule_of_task(task_id)
    }

    fn schedule_ids(&self) -> PersistenceResult<Vec<ScheduleId>> {
        (**self).schedule_ids()
    }

    fn save_schedule(&self, schedule: &ProjectSchedule) -> PersistenceResult<()> {
        (**self).save_schedule(schedule)
    }

    fn update_schedule(&self, schedule_id: ScheduleId, work: &mut ScheduleWork<'_>) -> error::Result<()> {
        (**self).update_schedule(schedule_id, work)
    }

    fn commit_cpm(&self, update: &CpmUpdate) -> PersistenceResult<()> {
        (**self).commit_cpm(update)
    }

    fn commit_task_dates(
        &self,
        schedule_id: ScheduleId,
        updates: &[TaskDateUpdate],
    ) -> PersistenceResult<()> {
        (**self).commit_task_dates(schedule_id, updates)
    }

    fn commit_wbs_codes(
        &self,
        schedule_id: ScheduleId,
        assignments: &[WbsAssignment],
    ) -> PersistenceResult<()> {
        (**self).commit_wbs_codes(schedule_id, assignments)
    }
}

pub fn validate_schedule(schedule: &ProjectSchedule) -> PersistenceResult<()> {
    task_validation::validate_schedule(schedule)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub(crate) fn missing_schedule(schedule_id: ScheduleId) -> PersistenceError {
    PersistenceError::NotFound(format!("schedule {schedule_id}"))
}

/// Engine-facing form of a missing schedule.
pub(crate) fn engine_error(schedule_id: ScheduleId, err: CpmError) -> CpmError {
    match err {
        CpmError::Persistence(PersistenceError::NotFound(_)) => CpmError::ScheduleNotFound(schedule_id),
        other => other,
    }
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_schedule_from_csv, load_schedule_from_json, save_schedule_to_csv, save_schedule_to_json,
};
pub use memory::InMemoryScheduleStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteScheduleStore;
