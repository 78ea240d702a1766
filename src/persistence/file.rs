//! JSON and CSV snapshots of a single schedule.
//!
//! The CSV form packs everything into one file: a `record` column says whether
//! a row is the `schedule` header, a `task` or a `dependency`, and columns that
//! do not apply to a row stay empty.

use super::{PersistenceError, PersistenceResult, validate_schedule};
use crate::dependency::{DependencyType, TaskDependency, ValidationStatus};
use crate::ids::{DependencyId, ScheduleId, TaskId};
use crate::metadata::ScheduleMetadata;
use crate::schedule::ProjectSchedule;
use crate::task::{ScheduleTask, TaskType};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

pub fn save_schedule_to_json<P: AsRef<Path>>(
    schedule: &ProjectSchedule,
    path: P,
) -> PersistenceResult<()> {
    validate_schedule(schedule)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, schedule)?;
    Ok(())
}

pub fn load_schedule_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectSchedule> {
    let file = File::open(path)?;
    let schedule: ProjectSchedule = serde_json::from_reader(file)?;
    validate_schedule(&schedule)?;
    Ok(schedule)
}

const SCHEDULE_RECORD: &str = "schedule";
const TASK_RECORD: &str = "task";
const DEPENDENCY_RECORD: &str = "dependency";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ScheduleCsvRecord {
    record: String,
    id: i64,
    name: String,
    description: String,
    auto_scheduling_enabled: String,
    critical_path_calculated: String,
    critical_path_duration: String,
    calculated_at: String,
    baseline_id: String,
    parent_id: String,
    task_type: String,
    duration_days: String,
    planned_start: String,
    planned_end: String,
    sort_order: String,
    wbs_code: String,
    early_start: String,
    early_finish: String,
    late_start: String,
    late_finish: String,
    total_float: String,
    free_float: String,
    is_critical: String,
    predecessor_id: String,
    successor_id: String,
    dependency_type: String,
    lag_days: String,
    is_active: String,
    validation_status: String,
}

impl ScheduleCsvRecord {
    fn from_schedule(schedule: &ProjectSchedule) -> Self {
        let metadata = &schedule.metadata;
        Self {
            record: SCHEDULE_RECORD.into(),
            id: schedule.id.get(),
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            auto_scheduling_enabled: metadata.auto_scheduling_enabled.to_string(),
            critical_path_calculated: metadata.critical_path_calculated.to_string(),
            critical_path_duration: format_option(metadata.critical_path_duration),
            calculated_at: format_datetime(metadata.calculated_at),
            baseline_id: metadata.baseline_id.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    fn from_task(task: &ScheduleTask) -> Self {
        Self {
            record: TASK_RECORD.into(),
            id: task.id.get(),
            name: task.name.clone(),
            parent_id: format_option(task.parent_id),
            task_type: task.task_type.as_str().into(),
            duration_days: task.duration_days.to_string(),
            planned_start: format_date(task.planned_start),
            planned_end: format_date(task.planned_end),
            sort_order: task.sort_order.to_string(),
            wbs_code: task.wbs_code.clone().unwrap_or_default(),
            early_start: format_datetime(task.early_start),
            early_finish: format_datetime(task.early_finish),
            late_start: format_datetime(task.late_start),
            late_finish: format_datetime(task.late_finish),
            total_float: format_option(task.total_float),
            free_float: format_option(task.free_float),
            is_critical: task.is_critical.to_string(),
            ..Self::default()
        }
    }

    fn from_dependency(dependency: &TaskDependency) -> Self {
        Self {
            record: DEPENDENCY_RECORD.into(),
            id: dependency.id.get(),
            predecessor_id: dependency.predecessor_id.to_string(),
            successor_id: dependency.successor_id.to_string(),
            dependency_type: dependency.dependency_type.as_str().into(),
            lag_days: dependency.lag_days.to_string(),
            is_active: dependency.is_active.to_string(),
            validation_status: dependency.validation_status.as_str().into(),
            is_critical: dependency.is_critical.to_string(),
            ..Self::default()
        }
    }

    fn into_metadata(self) -> PersistenceResult<ScheduleMetadata> {
        Ok(ScheduleMetadata {
            name: self.name,
            description: self.description,
            auto_scheduling_enabled: parse_option(&self.auto_scheduling_enabled, "auto_scheduling_enabled")?
                .unwrap_or(true),
            critical_path_calculated: parse_option(&self.critical_path_calculated, "critical_path_calculated")?
                .unwrap_or(false),
            critical_path_duration: parse_option(&self.critical_path_duration, "critical_path_duration")?,
            calculated_at: parse_datetime(&self.calculated_at)?,
            baseline_id: non_empty(self.baseline_id),
        })
    }

    fn into_task(self, schedule_id: ScheduleId) -> PersistenceResult<ScheduleTask> {
        let task_type = if self.task_type.trim().is_empty() {
            TaskType::default()
        } else {
            TaskType::parse(&self.task_type).ok_or_else(|| {
                PersistenceError::InvalidData(format!("invalid task_type '{}'", self.task_type))
            })?
        };
        let mut task = ScheduleTask::new(
            TaskId(self.id),
            schedule_id,
            self.name,
            parse_option(&self.duration_days, "duration_days")?.unwrap_or(0),
        );
        task.task_type = task_type;
        task.parent_id = parse_option::<i64>(&self.parent_id, "parent_id")?.map(TaskId);
        task.planned_start = parse_date(&self.planned_start)?;
        task.planned_end = parse_date(&self.planned_end)?;
        task.sort_order = parse_option(&self.sort_order, "sort_order")?.unwrap_or(0);
        task.wbs_code = non_empty(self.wbs_code);
        task.early_start = parse_datetime(&self.early_start)?;
        task.early_finish = parse_datetime(&self.early_finish)?;
        task.late_start = parse_datetime(&self.late_start)?;
        task.late_finish = parse_datetime(&self.late_finish)?;
        task.total_float = parse_option(&self.total_float, "total_float")?;
        task.free_float = parse_option(&self.free_float, "free_float")?;
        task.is_critical = parse_option(&self.is_critical, "is_critical")?.unwrap_or(false);
        Ok(task)
    }

    fn into_dependency(self) -> PersistenceResult<TaskDependency> {
        let endpoint = |value: &str, column: &str| -> PersistenceResult<TaskId> {
            parse_option::<i64>(value, column)?
                .map(TaskId)
                .ok_or_else(|| {
                    PersistenceError::InvalidData(format!("dependency {} is missing {column}", self.id))
                })
        };
        let validation_status = if self.validation_status.trim().is_empty() {
            ValidationStatus::default()
        } else {
            ValidationStatus::parse(&self.validation_status).ok_or_else(|| {
                PersistenceError::InvalidData(format!(
                    "invalid validation_status '{}'",
                    self.validation_status
                ))
            })?
        };

        let mut dependency = TaskDependency::new(
            DependencyId(self.id),
            endpoint(&self.predecessor_id, "predecessor_id")?,
            endpoint(&self.successor_id, "successor_id")?,
            DependencyType::parse(&self.dependency_type),
        );
        dependency.lag_days = parse_option(&self.lag_days, "lag_days")?.unwrap_or(0.0);
        dependency.is_active = parse_option(&self.is_active, "is_active")?.unwrap_or(true);
        dependency.validation_status = validation_status;
        dependency.is_critical = parse_option(&self.is_critical, "is_critical")?.unwrap_or(false);
        Ok(dependency)
    }
}

pub fn save_schedule_to_csv<P: AsRef<Path>>(
    schedule: &ProjectSchedule,
    path: P,
) -> PersistenceResult<()> {
    validate_schedule(schedule)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(ScheduleCsvRecord::from_schedule(schedule))?;
    for task in &schedule.tasks {
        writer.serialize(ScheduleCsvRecord::from_task(task))?;
    }
    for dependency in &schedule.dependencies {
        writer.serialize(ScheduleCsvRecord::from_dependency(dependency))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_schedule_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectSchedule> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut records = reader.deserialize::<ScheduleCsvRecord>();

    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(PersistenceError::InvalidData(
                "CSV file contained no schedule row".into(),
            ));
        }
    };
    if header.record != SCHEDULE_RECORD {
        return Err(PersistenceError::InvalidData(format!(
            "first CSV row must be a '{SCHEDULE_RECORD}' record, found '{}'",
            header.record
        )));
    }
    let schedule_id = ScheduleId(header.id);
    let mut schedule = ProjectSchedule::new_with_metadata(schedule_id, header.into_metadata()?);

    for record in records {
        let record = record?;
        match record.record.as_str() {
            TASK_RECORD => schedule.tasks.push(record.into_task(schedule_id)?),
            DEPENDENCY_RECORD => schedule.dependencies.push(record.into_dependency()?),
            other => {
                return Err(PersistenceError::InvalidData(format!(
                    "unexpected CSV record type '{other}'"
                )));
            }
        }
    }

    validate_schedule(&schedule)?;
    Ok(schedule)
}

fn format_option<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_datetime(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|v| v.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn parse_option<T>(input: &str, column: &str) -> PersistenceResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid {column} '{input}': {e}")))
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_datetime(input: &str) -> PersistenceResult<Option<DateTime<Utc>>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(input.trim())
        .map(|value| Some(value.with_timezone(&Utc)))
        .map_err(|e| PersistenceError::InvalidData(format!("invalid timestamp '{input}': {e}")))
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
