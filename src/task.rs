use crate::ids::{ScheduleId, TaskId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Work tasks take part in CPM math; summary tasks only aggregate their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    Work,
    Summary,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Work => "work",
            TaskType::Summary => "summary",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "work" | "task" => Some(TaskType::Work),
            "summary" | "container" => Some(TaskType::Summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTask {
    pub id: TaskId,
    pub schedule_id: ScheduleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    pub name: String,
    #[serde(default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub duration_days: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_end: Option<NaiveDate>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wbs_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_finish: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_finish: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_float: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_float: Option<i64>,
    #[serde(default)]
    pub is_critical: bool,
}

impl ScheduleTask {
    pub fn new(
        id: TaskId,
        schedule_id: ScheduleId,
        name: impl Into<String>,
        duration_days: i64,
    ) -> Self {
        Self {
            id,
            schedule_id,
            parent_id: None,
            name: name.into(),
            task_type: TaskType::Work,
            duration_days,
            planned_start: None,
            planned_end: None,
            sort_order: 0,
            wbs_code: None,
            early_start: None,
            early_finish: None,
            late_start: None,
            late_finish: None,
            total_float: None,
            free_float: None,
            is_critical: false,
        }
    }

    pub fn summary(id: TaskId, schedule_id: ScheduleId, name: impl Into<String>) -> Self {
        let mut task = Self::new(id, schedule_id, name, 0);
        task.task_type = TaskType::Summary;
        task
    }

    pub fn with_parent(mut self, parent_id: TaskId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.planned_start = Some(start);
        self.planned_end = Some(end);
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn is_container(&self) -> bool {
        self.task_type == TaskType::Summary
    }

    /// Calendar span between planned start and end, falling back to the
    /// planned duration when either date is missing.
    pub fn span_days(&self) -> i64 {
        match (self.planned_start, self.planned_end) {
            (Some(start), Some(end)) => (end - start).num_days(),
            _ => self.duration_days,
        }
    }

    pub fn clear_cpm_fields(&mut self) {
        self.early_start = None;
        self.early_finish = None;
        self.late_start = None;
        self.late_finish = None;
        self.total_float = None;
        self.free_float = None;
        self.is_critical = false;
    }
}
