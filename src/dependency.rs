use crate::ids::{DependencyId, TaskId};
use serde::{Deserialize, Serialize};

/// Link type between a predecessor and a successor.
///
/// Parsing is lenient: anything unrecognised is treated as finish-to-start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DependencyType {
    #[default]
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "FS",
            DependencyType::StartToStart => "SS",
            DependencyType::FinishToFinish => "FF",
            DependencyType::StartToFinish => "SF",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "SS" | "START_TO_START" => DependencyType::StartToStart,
            "FF" | "FINISH_TO_FINISH" => DependencyType::FinishToFinish,
            "SF" | "START_TO_FINISH" => DependencyType::StartToFinish,
            _ => DependencyType::FinishToStart,
        }
    }
}

impl From<String> for DependencyType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<DependencyType> for String {
    fn from(value: DependencyType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Valid,
    Pending,
    Invalid,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Pending => "pending",
            ValidationStatus::Invalid => "invalid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "valid" => Some(ValidationStatus::Valid),
            "pending" => Some(ValidationStatus::Pending),
            "invalid" => Some(ValidationStatus::Invalid),
            _ => None,
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDependency {
    pub id: DependencyId,
    pub predecessor_id: TaskId,
    pub successor_id: TaskId,
    #[serde(default)]
    pub dependency_type: DependencyType,
    /// Signed offset in days; negative values allow overlap.
    #[serde(default)]
    pub lag_days: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub validation_status: ValidationStatus,
    #[serde(default)]
    pub is_critical: bool,
}

impl TaskDependency {
    pub fn new(
        id: DependencyId,
        predecessor_id: TaskId,
        successor_id: TaskId,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            id,
            predecessor_id,
            successor_id,
            dependency_type,
            lag_days: 0.0,
            is_active: true,
            validation_status: ValidationStatus::Valid,
            is_critical: false,
        }
    }

    pub fn finish_to_start(id: DependencyId, predecessor_id: TaskId, successor_id: TaskId) -> Self {
        Self::new(id, predecessor_id, successor_id, DependencyType::FinishToStart)
    }

    pub fn with_lag(mut self, lag_days: f64) -> Self {
        self.lag_days = lag_days;
        self
    }

    /// Active and validated; endpoint checks happen when the graph is loaded.
    pub fn is_enabled(&self) -> bool {
        self.is_active && self.validation_status == ValidationStatus::Valid
    }
}
