use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_auto_scheduling() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_auto_scheduling")]
    pub auto_scheduling_enabled: bool,
    #[serde(default)]
    pub critical_path_calculated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_path_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_at: Option<DateTime<Utc>>,
    /// Opaque reference to a baseline snapshot owned elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_id: Option<String>,
}

impl Default for ScheduleMetadata {
    fn default() -> Self {
        Self {
            name: "New Schedule".to_string(),
            description: String::new(),
            auto_scheduling_enabled: true,
            critical_path_calculated: false,
            critical_path_duration: None,
            calculated_at: None,
            baseline_id: None,
        }
    }
}
