use crate::calculations::constraint::ConstraintMode;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CASCADE_STEP_LIMIT: usize = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Knobs for a [`CpmEngine`](crate::CpmEngine). Schedule-level switches such as
/// auto-scheduling live on [`ScheduleMetadata`](crate::ScheduleMetadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub constraint_mode: ConstraintMode,
    /// Upper bound on successor evaluations in a single cascade.
    pub cascade_step_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            constraint_mode: ConstraintMode::default(),
            cascade_step_limit: DEFAULT_CASCADE_STEP_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn with_constraint_mode(mut self, mode: ConstraintMode) -> Self {
        self.constraint_mode = mode;
        self
    }

    pub fn with_cascade_step_limit(mut self, limit: usize) -> Self {
        self.cascade_step_limit = limit;
        self
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: EngineConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cascade_step_limit == 0 {
            return Err(ConfigError::Invalid(
                "cascade_step_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.constraint_mode, ConstraintMode::Exact);
    }

    #[test]
    fn parses_start_anchored_mode() {
        let config = EngineConfig::from_json_str(
            r#"{"constraint_mode": "start_anchored", "cascade_step_limit": 25}"#,
        )
        .unwrap();
        assert_eq!(config.constraint_mode, ConstraintMode::StartAnchored);
        assert_eq!(config.cascade_step_limit, 25);
    }

    #[test]
    fn zero_step_limit_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{"cascade_step_limit": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn json_file_round_trip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = EngineConfig::default().with_cascade_step_limit(12);
        config.save_json_file(file.path()).unwrap();
        assert_eq!(EngineConfig::from_json_file(file.path()).unwrap(), config);
    }
}
