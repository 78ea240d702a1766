//! Numeric identifier newtypes shared by tasks, dependencies and schedules.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a [`ScheduleTask`](crate::ScheduleTask).
    TaskId
);
numeric_id!(
    /// Identifier of a [`TaskDependency`](crate::TaskDependency).
    DependencyId
);
numeric_id!(
    /// Identifier of a [`ProjectSchedule`](crate::ProjectSchedule).
    ScheduleId
);
