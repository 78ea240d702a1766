use crate::ids::ScheduleId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-schedule mutexes. Work on one schedule is serialized; different
/// schedules never contend beyond the brief registry lookup.
#[derive(Debug, Default)]
pub struct ScheduleLocks {
    slots: Mutex<HashMap<ScheduleId, Arc<Mutex<()>>>>,
}

impl ScheduleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self, schedule_id: ScheduleId) -> Arc<Mutex<()>> {
        self.slots.lock().entry(schedule_id).or_default().clone()
    }
}
