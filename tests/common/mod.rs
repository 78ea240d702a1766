#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use schedule_cpm::{
    CpmEngine, DependencyId, DependencyType, EngineConfig, FixedClock, InMemoryScheduleStore,
    ProjectSchedule, ScheduleId, ScheduleRepository, ScheduleTask, TaskDependency, TaskId,
};
use std::sync::Arc;

pub const SCHEDULE: ScheduleId = ScheduleId(1);

pub fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap()
}

/// Day offset of `at` from [`reference`].
pub fn offset(at: Option<DateTime<Utc>>) -> f64 {
    let at = at.expect("date is set");
    (at - reference()).num_milliseconds() as f64 / 86_400_000.0
}

pub struct ScheduleBuilder {
    schedule: ProjectSchedule,
    next_dependency: i64,
}

impl ScheduleBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            schedule: ProjectSchedule::new(SCHEDULE, name),
            next_dependency: 1,
        }
    }

    pub fn task(mut self, id: i64, name: &str, duration: i64) -> Self {
        self.schedule
            .upsert_task(ScheduleTask::new(TaskId(id), SCHEDULE, name, duration));
        self
    }

    pub fn summary(mut self, id: i64, name: &str, parent: Option<i64>) -> Self {
        let mut task = ScheduleTask::summary(TaskId(id), SCHEDULE, name);
        task.parent_id = parent.map(TaskId);
        self.schedule.upsert_task(task);
        self
    }

    pub fn dated(
        mut self,
        id: i64,
        name: &str,
        parent: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let mut task = ScheduleTask::new(TaskId(id), SCHEDULE, name, (end - start).num_days())
            .with_dates(start, end);
        task.parent_id = parent.map(TaskId);
        self.schedule.upsert_task(task);
        self
    }

    pub fn link(mut self, pred: i64, succ: i64, kind: DependencyType, lag: f64) -> Self {
        let id = DependencyId(self.next_dependency);
        self.next_dependency += 1;
        self.schedule.upsert_dependency(
            TaskDependency::new(id, TaskId(pred), TaskId(succ), kind).with_lag(lag),
        );
        self
    }

    pub fn fs(self, pred: i64, succ: i64) -> Self {
        self.link(pred, succ, DependencyType::FinishToStart, 0.0)
    }

    pub fn auto_scheduling(mut self, enabled: bool) -> Self {
        self.schedule.metadata.auto_scheduling_enabled = enabled;
        self
    }

    pub fn build(self) -> ProjectSchedule {
        self.schedule
    }
}

pub type TestEngine = CpmEngine<Arc<InMemoryScheduleStore>, FixedClock>;

pub fn engine_with(schedule: ProjectSchedule, config: EngineConfig) -> (TestEngine, Arc<InMemoryScheduleStore>) {
    let store = Arc::new(InMemoryScheduleStore::with_schedules([schedule]).unwrap());
    let engine = CpmEngine::with_clock(Arc::clone(&store), FixedClock(reference())).with_config(config);
    (engine, store)
}

pub fn engine(schedule: ProjectSchedule) -> (TestEngine, Arc<InMemoryScheduleStore>) {
    engine_with(schedule, EngineConfig::default())
}

pub fn stored(store: &InMemoryScheduleStore) -> ProjectSchedule {
    store.load_schedule(SCHEDULE).unwrap().unwrap()
}

pub fn task(schedule: &ProjectSchedule, id: i64) -> &ScheduleTask {
    schedule.task(TaskId(id)).expect("task exists")
}
