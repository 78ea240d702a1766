mod common;

use common::SCHEDULE;
use proptest::prelude::*;
use schedule_cpm::calculations::constraint::{Span, backward_finish, forward_start};
use schedule_cpm::{
    ConstraintMode, CpmResult, DependencyId, DependencyType, EngineConfig, ProjectSchedule,
    ScheduleTask, TaskDependency, TaskId, analyze,
};
use std::collections::HashMap;

const EPS: f64 = 1e-6;

const KINDS: [DependencyType; 4] = [
    DependencyType::FinishToStart,
    DependencyType::StartToStart,
    DependencyType::FinishToFinish,
    DependencyType::StartToFinish,
];

/// Ids are scattered so that id order and topological order disagree.
fn task_id(index: usize) -> TaskId {
    TaskId((index as i64 * 37) % 101 + 1)
}

// Acyclic by construction: a link always points from a lower index to a
// higher one.
fn schedule_strategy(max_tasks: usize) -> impl Strategy<Value = ProjectSchedule> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let durations = proptest::collection::vec(0i64..10, num_tasks);
        let links = proptest::collection::vec(
            (any::<usize>(), any::<usize>(), 0usize..4, -6i32..=8),
            0..num_tasks * 2,
        );
        (durations, links).prop_map(move |(durations, raw_links)| {
            let mut schedule = ProjectSchedule::new(SCHEDULE, "Generated");
            for (idx, duration) in durations.into_iter().enumerate() {
                schedule.upsert_task(ScheduleTask::new(
                    task_id(idx),
                    SCHEDULE,
                    format!("task_{idx}"),
                    duration,
                ));
            }
            if num_tasks > 1 {
                for (n, (a, b, kind, half_days)) in raw_links.into_iter().enumerate() {
                    let (a, b) = (a % num_tasks, b % num_tasks);
                    if a == b {
                        continue;
                    }
                    let (pred, succ) = (a.min(b), a.max(b));
                    schedule.upsert_dependency(
                        TaskDependency::new(
                            DependencyId(n as i64 + 1),
                            task_id(pred),
                            task_id(succ),
                            KINDS[kind],
                        )
                        .with_lag(f64::from(half_days) * 0.5),
                    );
                }
            }
            schedule
        })
    })
}

fn run(schedule: &ProjectSchedule, mode: ConstraintMode) -> CpmResult {
    let config = EngineConfig::default().with_constraint_mode(mode);
    analyze(schedule, &config).expect("generated networks are acyclic")
}

proptest! {
    #[test]
    fn exact_mode_dates_respect_every_link(schedule in schedule_strategy(12)) {
        let result = run(&schedule, ConstraintMode::Exact);
        prop_assert_eq!(result.timings.len(), schedule.tasks.len());

        let durations: HashMap<TaskId, f64> = schedule
            .tasks
            .iter()
            .map(|task| (task.id, task.duration_days as f64))
            .collect();
        let mut latest_finish: f64 = 0.0;

        for timing in &result.timings {
            let duration = durations[&timing.task_id];
            prop_assert!((timing.early_finish - timing.early_start - duration).abs() < EPS);
            prop_assert!((timing.late_finish - timing.late_start - duration).abs() < EPS);
            prop_assert!(timing.early_start >= -EPS);
            prop_assert!(timing.late_finish <= result.project_duration + EPS);
            prop_assert!(timing.total_float >= -EPS);
            prop_assert!(timing.free_float >= 0.0);
            prop_assert_eq!(timing.is_critical, timing.total_float <= EPS);
            latest_finish = latest_finish.max(timing.early_finish);
        }
        prop_assert!((result.project_duration - latest_finish).abs() < EPS);
        prop_assert!(result.timings.iter().any(|timing| timing.is_critical));

        for dep in &schedule.dependencies {
            let pred = result.timing(dep.predecessor_id).unwrap();
            let succ = result.timing(dep.successor_id).unwrap();
            let bound = forward_start(
                ConstraintMode::Exact,
                dep.dependency_type,
                dep.lag_days,
                Span::new(pred.early_start, pred.early_finish),
                durations[&dep.successor_id],
            );
            prop_assert!(succ.early_start >= bound - EPS);

            let limit = backward_finish(
                ConstraintMode::Exact,
                dep.dependency_type,
                dep.lag_days,
                Span::new(succ.late_start, succ.late_finish),
                durations[&dep.predecessor_id],
            );
            prop_assert!(pred.late_finish <= limit + EPS);
        }
    }

    #[test]
    fn start_anchored_mode_keeps_durations(schedule in schedule_strategy(12)) {
        let result = run(&schedule, ConstraintMode::StartAnchored);
        for timing in &result.timings {
            let duration = schedule.task(timing.task_id).unwrap().duration_days as f64;
            prop_assert!((timing.early_finish - timing.early_start - duration).abs() < EPS);
            prop_assert!((timing.late_finish - timing.late_start - duration).abs() < EPS);
            prop_assert!(timing.free_float >= 0.0);
        }
    }

    #[test]
    fn results_do_not_depend_on_input_order(schedule in schedule_strategy(10)) {
        let mut reversed = schedule.clone();
        reversed.tasks.reverse();
        reversed.dependencies.reverse();

        for mode in [ConstraintMode::Exact, ConstraintMode::StartAnchored] {
            let first = run(&schedule, mode);
            prop_assert_eq!(&first, &run(&schedule, mode));
            prop_assert_eq!(&first, &run(&reversed, mode));
        }
    }
}
