mod common;

use common::*;
use schedule_cpm::{
    ConstraintMode, CpmError, DependencyId, DependencyType, EngineConfig, ScheduleId, TaskId,
    ValidationStatus, analyze, analyze_batch,
};

#[test]
fn single_task_is_its_own_critical_path() {
    let (engine, store) = engine(ScheduleBuilder::new("A").task(1, "Only", 3).build());

    let outcome = engine.calculate(SCHEDULE).unwrap();
    assert_eq!(outcome.duration, 3.0);
    assert_eq!(outcome.critical_task_ids, vec![TaskId(1)]);
    assert_eq!(outcome.calculated_at, reference());

    let schedule = stored(&store);
    let only = task(&schedule, 1);
    assert_eq!(offset(only.early_start), 0.0);
    assert_eq!(offset(only.early_finish), 3.0);
    assert_eq!(offset(only.late_start), 0.0);
    assert_eq!(offset(only.late_finish), 3.0);
    assert_eq!(only.total_float, Some(0));
    assert_eq!(only.free_float, Some(0));
    assert!(only.is_critical);

    assert!(schedule.metadata.critical_path_calculated);
    assert_eq!(schedule.metadata.critical_path_duration, Some(3.0));
    assert_eq!(schedule.metadata.calculated_at, Some(reference()));
}

#[test]
fn finish_to_start_chain() {
    let (engine, store) = engine(
        ScheduleBuilder::new("B")
            .task(1, "A", 5)
            .task(2, "B", 2)
            .fs(1, 2)
            .build(),
    );

    let outcome = engine.calculate(SCHEDULE).unwrap();
    assert_eq!(outcome.duration, 7.0);
    assert_eq!(outcome.critical_task_ids, vec![TaskId(1), TaskId(2)]);

    let schedule = stored(&store);
    assert_eq!(offset(task(&schedule, 2).early_start), 5.0);
    assert_eq!(offset(task(&schedule, 2).early_finish), 7.0);
    assert!(task(&schedule, 1).is_critical);
    assert!(schedule.dependencies[0].is_critical);
}

#[test]
fn shorter_branch_carries_float() {
    let (engine, store) = engine(
        ScheduleBuilder::new("C")
            .task(1, "A", 3)
            .task(2, "B", 4)
            .task(3, "C", 1)
            .fs(1, 2)
            .fs(1, 3)
            .build(),
    );

    let outcome = engine.calculate(SCHEDULE).unwrap();
    assert_eq!(outcome.duration, 7.0);
    assert_eq!(outcome.critical_task_ids, vec![TaskId(1), TaskId(2)]);
    assert_eq!(outcome.statistics.total_tasks, 3);
    assert_eq!(outcome.statistics.critical_tasks, 2);
    assert_eq!(outcome.statistics.total_dependencies, 2);
    assert!((outcome.statistics.critical_percentage - 200.0 / 3.0).abs() < 1e-9);

    let schedule = stored(&store);
    let b = task(&schedule, 2);
    assert_eq!((offset(b.early_start), offset(b.early_finish)), (3.0, 7.0));
    assert!(b.is_critical);

    let c = task(&schedule, 3);
    assert_eq!((offset(c.early_start), offset(c.early_finish)), (3.0, 4.0));
    assert_eq!(offset(c.late_start), 6.0);
    assert_eq!(c.total_float, Some(3));
    assert_eq!(c.free_float, Some(3));
    assert!(!c.is_critical);

    let a_to_c = schedule
        .dependencies
        .iter()
        .find(|dep| dep.id == DependencyId(2))
        .unwrap();
    assert!(!a_to_c.is_critical);
}

#[test]
fn cycle_aborts_before_anything_changes() {
    let mut schedule = ScheduleBuilder::new("D")
        .task(1, "A", 2)
        .task(2, "B", 2)
        .task(3, "Bystander", 1)
        .fs(1, 2)
        .fs(2, 1)
        .build();
    schedule.task_mut(TaskId(1)).unwrap().total_float = Some(42);
    let (engine, store) = engine(schedule.clone());

    match engine.calculate(SCHEDULE) {
        Err(CpmError::CyclicDependency { task_id, path }) => {
            assert_eq!(task_id, TaskId(1));
            assert_eq!(path, vec![TaskId(1), TaskId(2), TaskId(1)]);
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }
    assert_eq!(stored(&store), schedule);
}

#[test]
fn parallel_zero_float_chains_are_all_critical() {
    let (engine, _store) = engine(
        ScheduleBuilder::new("Parallel")
            .task(1, "A", 2)
            .task(2, "B", 3)
            .task(3, "C", 4)
            .task(4, "D", 1)
            .fs(1, 2)
            .fs(3, 4)
            .build(),
    );

    let outcome = engine.calculate(SCHEDULE).unwrap();
    assert_eq!(outcome.duration, 5.0);
    assert_eq!(
        outcome.critical_task_ids,
        vec![TaskId(1), TaskId(3), TaskId(2), TaskId(4)]
    );
}

#[test]
fn finish_to_finish_depends_on_constraint_mode() {
    let schedule = ScheduleBuilder::new("FF")
        .task(1, "A", 5)
        .task(2, "B", 2)
        .link(1, 2, DependencyType::FinishToFinish, 0.0)
        .build();

    let exact = analyze(&schedule, &EngineConfig::default()).unwrap();
    let b = exact.timing(TaskId(2)).unwrap();
    assert_eq!((b.early_start, b.early_finish), (3.0, 5.0));
    assert_eq!(exact.project_duration, 5.0);
    assert!(exact.timing(TaskId(1)).unwrap().is_critical);

    let anchored = analyze(
        &schedule,
        &EngineConfig::default().with_constraint_mode(ConstraintMode::StartAnchored),
    )
    .unwrap();
    let b = anchored.timing(TaskId(2)).unwrap();
    assert_eq!((b.early_start, b.early_finish), (5.0, 7.0));
    assert_eq!(anchored.project_duration, 7.0);
    let a = anchored.timing(TaskId(1)).unwrap();
    assert_eq!(a.total_float, 2.0);
    assert!(!a.is_critical);
}

#[test]
fn start_to_start_lag_overlaps_tasks() {
    let schedule = ScheduleBuilder::new("SS")
        .task(1, "Dig", 4)
        .task(2, "Pour", 3)
        .link(1, 2, DependencyType::StartToStart, 2.0)
        .build();

    let result = analyze(&schedule, &EngineConfig::default()).unwrap();
    let pour = result.timing(TaskId(2)).unwrap();
    assert_eq!((pour.early_start, pour.early_finish), (2.0, 5.0));
    assert_eq!(result.project_duration, 5.0);
    assert!(result.timing(TaskId(1)).unwrap().is_critical);
    assert!(pour.is_critical);
}

#[test]
fn fractional_lag_lands_mid_day() {
    let (engine, store) = engine(
        ScheduleBuilder::new("Half day")
            .task(1, "A", 1)
            .task(2, "B", 1)
            .link(1, 2, DependencyType::FinishToStart, 0.5)
            .build(),
    );

    let outcome = engine.calculate(SCHEDULE).unwrap();
    assert_eq!(outcome.duration, 2.5);
    let schedule = stored(&store);
    assert_eq!(offset(task(&schedule, 2).early_start), 1.5);
    assert_eq!(
        task(&schedule, 2).early_start.unwrap().to_rfc3339(),
        "2025-01-07T12:00:00+00:00"
    );
}

#[test]
fn sub_day_float_is_stored_as_a_whole_day() {
    let (engine, store) = engine(
        ScheduleBuilder::new("Small float")
            .task(1, "A", 1)
            .task(2, "B", 1)
            .task(3, "C", 2)
            .link(1, 2, DependencyType::FinishToStart, 0.4)
            .build(),
    );

    let outcome = engine.calculate(SCHEDULE).unwrap();
    assert!((outcome.duration - 2.4).abs() < 1e-9);
    assert_eq!(outcome.critical_task_ids, vec![TaskId(1), TaskId(2)]);

    let schedule = stored(&store);
    let c = task(&schedule, 3);
    assert!(!c.is_critical);
    assert_eq!(c.total_float, Some(1));
    assert_eq!(c.free_float, Some(1));

    for id in [1, 2] {
        let critical = task(&schedule, id);
        assert!(critical.is_critical);
        assert_eq!(critical.total_float, Some(0));
    }
    for t in &schedule.tasks {
        assert_eq!(t.is_critical, t.total_float == Some(0), "task {}", t.id);
    }
}

#[test]
fn containers_and_orphaned_links_are_left_out() {
    let mut schedule = ScheduleBuilder::new("Tree")
        .summary(10, "Phase", None)
        .task(1, "A", 2)
        .task(2, "B", 3)
        .fs(1, 2)
        .fs(10, 2)
        .fs(2, 99)
        .build();
    for id in [1, 2] {
        schedule.task_mut(TaskId(id)).unwrap().parent_id = Some(TaskId(10));
    }
    schedule.task_mut(TaskId(10)).unwrap().total_float = Some(5);

    let result = analyze(&schedule, &EngineConfig::default()).unwrap();
    assert_eq!(result.timings.len(), 2);
    assert_eq!(result.orphaned_dependencies, vec![DependencyId(2), DependencyId(3)]);
    assert_eq!(result.dependency_count, 1);

    let (engine, store) = engine(schedule);
    let outcome = engine.calculate(SCHEDULE).unwrap();
    assert_eq!(outcome.statistics.total_dependencies, 1);

    let schedule = stored(&store);
    let phase = task(&schedule, 10);
    assert_eq!(phase.total_float, None);
    assert_eq!(phase.early_start, None);
    assert!(!phase.is_critical);
}

#[test]
fn inactive_and_unvalidated_links_do_not_constrain() {
    let mut schedule = ScheduleBuilder::new("Inactive")
        .task(1, "A", 3)
        .task(2, "B", 2)
        .task(3, "C", 1)
        .fs(1, 2)
        .fs(1, 3)
        .build();
    schedule.dependencies[0].is_active = false;
    schedule.dependencies[1].validation_status = ValidationStatus::Invalid;

    let result = analyze(&schedule, &EngineConfig::default()).unwrap();
    assert_eq!(result.project_duration, 3.0);
    assert_eq!(result.timing(TaskId(2)).unwrap().early_start, 0.0);
    assert_eq!(result.timing(TaskId(2)).unwrap().total_float, 1.0);
    assert!(result.orphaned_dependencies.is_empty());
    assert_eq!(result.dependency_count, 0);
}

#[test]
fn empty_schedule_has_zero_duration() {
    let (engine, _store) = engine(ScheduleBuilder::new("Empty").build());
    let outcome = engine.calculate(SCHEDULE).unwrap();
    assert_eq!(outcome.duration, 0.0);
    assert!(outcome.critical_task_ids.is_empty());
    assert_eq!(outcome.statistics.total_tasks, 0);
    assert_eq!(outcome.statistics.critical_percentage, 0.0);
}

#[test]
fn recalculation_is_idempotent() {
    let (engine, store) = engine(
        ScheduleBuilder::new("Twice")
            .task(1, "A", 3)
            .task(2, "B", 4)
            .task(3, "C", 1)
            .fs(1, 2)
            .link(1, 3, DependencyType::StartToFinish, 2.0)
            .build(),
    );

    let first = engine.calculate(SCHEDULE).unwrap();
    let after_first = stored(&store);
    let second = engine.calculate(SCHEDULE).unwrap();
    assert_eq!(first, second);
    assert_eq!(stored(&store), after_first);
}

#[test]
fn unknown_schedule_is_reported() {
    let (engine, _store) = engine(ScheduleBuilder::new("Known").build());
    assert!(matches!(
        engine.calculate(ScheduleId(9)),
        Err(CpmError::ScheduleNotFound(ScheduleId(9)))
    ));
}

#[test]
fn invalid_schedules_are_rejected_by_analysis() {
    let mut schedule = ScheduleBuilder::new("Invalid").task(1, "A", 3).build();
    schedule.tasks[0].duration_days = -2;
    assert!(matches!(
        analyze(&schedule, &EngineConfig::default()),
        Err(CpmError::Validation(_))
    ));
}

#[test]
fn batch_analysis_keeps_schedules_independent() {
    let good = ScheduleBuilder::new("Good").task(1, "A", 2).task(2, "B", 3).fs(1, 2).build();
    let mut cyclic = ScheduleBuilder::new("Bad")
        .task(1, "A", 1)
        .task(2, "B", 1)
        .fs(1, 2)
        .fs(2, 1)
        .build();
    cyclic.id = ScheduleId(2);
    for task in &mut cyclic.tasks {
        task.schedule_id = ScheduleId(2);
    }

    let results = analyze_batch(&[good, cyclic], &EngineConfig::default());
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, SCHEDULE);
    assert_eq!(results[0].1.as_ref().unwrap().project_duration, 5.0);
    assert_eq!(results[1].0, ScheduleId(2));
    assert!(matches!(results[1].1, Err(CpmError::CyclicDependency { .. })));
}
