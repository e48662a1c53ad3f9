use deadliner_core::{
    GoalInput, GoalUpdate, ProgressEntry, ProgressInput, ProgressUpdate, RecordStore,
    SqliteRecordStore, TrackerService, TrackerServiceError, ValidationError,
};
use uuid::Uuid;

fn service() -> TrackerService<SqliteRecordStore> {
    TrackerService::new(SqliteRecordStore::open_in_memory().unwrap())
}

fn thesis_input() -> GoalInput {
    GoalInput {
        name: "Thesis".to_string(),
        period_type: "week".to_string(),
        start_date: "2024-01-01".to_string(),
        end_date: "2024-01-07".to_string(),
        measure_type: "full_days".to_string(),
        target_value: 5.0,
    }
}

fn log(
    service: &mut TrackerService<SqliteRecordStore>,
    goal_id: Uuid,
    date: &str,
    value: f64,
) -> ProgressEntry {
    service
        .create_progress(ProgressInput {
            goal_id: goal_id.to_string(),
            date: date.to_string(),
            value,
            note: None,
        })
        .unwrap()
}

#[test]
fn thesis_scenario_tracks_completion_through_overshoot() {
    let mut service = service();
    let goal = service.create_goal(thesis_input()).unwrap();
    log(&mut service, goal.id, "2024-01-02", 1.0);
    log(&mut service, goal.id, "2024-01-03", 1.0);

    let summary = service.summaries().unwrap().remove(0);
    assert_eq!(summary.goal.id, goal.id);
    assert_eq!(summary.completed, 2.0);
    assert_eq!(summary.remaining, 3.0);
    assert!((summary.percentage - 40.0).abs() < 1e-9);

    log(&mut service, goal.id, "2024-01-04", 10.0);
    let summary = service.summaries().unwrap().remove(0);
    assert_eq!(summary.completed, 12.0);
    assert_eq!(summary.remaining, 0.0);
    assert_eq!(summary.percentage, 100.0);
}

#[test]
fn deleting_goal_removes_summary_and_entries() {
    let mut service = service();
    let goal = service.create_goal(thesis_input()).unwrap();
    let entries = vec![
        log(&mut service, goal.id, "2024-01-02", 1.0),
        log(&mut service, goal.id, "2024-01-03", 1.0),
        log(&mut service, goal.id, "2024-01-04", 10.0),
    ];

    let deletion = service.delete_goal(goal.id).unwrap();
    assert_eq!(deletion.entries_removed, 3);

    assert!(service
        .summaries()
        .unwrap()
        .iter()
        .all(|summary| summary.goal.id != goal.id));
    for entry in entries {
        let err = service.get_progress(entry.id).unwrap_err();
        assert!(matches!(err, TrackerServiceError::ProgressNotFound(id) if id == entry.id));
    }
}

#[test]
fn updating_entry_value_counts_it_once() {
    let mut service = service();
    let goal = service.create_goal(thesis_input()).unwrap();
    let entry = log(&mut service, goal.id, "2024-01-02", 1.0);
    log(&mut service, goal.id, "2024-01-03", 1.0);

    let updated = service
        .update_progress(
            entry.id,
            ProgressUpdate {
                value: Some(2.0),
                ..ProgressUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.value, 2.0);
    assert_eq!(updated.created_at, entry.created_at);

    let summary = service.summaries().unwrap().remove(0);
    assert_eq!(summary.completed, 3.0);
    assert_eq!(summary.progress_entries.len(), 2);
}

#[test]
fn invalid_goal_is_rejected_without_touching_store() {
    let mut service = service();

    let err = service
        .create_goal(GoalInput {
            start_date: "2024-01-07".to_string(),
            end_date: "2024-01-01".to_string(),
            ..thesis_input()
        })
        .unwrap_err();
    match err {
        TrackerServiceError::Validation(inner) => assert_eq!(inner.field(), "end_date"),
        other => panic!("unexpected error: {other}"),
    }

    assert!(service.list_goals().unwrap().is_empty());
}

#[test]
fn update_goal_validates_merged_record() {
    let mut service = service();
    let goal = service.create_goal(thesis_input()).unwrap();

    let err = service
        .update_goal(
            goal.id,
            GoalUpdate {
                end_date: Some("2023-12-25".to_string()),
                ..GoalUpdate::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TrackerServiceError::Validation(ValidationError::InvertedDateRange { .. })
    ));
    assert_eq!(service.get_goal(goal.id).unwrap(), goal);

    let err = service
        .update_goal(
            goal.id,
            GoalUpdate {
                target_value: Some(-1.0),
                ..GoalUpdate::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TrackerServiceError::Validation(ValidationError::NonPositiveTarget(_))
    ));

    let updated = service
        .update_goal(
            goal.id,
            GoalUpdate {
                name: Some("Thesis v2".to_string()),
                end_date: Some("2024-01-31".to_string()),
                period_type: Some("month".to_string()),
                ..GoalUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Thesis v2");
    assert_eq!(updated.target_value, 5.0);
    assert_eq!(service.calendar(goal.id).unwrap().len(), 31);
}

#[test]
fn update_missing_goal_returns_not_found() {
    let mut service = service();
    let missing = Uuid::new_v4();

    let err = service
        .update_goal(missing, GoalUpdate::default())
        .unwrap_err();
    assert!(matches!(err, TrackerServiceError::GoalNotFound(id) if id == missing));
}

#[test]
fn coordinator_deletes_report_missing_ids() {
    let mut service = service();
    let goal = service.create_goal(thesis_input()).unwrap();
    let entry = log(&mut service, goal.id, "2024-01-02", 1.0);

    service.delete_progress(entry.id).unwrap();
    assert!(matches!(
        service.delete_progress(entry.id),
        Err(TrackerServiceError::ProgressNotFound(_))
    ));

    service.delete_goal(goal.id).unwrap();
    assert!(matches!(
        service.delete_goal(goal.id),
        Err(TrackerServiceError::GoalNotFound(_))
    ));
}

#[test]
fn progress_must_reference_existing_goal() {
    let mut service = service();
    let goal = service.create_goal(thesis_input()).unwrap();
    let unknown = Uuid::new_v4();

    let err = service
        .create_progress(ProgressInput {
            goal_id: unknown.to_string(),
            date: "2024-01-02".to_string(),
            value: 1.0,
            note: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        TrackerServiceError::Validation(ValidationError::UnknownGoal(id)) if id == unknown
    ));

    let entry = log(&mut service, goal.id, "2024-01-02", 1.0);
    let err = service
        .update_progress(
            entry.id,
            ProgressUpdate {
                goal_id: Some(unknown.to_string()),
                ..ProgressUpdate::default()
            },
        )
        .unwrap_err();
    assert_eq!(
        match err {
            TrackerServiceError::Validation(inner) => inner.field(),
            other => panic!("unexpected error: {other}"),
        },
        "goal_id"
    );

    assert_eq!(service.store().list_progress(None).unwrap(), vec![entry]);
}

#[test]
fn progress_can_move_between_goals() {
    let mut service = service();
    let first = service.create_goal(thesis_input()).unwrap();
    let second = service
        .create_goal(GoalInput {
            name: "Reading".to_string(),
            measure_type: "hours".to_string(),
            ..thesis_input()
        })
        .unwrap();
    let entry = log(&mut service, first.id, "2024-01-02", 1.5);

    service
        .update_progress(
            entry.id,
            ProgressUpdate {
                goal_id: Some(second.id.to_string()),
                ..ProgressUpdate::default()
            },
        )
        .unwrap();

    let summaries = service.summaries().unwrap();
    assert_eq!(summaries[0].completed, 0.0);
    assert_eq!(summaries[1].completed, 1.5);
    assert_eq!(service.list_progress(Some(second.id)).unwrap().len(), 1);
}

#[test]
fn calendar_reflects_logged_progress() {
    let mut service = service();
    let goal = service.create_goal(thesis_input()).unwrap();
    log(&mut service, goal.id, "2024-01-03", 1.0);

    let days = service.calendar(goal.id).unwrap();
    assert_eq!(days.len(), 7);
    assert!(days[2].full_day);
    assert!(days.iter().filter(|day| day.has_progress).count() == 1);

    assert!(matches!(
        service.calendar(Uuid::new_v4()),
        Err(TrackerServiceError::GoalNotFound(_))
    ));
}

#[test]
fn summaries_are_stable_between_reads() {
    let mut service = service();
    let goal = service.create_goal(thesis_input()).unwrap();
    log(&mut service, goal.id, "2024-01-02", 0.1);
    log(&mut service, goal.id, "2024-01-02", 0.2);

    assert_eq!(service.summaries().unwrap(), service.summaries().unwrap());
}
