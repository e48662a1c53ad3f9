use chrono::{NaiveDate, TimeZone, Utc};
use deadliner_core::{
    period_range, Goal, GoalInput, GoalUpdate, MeasureType, PeriodType, ProgressInput, ProgressUpdate,
    ValidationError,
};
use uuid::Uuid;

fn thesis_input() -> GoalInput {
    GoalInput {
        name: "  Thesis ".to_string(),
        period_type: "week".to_string(),
        start_date: "2024-01-01".to_string(),
        end_date: "2024-01-07".to_string(),
        measure_type: "full_days".to_string(),
        target_value: 5.0,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn goal_input_parses_into_trimmed_typed_draft() {
    let draft = thesis_input().into_draft().unwrap();

    assert_eq!(draft.name, "Thesis");
    assert_eq!(draft.period_type, PeriodType::Week);
    assert_eq!(draft.start_date, date(2024, 1, 1));
    assert_eq!(draft.end_date, date(2024, 1, 7));
    assert_eq!(draft.measure_type, MeasureType::FullDays);
    assert_eq!(draft.target_value, 5.0);
}

#[test]
fn goal_input_rejections_name_the_offending_field() {
    let cases: Vec<(GoalInput, &str)> = vec![
        (
            GoalInput {
                name: "   ".to_string(),
                ..thesis_input()
            },
            "name",
        ),
        (
            GoalInput {
                period_type: "fortnight".to_string(),
                ..thesis_input()
            },
            "period_type",
        ),
        (
            GoalInput {
                start_date: "2024-13-01".to_string(),
                ..thesis_input()
            },
            "start_date",
        ),
        (
            GoalInput {
                end_date: "2023-12-31".to_string(),
                ..thesis_input()
            },
            "end_date",
        ),
        (
            GoalInput {
                measure_type: "minutes".to_string(),
                ..thesis_input()
            },
            "measure_type",
        ),
        (
            GoalInput {
                target_value: 0.0,
                ..thesis_input()
            },
            "target_value",
        ),
        (
            GoalInput {
                target_value: f64::NAN,
                ..thesis_input()
            },
            "target_value",
        ),
    ];

    for (input, field) in cases {
        let err = input.into_draft().unwrap_err();
        assert_eq!(err.field(), field, "unexpected field for {err}");
    }
}

#[test]
fn single_day_goal_is_accepted() {
    let draft = GoalInput {
        end_date: "2024-01-01".to_string(),
        ..thesis_input()
    }
    .into_draft()
    .unwrap();

    let goal = Goal::new(draft);
    assert_eq!(goal.day_count(), 1);
}

#[test]
fn goal_update_parses_only_supplied_fields() {
    let patch = GoalUpdate {
        target_value: Some(7.5),
        measure_type: Some("hours".to_string()),
        ..GoalUpdate::default()
    }
    .into_patch()
    .unwrap();

    assert_eq!(patch.target_value, Some(7.5));
    assert_eq!(patch.measure_type, Some(MeasureType::Hours));
    assert_eq!(patch.name, None);
    assert_eq!(patch.start_date, None);

    assert!(GoalUpdate::default().into_patch().unwrap().is_empty());
}

#[test]
fn goal_patch_merge_keeps_identity_and_omitted_fields() {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut goal = Goal::with_id(id, thesis_input().into_draft().unwrap(), created_at);

    let patch = GoalUpdate {
        name: Some("Thesis draft".to_string()),
        ..GoalUpdate::default()
    }
    .into_patch()
    .unwrap();
    goal.apply_patch(&patch);

    assert_eq!(goal.id, id);
    assert_eq!(goal.created_at, created_at);
    assert_eq!(goal.name, "Thesis draft");
    assert_eq!(goal.target_value, 5.0);
    assert_eq!(goal.end_date, date(2024, 1, 7));
}

#[test]
fn goal_serialization_uses_expected_wire_fields() {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let goal = Goal::with_id(id, thesis_input().into_draft().unwrap(), created_at);

    let json = serde_json::to_value(&goal).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["name"], "Thesis");
    assert_eq!(json["period_type"], "week");
    assert_eq!(json["start_date"], "2024-01-01");
    assert_eq!(json["end_date"], "2024-01-07");
    assert_eq!(json["measure_type"], "full_days");
    assert_eq!(json["target_value"], 5.0);
    assert_eq!(json["created_at"], "2024-01-01T08:00:00Z");

    let decoded: Goal = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, goal);
}

#[test]
fn progress_input_validates_value_and_references() {
    let goal_id = Uuid::new_v4();
    let valid = ProgressInput {
        goal_id: goal_id.to_string(),
        date: "2024-01-02".to_string(),
        value: 0.5,
        note: Some("  ".to_string()),
    };
    let draft = valid.clone().into_draft().unwrap();
    assert_eq!(draft.goal_id, goal_id);
    assert_eq!(draft.value, 0.5);
    assert_eq!(draft.note, None);

    let zero = ProgressInput {
        value: 0.0,
        ..valid.clone()
    };
    assert!(zero.into_draft().is_ok());

    let negative = ProgressInput {
        value: -1.0,
        ..valid.clone()
    };
    assert_eq!(
        negative.into_draft().unwrap_err(),
        ValidationError::NegativeValue(-1.0)
    );

    let bad_id = ProgressInput {
        goal_id: "goal-1".to_string(),
        ..valid.clone()
    };
    assert_eq!(bad_id.into_draft().unwrap_err().field(), "goal_id");

    let bad_date = ProgressInput {
        date: "2024-02-30".to_string(),
        ..valid
    };
    assert_eq!(bad_date.into_draft().unwrap_err().field(), "date");
}

#[test]
fn progress_update_rejects_negative_value() {
    let err = ProgressUpdate {
        value: Some(-0.5),
        ..ProgressUpdate::default()
    }
    .into_patch()
    .unwrap_err();
    assert_eq!(err.field(), "value");
}

#[test]
fn progress_update_distinguishes_blank_note_from_omitted_note() {
    let omitted = ProgressUpdate::default().into_patch().unwrap();
    assert_eq!(omitted.note, None);

    let blank = ProgressUpdate {
        note: Some("   ".to_string()),
        ..ProgressUpdate::default()
    }
    .into_patch()
    .unwrap();
    assert_eq!(blank.note, Some(None));

    let text = ProgressUpdate {
        note: Some(" revised ".to_string()),
        ..ProgressUpdate::default()
    }
    .into_patch()
    .unwrap();
    assert_eq!(text.note, Some(Some("revised".to_string())));
}

#[test]
fn progress_input_deserializes_without_note() {
    let input: ProgressInput = serde_json::from_str(
        r#"{"goal_id":"11111111-2222-4333-8444-555555555555","date":"2024-01-02","value":1}"#,
    )
    .unwrap();
    assert_eq!(input.note, None);
    assert_eq!(input.value, 1.0);
}

#[test]
fn week_range_runs_monday_through_sunday() {
    let midweek = period_range(PeriodType::Week, date(2024, 1, 3)).unwrap();
    assert_eq!(midweek, (date(2024, 1, 1), date(2024, 1, 7)));

    let monday = period_range(PeriodType::Week, date(2024, 1, 1)).unwrap();
    assert_eq!(monday, midweek);

    let sunday = period_range(PeriodType::Week, date(2024, 1, 7)).unwrap();
    assert_eq!(sunday, midweek);

    let across_years = period_range(PeriodType::Week, date(2025, 1, 1)).unwrap();
    assert_eq!(across_years, (date(2024, 12, 30), date(2025, 1, 5)));
}

#[test]
fn month_range_covers_whole_calendar_month() {
    assert_eq!(
        period_range(PeriodType::Month, date(2024, 2, 29)).unwrap(),
        (date(2024, 2, 1), date(2024, 2, 29))
    );
    assert_eq!(
        period_range(PeriodType::Month, date(2023, 2, 14)).unwrap(),
        (date(2023, 2, 1), date(2023, 2, 28))
    );
    assert_eq!(
        period_range(PeriodType::Month, date(2024, 12, 31)).unwrap(),
        (date(2024, 12, 1), date(2024, 12, 31))
    );
    assert_eq!(
        period_range(PeriodType::Month, date(2024, 4, 1)).unwrap(),
        (date(2024, 4, 1), date(2024, 4, 30))
    );
}

#[test]
fn custom_period_has_no_default_range() {
    assert_eq!(period_range(PeriodType::Custom, date(2024, 1, 3)), None);
}
