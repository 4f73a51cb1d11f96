use chrono::NaiveDate;
use ropeline::safety::activity::{ActivityImportError, ActivityLogImporter};

#[test]
fn fixture_export_splits_rows_by_record_type() {
    let log = ActivityLogImporter::from_path(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/fixtures/summit_activity.csv"
    ))
    .expect("fixture imports");

    assert_eq!(log.work_sessions.len(), 8);
    assert_eq!(log.toolbox_meetings.len(), 3);
    assert_eq!(log.harness_inspections.len(), 8);
    assert!(log
        .work_sessions
        .iter()
        .all(|session| session.project_id.starts_with("P-")));

    let timestamped = log
        .harness_inspections
        .iter()
        .find(|inspection| inspection.session_id.as_deref() == Some("S-3"))
        .expect("S-3 inspection present");
    assert_eq!(
        timestamped.date,
        NaiveDate::from_ymd_opt(2025, 3, 5).expect("valid date")
    );
}

#[test]
fn unparseable_dates_are_reported_with_their_line() {
    let csv = "Record Type,Date,Project ID,Session ID\n\
toolbox_meeting,2025-03-03,,\n\
toolbox_meeting,next tuesday,,\n";

    let error = ActivityLogImporter::from_reader(csv.as_bytes()).expect_err("bad date");
    match error {
        ActivityImportError::InvalidRow { line, reason } => {
            assert_eq!(line, 3);
            assert!(reason.contains("next tuesday"));
        }
        other => panic!("expected invalid row, got {other:?}"),
    }
}

#[test]
fn header_only_export_is_empty() {
    let log = ActivityLogImporter::from_reader("Record Type,Date,Project ID,Session ID\n".as_bytes())
        .expect("header only imports");
    assert!(log.is_empty());
}
