//! Integration tests for report intake and moderation.

use solvehub_core::{
    AnswerRepository, CreateAnswerRequest, CreateReportRequest, Error, ReportReason,
    ReportRepository, ReportStatus, ReportTargetKind,
};
use solvehub_db::reports::intake;
use solvehub_db::test_fixtures::TestDatabase;
use uuid::Uuid;

#[tokio::test]
async fn test_report_on_missing_target_creates_no_record() {
    let test_db = TestDatabase::new().await;
    let reporter = test_db.create_user("gina").await;

    let err = intake(
        &test_db.db,
        reporter.id,
        CreateReportRequest {
            target_kind: ReportTargetKind::Exercise,
            target_id: Uuid::new_v4(),
            reason: ReportReason::Spam,
            details: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::ExerciseNotFound(_)));

    let reports = test_db.db.reports.list(None, 50, 0).await.unwrap();
    assert!(reports.is_empty(), "no report persisted for a missing target");

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_answer_report_resolves_parent_exercise() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("hugo").await;
    let reporter = test_db.create_user("iris").await;
    let exercise_id = test_db.create_exercise(author.id, "Series").await;
    let answer_id = test_db
        .db
        .answers
        .insert(
            exercise_id,
            author.id,
            CreateAnswerRequest {
                content: "spam spam spam".to_string(),
                parent_answer_id: None,
            },
        )
        .await
        .unwrap();

    let report = intake(
        &test_db.db,
        reporter.id,
        CreateReportRequest {
            target_kind: ReportTargetKind::Answer,
            target_id: answer_id,
            reason: ReportReason::Spam,
            details: Some("copied advertising".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(report.target_id, answer_id);
    assert_eq!(report.exercise_id, Some(exercise_id));
    assert_eq!(report.status, ReportStatus::Pending);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_reason_enum_is_validated_before_persistence() {
    // Typed deserialization rejects unknown reasons at the boundary; the
    // repositories never see them.
    let body = serde_json::json!({
        "target_kind": "exercise",
        "target_id": Uuid::new_v4(),
        "reason": "ABUSE",
    });
    assert!(serde_json::from_value::<CreateReportRequest>(body).is_err());

    for reason in ["SPAM", "OFFENSIVE", "FALSE_INFO", "OTHER"] {
        let body = serde_json::json!({
            "target_kind": "answer",
            "target_id": Uuid::new_v4(),
            "reason": reason,
        });
        assert!(
            serde_json::from_value::<CreateReportRequest>(body).is_ok(),
            "reason {} should parse",
            reason
        );
    }
}

#[tokio::test]
async fn test_details_length_bound() {
    let test_db = TestDatabase::new().await;
    let reporter = test_db.create_user("jose").await;
    let exercise_id = test_db.create_exercise(reporter.id, "Bounds").await;

    let err = intake(
        &test_db.db,
        reporter.id,
        CreateReportRequest {
            target_kind: ReportTargetKind::Exercise,
            target_id: exercise_id,
            reason: ReportReason::Other,
            details: Some("x".repeat(1001)),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_admin_resolves_report() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("karen").await;
    let admin = test_db.create_user("root-admin").await;
    let exercise_id = test_db.create_exercise(author.id, "Moderation").await;

    let report = intake(
        &test_db.db,
        author.id,
        CreateReportRequest {
            target_kind: ReportTargetKind::Exercise,
            target_id: exercise_id,
            reason: ReportReason::FalseInfo,
            details: None,
        },
    )
    .await
    .unwrap();

    let pending = test_db
        .db
        .reports
        .list(Some(ReportStatus::Pending), 50, 0)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    let resolved = test_db.db.reports.resolve(report.id, admin.id).await.unwrap();
    assert_eq!(resolved.status, ReportStatus::Resolved);
    assert_eq!(resolved.resolved_by, Some(admin.id));
    assert!(resolved.resolved_at_utc.is_some());

    let pending = test_db
        .db
        .reports
        .list(Some(ReportStatus::Pending), 50, 0)
        .await
        .unwrap();
    assert!(pending.is_empty());

    test_db.cleanup().await;
}
