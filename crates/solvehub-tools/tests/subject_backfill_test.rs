//! Integration tests for the subject backfill tool.

use solvehub_core::{CreateExerciseRequest, ExerciseRepository, SubjectRepository};
use solvehub_db::test_fixtures::TestDatabase;
use solvehub_tools::subject_backfill;

async fn legacy_exercise(test_db: &TestDatabase, author: uuid::Uuid, subject_name: &str) -> uuid::Uuid {
    test_db
        .db
        .exercises
        .insert(
            author,
            CreateExerciseRequest {
                title: format!("Exercise on {}", subject_name),
                description: "Legacy record with a free-text subject".to_string(),
                subject_id: None,
                subject_name: Some(subject_name.to_string()),
                tags: Vec::new(),
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_backfill_resolves_and_caches_subjects() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("vera").await;

    let a = legacy_exercise(&test_db, author.id, "Cálculo II").await;
    let b = legacy_exercise(&test_db, author.id, "Cálculo II").await;
    let c = legacy_exercise(&test_db, author.id, "Physics").await;

    let stats = subject_backfill::run(&test_db.db, 100).await.unwrap();
    assert_eq!(stats.scanned, 3);
    assert_eq!(stats.migrated, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.distinct_subjects, 2);

    // Repeated names share one subject; slugs are derived.
    let subjects = test_db.db.subjects.list(false).await.unwrap();
    assert_eq!(subjects.len(), 2);
    let calc = test_db
        .db
        .subjects
        .find_by_name("Cálculo II")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(calc.slug, "calculo-ii");

    for id in [a, b, c] {
        let full = test_db.db.exercises.fetch(id, None).await.unwrap();
        assert!(full.subject.is_some(), "exercise {} should be migrated", id);
        // The legacy name is kept during the migration window.
        assert!(full.subject_name.is_some());
    }

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_backfill_is_idempotent() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("walter").await;
    legacy_exercise(&test_db, author.id, "Chemistry").await;

    let first = subject_backfill::run(&test_db.db, 100).await.unwrap();
    assert_eq!(first.migrated, 1);

    // Second run finds nothing to do and creates nothing.
    let second = subject_backfill::run(&test_db.db, 100).await.unwrap();
    assert_eq!(second.scanned, 0);
    assert_eq!(second.migrated, 0);

    let subjects = test_db.db.subjects.list(false).await.unwrap();
    assert_eq!(subjects.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_backfill_reuses_existing_subject() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("xenia").await;

    let existing = test_db.create_subject("Biology").await;
    let id = legacy_exercise(&test_db, author.id, "Biology").await;

    let stats = subject_backfill::run(&test_db.db, 100).await.unwrap();
    assert_eq!(stats.migrated, 1);

    let full = test_db.db.exercises.fetch(id, None).await.unwrap();
    assert_eq!(full.subject.as_ref().map(|s| s.id), Some(existing.id));

    let subjects = test_db.db.subjects.list(false).await.unwrap();
    assert_eq!(subjects.len(), 1, "no duplicate subject created");

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_exercises_without_legacy_name_are_ignored() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("yuri").await;
    test_db.create_exercise(author.id, "No subject at all").await;

    let stats = subject_backfill::run(&test_db.db, 100).await.unwrap();
    assert_eq!(stats.scanned, 0);
    assert!(test_db.db.subjects.list(false).await.unwrap().is_empty());

    test_db.cleanup().await;
}
