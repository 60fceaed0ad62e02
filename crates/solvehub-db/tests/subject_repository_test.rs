//! Integration tests for the subject repository.

use solvehub_core::{CreateSubjectRequest, Error, SubjectRepository};
use solvehub_db::test_fixtures::TestDatabase;

#[tokio::test]
async fn test_slug_derived_at_creation() {
    let test_db = TestDatabase::new().await;

    let subject = test_db.create_subject("Cálculo II").await;
    assert_eq!(subject.slug, "calculo-ii");
    assert_eq!(subject.name, "Cálculo II");

    let by_slug = test_db
        .db
        .subjects
        .find_by_slug("calculo-ii")
        .await
        .unwrap()
        .expect("slug lookup finds the subject");
    assert_eq!(by_slug.id, subject.id);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_duplicate_name_rejected_by_persistence_layer() {
    let test_db = TestDatabase::new().await;

    test_db.create_subject("Physics").await;
    let err = test_db
        .db
        .subjects
        .insert(CreateSubjectRequest {
            name: "Physics".to_string(),
            slug: Some("physics-2".to_string()),
            is_popular: false,
        })
        .await
        .unwrap_err();

    match err {
        Error::Database(e) => {
            let msg = e.to_string();
            assert!(
                msg.contains("duplicate key") || msg.contains("unique"),
                "expected a uniqueness violation, got: {}",
                msg
            );
        }
        other => panic!("expected a database error, got: {}", other),
    }

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_find_or_create_reuses_existing() {
    let test_db = TestDatabase::new().await;

    let first = test_db.db.subjects.find_or_create("Álgebra Linear").await.unwrap();
    let second = test_db.db.subjects.find_or_create("Álgebra Linear").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.slug, "algebra-linear");

    let all = test_db.db.subjects.list(false).await.unwrap();
    assert_eq!(all.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_unsluggable_name_rejected() {
    let test_db = TestDatabase::new().await;

    let err = test_db
        .db
        .subjects
        .insert(CreateSubjectRequest {
            name: "!!!".to_string(),
            slug: None,
            is_popular: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_popular_filter() {
    let test_db = TestDatabase::new().await;

    test_db.create_subject("Chemistry").await;
    test_db
        .db
        .subjects
        .insert(CreateSubjectRequest {
            name: "Mathematics".to_string(),
            slug: None,
            is_popular: true,
        })
        .await
        .unwrap();

    let popular = test_db.db.subjects.list(true).await.unwrap();
    assert_eq!(popular.len(), 1);
    assert_eq!(popular[0].name, "Mathematics");

    test_db.cleanup().await;
}
