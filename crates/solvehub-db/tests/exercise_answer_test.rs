//! Integration tests for exercises, answers, and votes.

use solvehub_core::{
    AnswerOrder, AnswerRepository, CreateAnswerRequest, CreateExerciseRequest, Error,
    ExerciseRepository, ListExercisesRequest, UserRepository, VoteKind,
};
use solvehub_db::test_fixtures::TestDatabase;
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_fetch_exercise_with_tags() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("lia").await;
    let subject = test_db.create_subject("Cálculo II").await;

    let id = test_db
        .db
        .exercises
        .insert(
            author.id,
            CreateExerciseRequest {
                title: "Compute the improper integral".to_string(),
                description: "∫ 1/x² from 1 to ∞".to_string(),
                subject_id: Some(subject.id),
                subject_name: None,
                tags: vec!["Integrals".to_string(), "improper".to_string()],
            },
        )
        .await
        .unwrap();

    let full = test_db.db.exercises.fetch(id, None).await.unwrap();
    assert_eq!(full.title, "Compute the improper integral");
    assert_eq!(full.tags, vec!["improper".to_string(), "integrals".to_string()]);
    assert_eq!(full.subject.as_ref().map(|s| s.slug.as_str()), Some("calculo-ii"));
    assert_eq!(full.author.username, "lia");
    assert_eq!(full.answer_count, 0);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_list_filters_by_tag_and_subject() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("marco").await;
    let subject = test_db.create_subject("Physics").await;

    test_db
        .db
        .exercises
        .insert(
            author.id,
            CreateExerciseRequest {
                title: "Pendulum period".to_string(),
                description: "Derive it".to_string(),
                subject_id: Some(subject.id),
                subject_name: None,
                tags: vec!["mechanics".to_string()],
            },
        )
        .await
        .unwrap();
    test_db.create_exercise(author.id, "Untagged one").await;

    let by_tag = test_db
        .db
        .exercises
        .list(
            ListExercisesRequest {
                tag: Some("mechanics".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_tag.total, 1);
    assert_eq!(by_tag.exercises[0].title, "Pendulum period");

    let by_subject = test_db
        .db
        .exercises
        .list(
            ListExercisesRequest {
                subject_slug: Some("physics".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_subject.total, 1);

    let all = test_db
        .db
        .exercises
        .list(ListExercisesRequest::default(), None)
        .await
        .unwrap();
    assert_eq!(all.total, 2);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_answer_increments_count_and_threads() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("nina").await;
    let responder = test_db.create_user("otto").await;
    let exercise_id = test_db.create_exercise(author.id, "Threads").await;

    let top = test_db
        .db
        .answers
        .insert(
            exercise_id,
            responder.id,
            CreateAnswerRequest {
                content: "First answer".to_string(),
                parent_answer_id: None,
            },
        )
        .await
        .unwrap();
    let _reply = test_db
        .db
        .answers
        .insert(
            exercise_id,
            author.id,
            CreateAnswerRequest {
                content: "Thanks, but why?".to_string(),
                parent_answer_id: Some(top),
            },
        )
        .await
        .unwrap();

    let full = test_db.db.exercises.fetch(exercise_id, None).await.unwrap();
    assert_eq!(full.answer_count, 2);

    let threaded = test_db
        .db
        .answers
        .list_for_exercise(exercise_id, AnswerOrder::Thread, None)
        .await
        .unwrap();
    assert_eq!(threaded.len(), 2);
    assert_eq!(threaded[0].id, top);
    assert_eq!(threaded[1].parent_answer_id, Some(top));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_reply_must_belong_to_same_exercise() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("paula").await;
    let first = test_db.create_exercise(user.id, "First").await;
    let second = test_db.create_exercise(user.id, "Second").await;

    let parent = test_db
        .db
        .answers
        .insert(
            first,
            user.id,
            CreateAnswerRequest {
                content: "On the first exercise".to_string(),
                parent_answer_id: None,
            },
        )
        .await
        .unwrap();

    let err = test_db
        .db
        .answers
        .insert(
            second,
            user.id,
            CreateAnswerRequest {
                content: "Cross-exercise reply".to_string(),
                parent_answer_id: Some(parent),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    // The failed insert must not bump the count.
    let full = test_db.db.exercises.fetch(second, None).await.unwrap();
    assert_eq!(full.answer_count, 0);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_vote_toggle_semantics() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("quinn").await;
    let voter = test_db.create_user("rosa").await;
    let exercise_id = test_db.create_exercise(author.id, "Votes").await;

    // First like.
    let result = test_db
        .db
        .exercises
        .vote(exercise_id, voter.id, VoteKind::Like)
        .await
        .unwrap();
    assert!(result.added_like);
    assert_eq!(result.summary.likes, 1);
    assert_eq!(result.summary.own_vote, Some(VoteKind::Like));

    // Same vote again removes it.
    let result = test_db
        .db
        .exercises
        .vote(exercise_id, voter.id, VoteKind::Like)
        .await
        .unwrap();
    assert!(!result.added_like);
    assert_eq!(result.summary.likes, 0);
    assert_eq!(result.summary.own_vote, None);

    // Dislike, then switch to like.
    test_db
        .db
        .exercises
        .vote(exercise_id, voter.id, VoteKind::Dislike)
        .await
        .unwrap();
    let result = test_db
        .db
        .exercises
        .vote(exercise_id, voter.id, VoteKind::Like)
        .await
        .unwrap();
    assert!(result.added_like);
    assert_eq!(result.summary.likes, 1);
    assert_eq!(result.summary.dislikes, 0);

    // Voting on a missing exercise is a not-found error.
    let err = test_db
        .db
        .exercises
        .vote(Uuid::new_v4(), voter.id, VoteKind::Like)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ExerciseNotFound(_)));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_saved_and_completed_filters() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("sven").await;
    let reader = test_db.create_user("tina").await;
    let first = test_db.create_exercise(author.id, "Saved one").await;
    let _second = test_db.create_exercise(author.id, "Not saved").await;

    test_db.db.users.set_saved(reader.id, first, true).await.unwrap();

    let saved = test_db
        .db
        .exercises
        .list(
            ListExercisesRequest {
                saved_by: Some(reader.id),
                ..Default::default()
            },
            Some(reader.id),
        )
        .await
        .unwrap();
    assert_eq!(saved.total, 1);
    assert_eq!(saved.exercises[0].id, first);

    // Unsave is idempotent.
    test_db.db.users.set_saved(reader.id, first, false).await.unwrap();
    test_db.db.users.set_saved(reader.id, first, false).await.unwrap();
    let saved = test_db
        .db
        .exercises
        .list(
            ListExercisesRequest {
                saved_by: Some(reader.id),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(saved.total, 0);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_delete_answer_recounts() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("uwe").await;
    let exercise_id = test_db.create_exercise(user.id, "Recount").await;

    let top = test_db
        .db
        .answers
        .insert(
            exercise_id,
            user.id,
            CreateAnswerRequest {
                content: "top".to_string(),
                parent_answer_id: None,
            },
        )
        .await
        .unwrap();
    test_db
        .db
        .answers
        .insert(
            exercise_id,
            user.id,
            CreateAnswerRequest {
                content: "reply".to_string(),
                parent_answer_id: Some(top),
            },
        )
        .await
        .unwrap();

    // Deleting the parent cascades to the reply; the count follows.
    test_db.db.answers.delete(top).await.unwrap();
    let full = test_db.db.exercises.fetch(exercise_id, None).await.unwrap();
    assert_eq!(full.answer_count, 0);

    test_db.cleanup().await;
}
