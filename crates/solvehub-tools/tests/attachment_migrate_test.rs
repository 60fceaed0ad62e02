//! Integration tests for the attachment migration tool.

use solvehub_core::{AttachmentOwner, StorageLocation};
use solvehub_db::test_fixtures::TestDatabase;
use solvehub_db::FilesystemBackend;
use solvehub_tools::attachment_migrate;

struct Setup {
    test_db: TestDatabase,
    storage: FilesystemBackend,
    /// Directory holding the pretend legacy uploads.
    legacy_dir: tempfile::TempDir,
    _storage_dir: tempfile::TempDir,
    exercise_id: uuid::Uuid,
}

async fn setup() -> Setup {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("zelda").await;
    let exercise_id = test_db.create_exercise(author.id, "Migration").await;

    let storage_dir = tempfile::tempdir().unwrap();
    let storage = FilesystemBackend::new(storage_dir.path(), "http://cdn.localhost/files");
    let legacy_dir = tempfile::tempdir().unwrap();

    Setup {
        test_db,
        storage,
        legacy_dir,
        _storage_dir: storage_dir,
        exercise_id,
    }
}

async fn legacy_attachment(setup: &Setup, name: &str, content: &[u8]) -> uuid::Uuid {
    let path = setup.legacy_dir.path().join(name);
    tokio::fs::write(&path, content).await.unwrap();

    setup
        .test_db
        .db
        .attachments
        .insert(
            AttachmentOwner::Exercise(setup.exercise_id),
            name,
            "application/pdf",
            StorageLocation::LocalLegacy {
                path: path.to_string_lossy().into_owned(),
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_migrates_legacy_attachment_to_hosted() {
    let setup = setup().await;
    let id = legacy_attachment(&setup, "worksheet.pdf", b"%PDF-1.4 worksheet").await;

    let stats = attachment_migrate::run(&setup.test_db.db, &setup.storage, "solvehub", 50, false)
        .await
        .unwrap();
    assert_eq!(stats.scanned, 1);
    assert_eq!(stats.migrated, 1);
    assert_eq!(stats.failed, 0);

    let migrated = setup.test_db.db.attachments.fetch(id).await.unwrap().unwrap();
    match &migrated.storage {
        StorageLocation::Hosted { url, storage_key, size } => {
            assert!(url.starts_with("http://cdn.localhost/files/solvehub/"));
            assert!(storage_key.starts_with("solvehub/"));
            assert_eq!(*size, 18);
        }
        other => panic!("expected hosted storage, got {:?}", other),
    }
    assert_eq!(migrated.size_bytes, 18);

    // Without --delete-local the source file survives.
    assert!(setup.legacy_dir.path().join("worksheet.pdf").exists());

    setup.test_db.cleanup().await;
}

#[tokio::test]
async fn test_rerun_skips_already_hosted() {
    let setup = setup().await;
    legacy_attachment(&setup, "once.pdf", b"%PDF-1.4").await;

    let first = attachment_migrate::run(&setup.test_db.db, &setup.storage, "solvehub", 50, false)
        .await
        .unwrap();
    assert_eq!(first.migrated, 1);

    let second = attachment_migrate::run(&setup.test_db.db, &setup.storage, "solvehub", 50, false)
        .await
        .unwrap();
    assert_eq!(second.scanned, 0);
    assert_eq!(second.migrated, 0);

    setup.test_db.cleanup().await;
}

#[tokio::test]
async fn test_missing_local_file_is_counted_and_record_preserved() {
    let setup = setup().await;
    let id = legacy_attachment(&setup, "ghost.pdf", b"%PDF-1.4").await;
    tokio::fs::remove_file(setup.legacy_dir.path().join("ghost.pdf"))
        .await
        .unwrap();

    let stats = attachment_migrate::run(&setup.test_db.db, &setup.storage, "solvehub", 50, false)
        .await
        .unwrap();
    assert_eq!(stats.migrated, 0);
    assert_eq!(stats.failed, 1);

    // The original record is preserved unmodified.
    let unchanged = setup.test_db.db.attachments.fetch(id).await.unwrap().unwrap();
    assert!(matches!(unchanged.storage, StorageLocation::LocalLegacy { .. }));

    setup.test_db.cleanup().await;
}

#[tokio::test]
async fn test_delete_local_removes_source_after_upload() {
    let setup = setup().await;
    legacy_attachment(&setup, "cleanup.pdf", b"%PDF-1.4").await;

    let stats = attachment_migrate::run(&setup.test_db.db, &setup.storage, "solvehub", 50, true)
        .await
        .unwrap();
    assert_eq!(stats.migrated, 1);
    assert_eq!(stats.deleted_local, 1);
    assert!(!setup.legacy_dir.path().join("cleanup.pdf").exists());

    setup.test_db.cleanup().await;
}
