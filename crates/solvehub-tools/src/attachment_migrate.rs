//! Attachment migration: legacy local files → durable object storage.
//!
//! Legacy attachments carry a `local_legacy` storage variant with a path on
//! the server's disk. For each one, the tool reads the file, uploads it
//! through the configured [`StorageBackend`], and rewrites the record as
//! `hosted`. Failures leave the original record unmodified; re-running only
//! sees records still marked `local_legacy`.

use tracing::{info, warn};

use solvehub_core::{Attachment, Error, Result, StorageLocation};
use solvehub_db::{generate_storage_key, Database, StorageBackend};

/// Per-run counters, printed as the summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct MigrateStats {
    /// Legacy attachments examined.
    pub scanned: usize,
    /// Attachments successfully rewritten as hosted.
    pub migrated: usize,
    /// Attachments left unmodified after an error.
    pub failed: usize,
    /// Local source files removed after upload (`--delete-local`).
    pub deleted_local: usize,
}

async fn migrate_one(
    db: &Database,
    storage: &dyn StorageBackend,
    folder: &str,
    attachment: &Attachment,
    local_path: &str,
) -> Result<()> {
    let data = tokio::fs::read(local_path).await.map_err(Error::Io)?;

    let key = generate_storage_key(folder, &attachment.filename);
    let stored = storage.store(&key, &attachment.content_type, &data).await?;

    db.attachments
        .mark_hosted(attachment.id, &stored.url, &stored.storage_key, stored.size_bytes)
        .await
}

/// Run the migration to completion.
///
/// Returns `Err` only on connection-level failures while listing a batch;
/// per-attachment errors are logged, counted, and skipped.
pub async fn run(
    db: &Database,
    storage: &dyn StorageBackend,
    folder: &str,
    batch_size: i64,
    delete_local: bool,
) -> Result<MigrateStats> {
    let mut stats = MigrateStats::default();
    // Failed records stay `local_legacy`; remembering them keeps the loop
    // from spinning on an attachment that will never upload.
    let mut failed_ids: std::collections::HashSet<uuid::Uuid> = std::collections::HashSet::new();

    loop {
        let batch: Vec<Attachment> = db
            .attachments
            .list_local_legacy(batch_size)
            .await?
            .into_iter()
            .filter(|a| !failed_ids.contains(&a.id))
            .collect();
        if batch.is_empty() {
            break;
        }

        for attachment in &batch {
            let StorageLocation::LocalLegacy { path } = &attachment.storage else {
                continue;
            };
            stats.scanned += 1;

            match migrate_one(db, storage, folder, attachment, path).await {
                Ok(()) => {
                    stats.migrated += 1;
                    if delete_local {
                        match tokio::fs::remove_file(path).await {
                            Ok(()) => stats.deleted_local += 1,
                            Err(e) => {
                                // Cleanup is best-effort; the record is
                                // already hosted.
                                warn!(
                                    subsystem = "tools",
                                    component = "attachment_migrate",
                                    attachment_id = %attachment.id,
                                    path,
                                    error = %e,
                                    "Failed to delete local file after upload"
                                );
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        subsystem = "tools",
                        component = "attachment_migrate",
                        attachment_id = %attachment.id,
                        path,
                        error = %e,
                        "Failed to migrate attachment, record left unmodified"
                    );
                    failed_ids.insert(attachment.id);
                    stats.failed += 1;
                }
            }
        }
    }

    info!(
        subsystem = "tools",
        component = "attachment_migrate",
        scanned = stats.scanned,
        migrated = stats.migrated,
        failed = stats.failed,
        deleted_local = stats.deleted_local,
        "Attachment migration finished"
    );
    Ok(stats)
}
