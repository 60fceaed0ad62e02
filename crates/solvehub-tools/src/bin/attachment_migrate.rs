//! attachment-migrate: move legacy local-disk attachments into object
//! storage.
//!
//! Safe to re-run: only records still marked `local_legacy` are touched,
//! and a record is rewritten as `hosted` only after a successful upload.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solvehub_db::{Database, FilesystemBackend, HttpObjectStorage, StorageBackend};
use solvehub_tools::attachment_migrate;

#[derive(Parser)]
#[command(name = "attachment-migrate", about = "Upload legacy local attachments to object storage")]
struct Args {
    /// Attachments fetched per batch.
    #[arg(long, default_value_t = 200)]
    batch_size: i64,

    /// Delete the local source file after a successful upload.
    #[arg(long)]
    delete_local: bool,

    /// Key prefix for uploaded objects.
    #[arg(long, default_value = "solvehub")]
    folder: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "solvehub_tools=info,attachment_migrate=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/solvehub".to_string());

    // Same storage selection as the API server: HTTP object storage when an
    // endpoint is configured, local filesystem otherwise.
    let storage: Arc<dyn StorageBackend> = match std::env::var("STORAGE_ENDPOINT") {
        Ok(endpoint) if !endpoint.is_empty() => Arc::new(HttpObjectStorage::new(endpoint)),
        _ => {
            let base = std::env::var("FILE_STORAGE_PATH")
                .unwrap_or_else(|_| "/var/lib/solvehub/files".to_string());
            let public = std::env::var("PUBLIC_FILES_URL")
                .unwrap_or_else(|_| "http://localhost:3000/files".to_string());
            Arc::new(FilesystemBackend::new(base, public))
        }
    };

    let db = Database::connect(&database_url).await?;

    let stats = attachment_migrate::run(
        &db,
        storage.as_ref(),
        &args.folder,
        args.batch_size,
        args.delete_local,
    )
    .await?;

    println!("Attachment migration summary:");
    println!("  scanned:       {}", stats.scanned);
    println!("  migrated:      {}", stats.migrated);
    println!("  failed:        {}", stats.failed);
    println!("  deleted local: {}", stats.deleted_local);
    Ok(())
}
